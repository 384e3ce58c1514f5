/// Number of memory-mapped hardware registers reachable by `in`/`out`.
pub const IO_REGISTER_COUNT: usize = 23;

/// Named hardware register in the I/O bank, indexed by its port number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum IoRegister {
    /// Timer interrupt enable.
    Irq0Enable = 0,
    /// Disk-completion interrupt enable.
    Irq1Enable = 1,
    /// External (scheduled) interrupt enable.
    Irq2Enable = 2,
    /// Timer interrupt pending.
    Irq0Status = 3,
    /// Disk-completion interrupt pending.
    Irq1Status = 4,
    /// External interrupt pending (one-cycle pulse).
    Irq2Status = 5,
    /// Interrupt handler entry address.
    IrqHandler = 6,
    /// PC saved on interrupt entry.
    IrqReturn = 7,
    /// Free-running clock, incremented once per cycle.
    Clks = 8,
    /// LED bank.
    Leds = 9,
    /// Seven-segment display.
    Display7Seg = 10,
    /// Timer enable.
    TimerEnable = 11,
    /// Timer current count.
    TimerCurrent = 12,
    /// Timer period.
    TimerMax = 13,
    /// Disk command (0 none, 1 read, other write).
    DiskCmd = 14,
    /// Disk sector index.
    DiskSector = 15,
    /// Data-memory address of the transfer buffer.
    DiskBuffer = 16,
    /// Disk busy flag.
    DiskStatus = 17,
    /// Unused slot.
    Reserved0 = 18,
    /// Unused slot.
    Reserved1 = 19,
    /// Monitor pixel address (`row * 256 + column`).
    MonitorAddr = 20,
    /// Monitor pixel luminance.
    MonitorData = 21,
    /// Monitor write strobe.
    MonitorCmd = 22,
}

impl IoRegister {
    /// Ordered list of every hardware register, indexed by port number.
    pub const ALL: [Self; IO_REGISTER_COUNT] = [
        Self::Irq0Enable,
        Self::Irq1Enable,
        Self::Irq2Enable,
        Self::Irq0Status,
        Self::Irq1Status,
        Self::Irq2Status,
        Self::IrqHandler,
        Self::IrqReturn,
        Self::Clks,
        Self::Leds,
        Self::Display7Seg,
        Self::TimerEnable,
        Self::TimerCurrent,
        Self::TimerMax,
        Self::DiskCmd,
        Self::DiskSector,
        Self::DiskBuffer,
        Self::DiskStatus,
        Self::Reserved0,
        Self::Reserved1,
        Self::MonitorAddr,
        Self::MonitorData,
        Self::MonitorCmd,
    ];

    /// Port number of this register.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Resolves a port number, or `None` past the last register.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < IO_REGISTER_COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Name used in the hardware-register access trace.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Irq0Enable => "irq0enable",
            Self::Irq1Enable => "irq1enable",
            Self::Irq2Enable => "irq2enable",
            Self::Irq0Status => "irq0status",
            Self::Irq1Status => "irq1status",
            Self::Irq2Status => "irq2status",
            Self::IrqHandler => "irqhandler",
            Self::IrqReturn => "irqreturn",
            Self::Clks => "clks",
            Self::Leds => "leds",
            Self::Display7Seg => "display7seg",
            Self::TimerEnable => "timerenable",
            Self::TimerCurrent => "timercurrent",
            Self::TimerMax => "timermax",
            Self::DiskCmd => "diskcmd",
            Self::DiskSector => "disksector",
            Self::DiskBuffer => "diskbuffer",
            Self::DiskStatus => "diskstatus",
            Self::Reserved0 => "reserved0",
            Self::Reserved1 => "reserved1",
            Self::MonitorAddr => "monitoraddr",
            Self::MonitorData => "monitordata",
            Self::MonitorCmd => "monitorcmd",
        }
    }
}

/// Memory-mapped hardware register bank.
///
/// One backing array is the single source of truth; peripherals and the
/// execution unit go through the named accessors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct IoBank {
    regs: [u32; IO_REGISTER_COUNT],
}

impl IoBank {
    /// Reads a hardware register.
    #[must_use]
    pub const fn get(&self, reg: IoRegister) -> u32 {
        self.regs[reg.index()]
    }

    /// Writes a hardware register.
    pub const fn set(&mut self, reg: IoRegister, value: u32) {
        self.regs[reg.index()] = value;
    }

    /// Returns `true` when the register holds a non-zero value.
    #[must_use]
    pub const fn is_set(&self, reg: IoRegister) -> bool {
        self.get(reg) != 0
    }

    /// Stores `1` or `0`.
    pub const fn set_flag(&mut self, reg: IoRegister, on: bool) {
        self.set(reg, if on { 1 } else { 0 });
    }

    /// Advances the free-running `clks` counter, wrapping at 2^32.
    pub const fn tick_clock(&mut self) {
        self.set(IoRegister::Clks, self.get(IoRegister::Clks).wrapping_add(1));
    }

    /// Interrupt handler entry address, truncated to the 12-bit PC width.
    #[must_use]
    pub const fn irq_handler(&self) -> u16 {
        (self.get(IoRegister::IrqHandler) & 0x0FFF) as u16
    }

    /// Saved return address, truncated to the 12-bit PC width.
    #[must_use]
    pub const fn irq_return(&self) -> u16 {
        (self.get(IoRegister::IrqReturn) & 0x0FFF) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::{IoBank, IoRegister, IO_REGISTER_COUNT};

    #[test]
    fn port_numbers_match_table_order() {
        for (index, reg) in IoRegister::ALL.iter().enumerate() {
            assert_eq!(reg.index(), index);
            assert_eq!(IoRegister::from_index(index), Some(*reg));
        }
        assert_eq!(IoRegister::from_index(IO_REGISTER_COUNT), None);
    }

    #[test]
    fn trace_names_are_lower_case_and_unique() {
        let mut names: Vec<_> = IoRegister::ALL.iter().map(|r| r.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), IO_REGISTER_COUNT);
        assert!(names.iter().all(|n| n.chars().all(|c| !c.is_ascii_uppercase())));
    }

    #[test]
    fn bank_stores_each_register_independently() {
        let mut bank = IoBank::default();
        for (value, reg) in (100_u32..).zip(IoRegister::ALL) {
            bank.set(reg, value);
        }
        for (value, reg) in (100_u32..).zip(IoRegister::ALL) {
            assert_eq!(bank.get(reg), value);
        }
    }

    #[test]
    fn clock_wraps_at_word_width() {
        let mut bank = IoBank::default();
        bank.set(IoRegister::Clks, u32::MAX);
        bank.tick_clock();
        assert_eq!(bank.get(IoRegister::Clks), 0);
    }

    #[test]
    fn handler_and_return_addresses_are_truncated_to_pc_width() {
        let mut bank = IoBank::default();
        bank.set(IoRegister::IrqHandler, 0xABCD_E123);
        bank.set(IoRegister::IrqReturn, 0x1FFF);
        assert_eq!(bank.irq_handler(), 0x123);
        assert_eq!(bank.irq_return(), 0xFFF);
    }

    #[test]
    fn flags_store_one_or_zero() {
        let mut bank = IoBank::default();
        bank.set_flag(IoRegister::DiskStatus, true);
        assert_eq!(bank.get(IoRegister::DiskStatus), 1);
        assert!(bank.is_set(IoRegister::DiskStatus));
        bank.set_flag(IoRegister::DiskStatus, false);
        assert!(!bank.is_set(IoRegister::DiskStatus));
    }
}
