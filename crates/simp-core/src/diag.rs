//! Run diagnostics counters.

use std::fmt;

use crate::{FaultClass, FaultCode};

/// Saturating counters collected over one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DiagCounters {
    /// The last fault code that occurred, if any.
    pub last_fault_code: Option<FaultCode>,
    /// The program counter at the time of the last fault.
    pub last_fault_pc: u16,
    /// The cycle number of the last fault.
    pub last_fault_cycle: u64,
    /// Saturating counter for decode-class faults.
    pub fault_count_decode: u32,
    /// Saturating counter for memory-class faults.
    pub fault_count_memory: u32,
    /// Saturating counter for I/O-class faults.
    pub fault_count_io: u32,
    /// Saturating counter for disk-class faults.
    pub fault_count_disk: u32,
    /// Saturating counter for executed instructions.
    pub instruction_count: u64,
    /// Saturating counter for interrupt handler entries.
    pub interrupt_count: u32,
    /// Saturating counter for completed disk transfers.
    pub disk_transfer_count: u32,
}

impl DiagCounters {
    /// Creates a zeroed set of counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a fault occurrence, updating the last fault info and incrementing
    /// the appropriate fault class counter.
    pub const fn record_fault(&mut self, code: FaultCode, pc: u16, cycle: u64) {
        self.last_fault_code = Some(code);
        self.last_fault_pc = pc;
        self.last_fault_cycle = cycle;
        let counter = match code.class() {
            FaultClass::Decode => &mut self.fault_count_decode,
            FaultClass::Memory => &mut self.fault_count_memory,
            FaultClass::Io => &mut self.fault_count_io,
            FaultClass::Disk => &mut self.fault_count_disk,
        };
        *counter = counter.saturating_add(1);
    }

    /// Sum of every fault-class counter.
    #[must_use]
    pub const fn total_faults(&self) -> u32 {
        self.fault_count_decode
            .saturating_add(self.fault_count_memory)
            .saturating_add(self.fault_count_io)
            .saturating_add(self.fault_count_disk)
    }

    /// Increments the instruction counter with saturating behavior.
    pub const fn increment_instruction_count(&mut self) {
        self.instruction_count = self.instruction_count.saturating_add(1);
    }

    /// Records one interrupt handler entry.
    pub const fn record_interrupt(&mut self) {
        self.interrupt_count = self.interrupt_count.saturating_add(1);
    }

    /// Records one completed disk transfer.
    pub const fn record_disk_transfer(&mut self) {
        self.disk_transfer_count = self.disk_transfer_count.saturating_add(1);
    }
}

impl fmt::Display for DiagCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} instructions, {} interrupts, {} disk transfers, {} faults",
            self.instruction_count,
            self.interrupt_count,
            self.disk_transfer_count,
            self.total_faults()
        )?;
        if let Some(code) = self.last_fault_code {
            write!(
                f,
                " (last: {code} at pc {:03X}, cycle {})",
                self.last_fault_pc, self.last_fault_cycle
            )?;
        }
        Ok(())
    }
}
