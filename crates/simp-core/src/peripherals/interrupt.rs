//! Interrupt controller: timer, external schedule and vectoring.
//!
//! Three level-sensitive sources share one handler address:
//!
//! | source | pending flag  | raised by                                   |
//! |--------|---------------|---------------------------------------------|
//! | irq0   | `irq0status`  | timer reaching `timermax`                   |
//! | irq1   | `irq1status`  | disk transfer completing                    |
//! | irq2   | `irq2status`  | external schedule; cleared every cycle end  |
//!
//! Only one interrupt is in service at a time. Pending flags are never cleared
//! by vectoring; the handler acknowledges them with `out`.

use crate::state::{IoBank, IoRegister, RegisterFile};

/// Interrupt controller state that lives outside the hardware register bank.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct InterruptController {
    in_service: bool,
    schedule: Vec<u64>,
    cursor: usize,
    timer_fired: bool,
}

impl InterruptController {
    /// Creates a controller that raises irq2 on each cycle in `schedule`.
    ///
    /// The schedule is sorted and deduplicated.
    #[must_use]
    pub fn new(mut schedule: Vec<u64>) -> Self {
        schedule.sort_unstable();
        schedule.dedup();
        Self {
            schedule,
            ..Self::default()
        }
    }

    /// Returns `true` while the handler is running.
    #[must_use]
    pub const fn in_service(&self) -> bool {
        self.in_service
    }

    /// Raises irq2 when `cycle` is the next scheduled external interrupt.
    ///
    /// Entries already in the past are skipped.
    pub fn pend_external(&mut self, io: &mut IoBank, cycle: u64) {
        while self
            .schedule
            .get(self.cursor)
            .is_some_and(|next| *next < cycle)
        {
            self.cursor += 1;
        }
        if self.schedule.get(self.cursor) == Some(&cycle) {
            self.cursor += 1;
            io.set_flag(IoRegister::Irq2Status, true);
        }
    }

    /// Raises irq0 and restarts the count when the enabled timer has reached
    /// `timermax`.
    pub fn pend_timer(&mut self, io: &mut IoBank) {
        self.timer_fired = io.is_set(IoRegister::TimerEnable)
            && io.get(IoRegister::TimerCurrent) == io.get(IoRegister::TimerMax);
        if self.timer_fired {
            io.set_flag(IoRegister::Irq0Status, true);
            io.set(IoRegister::TimerCurrent, 0);
        }
    }

    /// Counts one cycle on the enabled timer, unless it restarted this cycle.
    pub fn advance_timer(&mut self, io: &mut IoBank) {
        if io.is_set(IoRegister::TimerEnable) && !self.timer_fired {
            io.set(
                IoRegister::TimerCurrent,
                io.get(IoRegister::TimerCurrent).wrapping_add(1),
            );
        }
        self.timer_fired = false;
    }

    /// Aggregate interrupt request line.
    #[must_use]
    pub const fn pending(io: &IoBank) -> bool {
        (io.is_set(IoRegister::Irq0Enable) && io.is_set(IoRegister::Irq0Status))
            || (io.is_set(IoRegister::Irq1Enable) && io.is_set(IoRegister::Irq1Status))
            || (io.is_set(IoRegister::Irq2Enable) && io.is_set(IoRegister::Irq2Status))
    }

    /// Vectors to the handler when an interrupt is pending and none is in
    /// service. Returns `true` when it did.
    pub fn service(&mut self, registers: &mut RegisterFile, io: &mut IoBank) -> bool {
        if self.in_service || !Self::pending(io) {
            return false;
        }
        io.set(IoRegister::IrqReturn, u32::from(registers.pc()));
        registers.set_pc(io.irq_handler());
        self.in_service = true;
        true
    }

    /// Leaves the handler after `reti`.
    pub const fn leave(&mut self) {
        self.in_service = false;
    }

    /// Drops the one-cycle irq2 pulse.
    pub const fn end_cycle(io: &mut IoBank) {
        io.set_flag(IoRegister::Irq2Status, false);
    }
}
