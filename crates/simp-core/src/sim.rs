//! Cycle scheduler tying the core and its peripherals together.
//!
//! One call to [`Simulator::step`] runs one cycle:
//!
//! 1. pend the timer and external interrupts
//! 2. vector to the handler if an enabled interrupt is pending and none is in
//!    service
//! 3. fetch and decode the instruction at `PC`, load `$imm1`/`$imm2`
//! 4. record the execution trace line
//! 5. execute and commit the instruction's effects
//! 6. log hardware-register accesses and LED/display changes, strobe the
//!    monitor
//! 7. service the disk controller
//! 8. advance the timer, `clks` and the cycle counter
//! 9. drop the irq2 pulse

use log::{debug, trace, warn};

use crate::api::{RunOutcome, SimConfig, StepOutcome, StopReason, TraceEvent, TraceSink};
use crate::decoder::Decoder;
use crate::diag::DiagCounters;
use crate::execute::{commit_execution, execute_instruction, IoEvent};
use crate::image::MachineImage;
use crate::peripherals::{Disk, DiskController, DiskEvent, InterruptController, Monitor};
use crate::state::IoRegister;
use crate::trace::TraceRecorder;
use crate::{CoreState, FaultCode, INSTRUCTION_MEMORY_LINES};

/// A SIMP machine with its peripherals and a trace sink.
#[derive(Debug, Clone)]
pub struct Simulator<S: TraceSink = TraceRecorder> {
    config: SimConfig,
    program: Box<[u64]>,
    state: CoreState,
    interrupts: InterruptController,
    disk: DiskController,
    monitor: Monitor,
    sink: S,
    diag: DiagCounters,
    cycle: u64,
    halted: bool,
}

impl Simulator<TraceRecorder> {
    /// Creates a simulator that keeps every trace stream in memory.
    #[must_use]
    pub fn new(config: SimConfig, image: &MachineImage) -> Self {
        Self::with_sink(config, image, TraceRecorder::default())
    }
}

impl<S: TraceSink> Simulator<S> {
    /// Creates a simulator that reports trace events to `sink`.
    ///
    /// Instruction lines past the image read as zero (`add $zero, ...`).
    #[must_use]
    pub fn with_sink(config: SimConfig, image: &MachineImage, sink: S) -> Self {
        let mut program = vec![0; INSTRUCTION_MEMORY_LINES].into_boxed_slice();
        for (slot, raw) in program.iter_mut().zip(&image.instructions) {
            *slot = *raw;
        }
        let disk = DiskController::new(Disk::from_words(&image.disk), config.disk_latency_cycles);

        Self {
            program,
            state: CoreState::with_memory(&image.data),
            interrupts: InterruptController::new(image.irq2.clone()),
            disk,
            monitor: Monitor::default(),
            sink,
            diag: DiagCounters::new(),
            cycle: 0,
            halted: false,
            config,
        }
    }

    /// Architectural state.
    #[must_use]
    pub const fn state(&self) -> &CoreState {
        &self.state
    }

    /// Instruction memory, 4096 raw words.
    #[must_use]
    pub fn program(&self) -> &[u64] {
        &self.program
    }

    /// Cycles executed so far.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycle
    }

    /// Returns `true` once `halt` has retired.
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        self.halted
    }

    /// Run diagnostics.
    #[must_use]
    pub const fn diag(&self) -> &DiagCounters {
        &self.diag
    }

    /// Interrupt controller.
    #[must_use]
    pub const fn interrupts(&self) -> &InterruptController {
        &self.interrupts
    }

    /// Disk controller and contents.
    #[must_use]
    pub const fn disk(&self) -> &DiskController {
        &self.disk
    }

    /// Monitor framebuffer.
    #[must_use]
    pub const fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    /// Trace sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the simulator, returning its trace sink.
    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Runs one cycle. Once halted, further calls do nothing.
    pub fn step(&mut self) -> StepOutcome {
        if self.halted {
            return StepOutcome::Halted;
        }
        let cycle = self.cycle;

        self.interrupts.pend_timer(&mut self.state.io);
        self.interrupts.pend_external(&mut self.state.io, cycle);
        let interrupted_pc = self.state.registers.pc();
        if self
            .interrupts
            .service(&mut self.state.registers, &mut self.state.io)
        {
            self.diag.record_interrupt();
            debug!(
                "cycle {cycle}: interrupt at pc {interrupted_pc:03X}, vectoring to {:03X}",
                self.state.registers.pc()
            );
        }

        let pc = self.state.registers.pc();
        let raw = self.program.get(usize::from(pc)).copied().unwrap_or(0);
        let instruction = Decoder::decode(raw);
        self.state
            .registers
            .load_immediates(instruction.imm1, instruction.imm2);
        trace!("cycle {cycle}: {pc:03X} {}", instruction.disassemble());

        if self.config.trace_enabled {
            self.sink.on_event(TraceEvent::InstructionStart {
                pc,
                raw,
                registers: self.state.registers.snapshot(),
            });
        }

        let exec = execute_instruction(&instruction, &self.state);
        let leds_before = self.state.io.get(IoRegister::Leds);
        let display_before = self.state.io.get(IoRegister::Display7Seg);
        commit_execution(&mut self.state, &exec);

        if exec.leave_interrupt {
            self.interrupts.leave();
        }
        if let Some(cause) = exec.fault {
            self.report_fault(cause, pc, cycle);
            warn!(
                "cycle {cycle}: pc {pc:03X}: {cause}: {}",
                instruction.disassemble()
            );
        }

        self.log_hardware(exec.io_event, leds_before, display_before, cycle);
        if let Some(pixel) = self.monitor.apply(&self.state.io) {
            trace!("cycle {cycle}: monitor pixel {pixel:04X} written");
        }
        let disk_fault = self.service_disk(pc, cycle);

        self.interrupts.advance_timer(&mut self.state.io);
        self.state.io.tick_clock();
        self.cycle = cycle.saturating_add(1);
        self.diag.increment_instruction_count();
        InterruptController::end_cycle(&mut self.state.io);

        if exec.halt {
            self.halted = true;
            debug!("cycle {cycle}: halt at pc {pc:03X}");
            return StepOutcome::Halted;
        }
        exec.fault
            .or(disk_fault)
            .map_or(StepOutcome::Retired, |cause| StepOutcome::Fault { cause })
    }

    /// Runs until `halt` retires or the cycle budget is exhausted.
    pub fn run(&mut self) -> RunOutcome {
        loop {
            if self.halted {
                return self.outcome(StopReason::Halted);
            }
            if self.cycle >= self.config.max_cycles {
                warn!(
                    "cycle budget of {} exhausted before halt",
                    self.config.max_cycles
                );
                return self.outcome(StopReason::CycleBudget);
            }
            self.step();
        }
    }

    const fn outcome(&self, reason: StopReason) -> RunOutcome {
        RunOutcome {
            cycles: self.cycle,
            reason,
        }
    }

    fn report_fault(&mut self, cause: FaultCode, pc: u16, cycle: u64) {
        self.diag.record_fault(cause, pc, cycle);
    }

    fn log_hardware(
        &mut self,
        io_event: Option<IoEvent>,
        leds_before: u32,
        display_before: u32,
        cycle: u64,
    ) {
        if let Some(event) = io_event {
            self.sink.on_event(TraceEvent::HardwareAccess { cycle, event });
        }

        let leds = self.state.io.get(IoRegister::Leds);
        if leds != leds_before {
            self.sink
                .on_event(TraceEvent::LedsChanged { cycle, value: leds });
        }

        let display = self.state.io.get(IoRegister::Display7Seg);
        if display != display_before {
            self.sink.on_event(TraceEvent::DisplayChanged {
                cycle,
                value: display,
            });
        }
    }

    fn service_disk(&mut self, pc: u16, cycle: u64) -> Option<FaultCode> {
        match self
            .disk
            .service(&mut self.state.io, &mut self.state.memory, cycle)
        {
            Ok(DiskEvent::Idle) => None,
            Ok(DiskEvent::Started {
                transfer,
                sector,
                buffer,
                completes_at,
            }) => {
                debug!(
                    "cycle {cycle}: disk {transfer:?} sector {sector} buffer {buffer}, \
                     completes at {completes_at}"
                );
                None
            }
            Ok(DiskEvent::Completed) => {
                self.diag.record_disk_transfer();
                debug!("cycle {cycle}: disk transfer complete");
                None
            }
            Err(cause) => {
                self.report_fault(cause, pc, cycle);
                warn!("cycle {cycle}: disk command dropped: {cause}");
                Some(cause)
            }
        }
    }
}
