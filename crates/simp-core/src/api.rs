//! Public host-facing API contracts for embedding the simulator core.

use crate::{DataMemory, FaultCode, IoBank, IoEvent, RegisterFile};

/// Default cycle budget for one run.
pub const DEFAULT_MAX_CYCLES: u64 = 10_000_000;

/// Cycles between a disk command being accepted and its completion interrupt.
pub const DISK_LATENCY_CYCLES: u64 = 1024;

/// Top-level immutable configuration for a simulator instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SimConfig {
    /// Cycle budget checked after every cycle.
    pub max_cycles: u64,
    /// Cycles a disk transfer keeps `diskstatus` busy.
    pub disk_latency_cycles: u64,
    /// Enables the per-cycle execution trace.
    pub trace_enabled: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_cycles: DEFAULT_MAX_CYCLES,
            disk_latency_cycles: DISK_LATENCY_CYCLES,
            trace_enabled: true,
        }
    }
}

/// Architectural state touched by instruction execution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreState {
    /// General register file and program counter.
    pub registers: RegisterFile,
    /// Memory-mapped hardware register bank.
    pub io: IoBank,
    /// Data memory.
    pub memory: DataMemory,
}

impl CoreState {
    /// Creates a state with data memory preloaded from `image`.
    #[must_use]
    pub fn with_memory(image: &[i32]) -> Self {
        Self {
            memory: DataMemory::from_words(image),
            ..Self::default()
        }
    }
}

/// Output status from one simulated cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// Instruction retired normally.
    Retired,
    /// `halt` retired; no further cycles will run.
    Halted,
    /// A recoverable fault was raised this cycle, either by the instruction
    /// (whose effects were skipped) or by the disk controller rejecting a
    /// command. An instruction fault wins when both happen.
    Fault {
        /// Fault raised this cycle.
        cause: FaultCode,
    },
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum StopReason {
    /// The program executed `halt`.
    Halted,
    /// The configured cycle budget was exhausted first.
    CycleBudget,
}

/// Aggregated outcome from running until halt or the cycle budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RunOutcome {
    /// Total cycles executed, including the halting one.
    pub cycles: u64,
    /// Stop condition.
    pub reason: StopReason,
}

/// Observable events emitted while a cycle runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// Instruction about to execute, with registers after the immediates load.
    InstructionStart {
        /// Program counter used for this fetch.
        pc: u16,
        /// Raw 48-bit instruction word.
        raw: u64,
        /// `R0..R15` as seen by the instruction.
        registers: [i32; crate::GENERAL_REGISTER_COUNT],
    },
    /// `in`/`out` access to the hardware register bank.
    HardwareAccess {
        /// Cycle number of the access.
        cycle: u64,
        /// The access itself.
        event: IoEvent,
    },
    /// The LED register changed value.
    LedsChanged {
        /// Cycle number of the change.
        cycle: u64,
        /// New register value.
        value: u32,
    },
    /// The seven-segment register changed value.
    DisplayChanged {
        /// Cycle number of the change.
        cycle: u64,
        /// New register value.
        value: u32,
    },
}

/// Sink trait for cycle trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}
