//! Core simulator crate for the SIMP processor.
//!
//! The crate models a cycle-stepped 32-bit machine: a 16-entry register file
//! with a 12-bit program counter, 4096 words of data memory, a bank of 23
//! memory-mapped hardware registers, and the devices behind them (timer,
//! interrupt controller, disk and monitor). [`Simulator`] drives everything
//! one cycle at a time; the [`image`] module converts to and from the text
//! formats used on disk.

/// Fixed-width text encodings of machine words.
pub mod word;
pub use word::{
    hex_to_decimal, hex_to_word, signed_binary_to_decimal, to_binary, to_hex, word_to_hex,
    CodecError, WORD_HEX_DIGITS,
};

/// Data memory model and address legality checks.
pub mod memory;
pub use memory::{
    validate_data_address, validate_data_block, validate_io_address, DataMemory,
    DATA_MEMORY_WORDS,
};

/// Run diagnostics counters.
pub mod diag;
pub use diag::DiagCounters;

/// Public host-facing API contract and integration types.
pub mod api;
pub use api::{
    CoreState, RunOutcome, SimConfig, StepOutcome, StopReason, TraceEvent, TraceSink,
    DEFAULT_MAX_CYCLES, DISK_LATENCY_CYCLES,
};

/// Architectural register and hardware register bank model.
pub mod state;
pub use state::{
    IoBank, IoRegister, Register, RegisterFile, GENERAL_REGISTER_COUNT,
    INSTRUCTION_MEMORY_LINES, IO_REGISTER_COUNT, PC_MASK,
};

/// Opcode table and classification.
pub mod encoding;
pub use encoding::{classify_opcode, Opcode, OPCODE_TABLE};

/// Instruction field extraction.
pub mod decoder;
pub use decoder::{
    encode_fields, sign_extend_12, Decoder, Instruction, INSTRUCTION_HEX_DIGITS,
    INSTRUCTION_MASK,
};

/// Instruction disassembly.
pub mod disasm;
pub use disasm::{disassemble_one, disassemble_window, DisassemblyRow};

/// Recoverable program fault taxonomy.
pub mod fault;
pub use fault::{FaultClass, FaultCode};

/// Instruction execution pipeline.
pub mod execute;
pub use execute::{commit_execution, execute_instruction, ExecuteState, IoDirection, IoEvent};

/// Interrupt controller, disk and monitor.
pub mod peripherals;
pub use peripherals::{
    Disk, DiskController, DiskEvent, DiskTransfer, InterruptController, Monitor, DISK_SECTORS,
    MONITOR_PIXELS, SECTOR_WORDS,
};

/// Execution trace and hardware log recording.
pub mod trace;
pub use trace::{
    ChangeRecord, HardwareRecord, TraceRecord, TraceRecorder, TraceWriter, TRACE_LINE_CHARS,
};

/// Input image parsing and output rendering.
pub mod image;
pub use image::{ImageError, MachineImage};

/// Cycle scheduler.
pub mod sim;
pub use sim::Simulator;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
