//! Architectural CPU state model primitives.

/// Memory-mapped hardware register bank.
pub mod io;
/// General register file and program counter.
pub mod registers;

pub use io::{IoBank, IoRegister, IO_REGISTER_COUNT};
pub use registers::{
    Register, RegisterFile, GENERAL_REGISTER_COUNT, INSTRUCTION_MEMORY_LINES, PC_MASK,
};
