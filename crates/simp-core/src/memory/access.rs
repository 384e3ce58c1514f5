//! Address legality checks for data-memory and I/O port accesses.

use crate::{FaultCode, DATA_MEMORY_WORDS, IO_REGISTER_COUNT};

/// Validates a computed data-memory address and converts it to an index.
///
/// # Errors
///
/// Returns [`FaultCode::NegativeMemoryAddress`] when `addr` is negative and
/// [`FaultCode::MemoryAddressOutOfRange`] when it is past the last word.
pub fn validate_data_address(addr: i64) -> Result<usize, FaultCode> {
    if addr < 0 {
        return Err(FaultCode::NegativeMemoryAddress);
    }
    usize::try_from(addr)
        .ok()
        .filter(|index| *index < DATA_MEMORY_WORDS)
        .ok_or(FaultCode::MemoryAddressOutOfRange)
}

/// Validates a computed I/O port number and converts it to an index.
///
/// # Errors
///
/// Returns [`FaultCode::NegativeIoAddress`] when `addr` is negative and
/// [`FaultCode::IoAddressOutOfRange`] when it is past the last register.
pub fn validate_io_address(addr: i64) -> Result<usize, FaultCode> {
    if addr < 0 {
        return Err(FaultCode::NegativeIoAddress);
    }
    usize::try_from(addr)
        .ok()
        .filter(|index| *index < IO_REGISTER_COUNT)
        .ok_or(FaultCode::IoAddressOutOfRange)
}

/// Validates that a whole block of `len` words starting at `start` lies inside
/// data memory.
///
/// # Errors
///
/// Returns [`FaultCode::DiskBufferOutOfRange`] when the block does not fit.
pub fn validate_data_block(start: u32, len: usize) -> Result<usize, FaultCode> {
    usize::try_from(start)
        .ok()
        .filter(|first| first.checked_add(len).is_some_and(|end| end <= DATA_MEMORY_WORDS))
        .ok_or(FaultCode::DiskBufferOutOfRange)
}
