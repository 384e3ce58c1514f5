use thiserror::Error;

/// Fault classes used for diagnostics aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// Instruction opcode outside the assigned table.
    Decode,
    /// `lw`/`sw` effective address outside data memory.
    Memory,
    /// `in`/`out` port number outside the I/O bank.
    Io,
    /// Disk command referencing a sector or buffer that does not exist.
    Disk,
}

/// Recoverable program faults.
///
/// None of these stop the simulation: the offending effect is skipped, a
/// diagnostic is logged and counted, and execution continues with the next
/// instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultCode {
    /// Opcode has no assigned instruction.
    #[error("unknown opcode")]
    UnknownOpcode,
    /// `rs + rt` was negative for a data-memory access.
    #[error("negative data memory address")]
    NegativeMemoryAddress,
    /// `rs + rt` was past the end of data memory.
    #[error("data memory address out of range")]
    MemoryAddressOutOfRange,
    /// `rs + rt` was negative for an I/O port access.
    #[error("negative i/o register address")]
    NegativeIoAddress,
    /// `rs + rt` named a port past the last hardware register.
    #[error("i/o register address out of range")]
    IoAddressOutOfRange,
    /// `disksector` does not name a sector on the disk.
    #[error("disk sector out of range")]
    DiskSectorOutOfRange,
    /// `diskbuffer` does not leave room for a whole sector in data memory.
    #[error("disk buffer out of range")]
    DiskBufferOutOfRange,
}

impl FaultCode {
    /// Returns the diagnostics fault class for this fault code.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::UnknownOpcode => FaultClass::Decode,
            Self::NegativeMemoryAddress | Self::MemoryAddressOutOfRange => FaultClass::Memory,
            Self::NegativeIoAddress | Self::IoAddressOutOfRange => FaultClass::Io,
            Self::DiskSectorOutOfRange | Self::DiskBufferOutOfRange => FaultClass::Disk,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FaultClass, FaultCode};

    #[test]
    fn class_mapping_matches_fault_taxonomy() {
        assert_eq!(FaultCode::UnknownOpcode.class(), FaultClass::Decode);
        assert_eq!(FaultCode::NegativeMemoryAddress.class(), FaultClass::Memory);
        assert_eq!(FaultCode::MemoryAddressOutOfRange.class(), FaultClass::Memory);
        assert_eq!(FaultCode::NegativeIoAddress.class(), FaultClass::Io);
        assert_eq!(FaultCode::IoAddressOutOfRange.class(), FaultClass::Io);
        assert_eq!(FaultCode::DiskSectorOutOfRange.class(), FaultClass::Disk);
        assert_eq!(FaultCode::DiskBufferOutOfRange.class(), FaultClass::Disk);
    }

    #[test]
    fn messages_are_lower_case_phrases() {
        assert_eq!(
            FaultCode::NegativeMemoryAddress.to_string(),
            "negative data memory address"
        );
    }
}
