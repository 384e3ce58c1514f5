//! Instruction decoder for the SIMP ISA.
//!
//! A SIMP instruction is a 48-bit word written as twelve hex digits:
//!
//! ```text
//! 47      40 39  36 35  32 31  28 27  24 23        12 11         0
//! | opcode  |  rd  |  rs  |  rt  |  rm  |    imm1    |    imm2    |
//! ```
//!
//! Field extraction never fails. Whether the opcode names an instruction is
//! answered separately by [`Instruction::operation`], so an unknown opcode can
//! still be traced with its raw fields.

use crate::encoding::{classify_opcode, Opcode};
use crate::fault::FaultCode;
use crate::state::Register;
use crate::word::{hex_to_decimal, CodecError};

/// Hex digits per instruction line.
pub const INSTRUCTION_HEX_DIGITS: usize = 12;

/// Mask covering the 48 meaningful bits of an instruction word.
pub const INSTRUCTION_MASK: u64 = 0xFFFF_FFFF_FFFF;

/// Instruction with every field extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Instruction {
    /// Raw 48-bit encoding, kept for the trace.
    pub raw: u64,
    /// Encoded opcode value; may be unassigned.
    pub opcode: u8,
    /// Destination register.
    pub rd: Register,
    /// First source register.
    pub rs: Register,
    /// Second source register.
    pub rt: Register,
    /// Third source register.
    pub rm: Register,
    /// First immediate, sign-extended from 12 bits.
    pub imm1: i32,
    /// Second immediate, sign-extended from 12 bits.
    pub imm2: i32,
}

impl Instruction {
    /// Resolves the opcode field.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::UnknownOpcode`] when no instruction is assigned to
    /// the opcode value.
    pub fn operation(&self) -> Result<Opcode, FaultCode> {
        classify_opcode(self.opcode).ok_or(FaultCode::UnknownOpcode)
    }
}

impl Default for Instruction {
    fn default() -> Self {
        Decoder::decode(0)
    }
}

/// Sign-extends the low 12 bits of `field`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub const fn sign_extend_12(field: u64) -> i32 {
    (((field & 0x0FFF) as u32) << 20) as i32 >> 20
}

#[allow(clippy::cast_possible_truncation)]
const fn register_field(raw: u64, shift: u32) -> Register {
    Register::from_u4(((raw >> shift) & 0x0F) as u8)
}

/// Packs instruction fields into a raw 48-bit word.
///
/// Immediates are truncated to 12 bits; register fields are taken as-is.
#[must_use]
#[allow(clippy::cast_sign_loss, clippy::too_many_arguments)]
pub const fn encode_fields(
    opcode: u8,
    rd: Register,
    rs: Register,
    rt: Register,
    rm: Register,
    imm1: i32,
    imm2: i32,
) -> u64 {
    ((opcode as u64) << 40)
        | ((rd as u64) << 36)
        | ((rs as u64) << 32)
        | ((rt as u64) << 28)
        | ((rm as u64) << 24)
        | (((imm1 as u32 & 0x0FFF) as u64) << 12)
        | ((imm2 as u32 & 0x0FFF) as u64)
}

/// Instruction decoder for the SIMP ISA.
pub struct Decoder;

impl Decoder {
    /// Splits a raw instruction word into its fields. Bits above 47 are
    /// ignored.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn decode(raw: u64) -> Instruction {
        let raw = raw & INSTRUCTION_MASK;

        Instruction {
            raw,
            opcode: ((raw >> 40) & 0xFF) as u8,
            rd: register_field(raw, 36),
            rs: register_field(raw, 32),
            rt: register_field(raw, 28),
            rm: register_field(raw, 24),
            imm1: sign_extend_12(raw >> 12),
            imm2: sign_extend_12(raw),
        }
    }

    /// Decodes one instruction-image line.
    ///
    /// Surrounding whitespace is ignored. Lines shorter than twelve digits are
    /// read as if left-padded with zeros.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] when the line is empty, holds a non-hex
    /// character, or is wider than twelve digits.
    pub fn decode_line(line: &str) -> Result<Instruction, CodecError> {
        let line = line.trim();
        if line.len() > INSTRUCTION_HEX_DIGITS {
            return Err(CodecError::TooWide {
                digits: line.len(),
                max: INSTRUCTION_HEX_DIGITS,
            });
        }
        let value = hex_to_decimal(line, false)?;
        Ok(Self::decode(value.unsigned_abs()))
    }
}
