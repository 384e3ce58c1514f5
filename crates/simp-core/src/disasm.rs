//! Instruction disassembly for the SIMP ISA.
//!
//! Every instruction is rendered in the assembler's six-operand form,
//! `mnemonic $rd, $rs, $rt, $rm, imm1, imm2`. Lines with an unassigned opcode
//! are shown as raw `.word` data.

use crate::decoder::{Decoder, Instruction};
use crate::INSTRUCTION_HEX_DIGITS;

/// A single disassembled instruction-memory line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DisassemblyRow {
    /// Instruction-memory line number.
    pub addr: u16,
    /// Raw 48-bit instruction word.
    pub raw: u64,
    /// The instruction mnemonic (e.g. `add`, `halt`).
    pub mnemonic: String,
    /// The formatted operands.
    pub operands: String,
    /// Whether the opcode is unassigned.
    pub is_illegal: bool,
}

impl Instruction {
    /// Renders this instruction as one assembler line.
    #[must_use]
    pub fn disassemble(&self) -> String {
        let (mnemonic, operands) = render(self);
        format!("{mnemonic} {operands}")
    }
}

/// Disassembles a window of instruction-memory lines around `center_pc`.
///
/// Produces up to `before` lines before the center, the center itself, and up
/// to `after` lines following it. Lines outside `program` are omitted.
#[must_use]
pub fn disassemble_window(
    center_pc: u16,
    before: usize,
    after: usize,
    program: &[u64],
) -> Vec<DisassemblyRow> {
    let center = usize::from(center_pc);
    let first = center.saturating_sub(before);
    let last = center.saturating_add(after);

    (first..=last)
        .filter_map(|addr| {
            let raw = *program.get(addr)?;
            let addr = u16::try_from(addr).ok()?;
            Some(disassemble_one(addr, raw))
        })
        .collect()
}

/// Disassembles the instruction word stored at `addr`.
#[must_use]
pub fn disassemble_one(addr: u16, raw: u64) -> DisassemblyRow {
    let instruction = Decoder::decode(raw);
    let (mnemonic, operands) = render(&instruction);
    DisassemblyRow {
        addr,
        raw: instruction.raw,
        mnemonic,
        operands,
        is_illegal: instruction.operation().is_err(),
    }
}

fn render(instruction: &Instruction) -> (String, String) {
    match instruction.operation() {
        Ok(opcode) => (
            opcode.mnemonic().to_string(),
            format!(
                "{}, {}, {}, {}, {}, {}",
                instruction.rd.name(),
                instruction.rs.name(),
                instruction.rt.name(),
                instruction.rm.name(),
                instruction.imm1,
                instruction.imm2
            ),
        ),
        Err(_) => (
            ".word".to_string(),
            format!(
                "0x{:0width$X} ; ILLEGAL",
                instruction.raw,
                width = INSTRUCTION_HEX_DIGITS
            ),
        ),
    }
}
