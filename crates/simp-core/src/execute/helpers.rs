//! Arithmetic and comparison helpers for instruction execution.

#![allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]

use crate::decoder::Instruction;
use crate::state::Register;
use crate::CoreState;

/// Three-operand ALU operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    /// `rs + rt + rm`.
    Add,
    /// `rs - rt - rm`.
    Sub,
    /// `rs * rt - rm`.
    Mac,
    /// `rs & rt & rm`.
    And,
    /// `rs | rt | rm`.
    Or,
    /// `rs ^ rt ^ rm`.
    Xor,
    /// `rs << rt`.
    Sll,
    /// `rs >> rt`, sign-filling.
    Sra,
    /// `rs >> rt`, zero-filling.
    Srl,
}

/// Signed branch comparisons between `rs` and `rt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchOp {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Greater than.
    Gt,
    /// Less than or equal.
    Le,
    /// Greater than or equal.
    Ge,
}

/// Evaluates an ALU operation with 32-bit wrapping arithmetic.
///
/// Shift operations ignore `c`.
#[must_use]
pub const fn alu(op: AluOp, a: i32, b: i32, c: i32) -> i32 {
    match op {
        AluOp::Add => a.wrapping_add(b).wrapping_add(c),
        AluOp::Sub => a.wrapping_sub(b).wrapping_sub(c),
        AluOp::Mac => a.wrapping_mul(b).wrapping_sub(c),
        AluOp::And => a & b & c,
        AluOp::Or => a | b | c,
        AluOp::Xor => a ^ b ^ c,
        AluOp::Sll => shift_left(a, b),
        AluOp::Sra => shift_right_arithmetic(a, b),
        AluOp::Srl => shift_right_logical(a, b),
    }
}

/// `value << amount`, where `amount` is read unsigned and 32 or more gives 0.
#[must_use]
pub const fn shift_left(value: i32, amount: i32) -> i32 {
    match (value as u32).checked_shl(amount as u32) {
        Some(shifted) => shifted as i32,
        None => 0,
    }
}

/// Sign-filling right shift; 32 or more gives the sign fill.
#[must_use]
pub const fn shift_right_arithmetic(value: i32, amount: i32) -> i32 {
    match value.checked_shr(amount as u32) {
        Some(shifted) => shifted,
        None => value >> 31,
    }
}

/// Zero-filling right shift; 32 or more gives 0.
#[must_use]
pub const fn shift_right_logical(value: i32, amount: i32) -> i32 {
    match (value as u32).checked_shr(amount as u32) {
        Some(shifted) => shifted as i32,
        None => 0,
    }
}

/// Evaluates a signed branch condition.
#[must_use]
pub const fn branch_taken(op: BranchOp, a: i32, b: i32) -> bool {
    match op {
        BranchOp::Eq => a == b,
        BranchOp::Ne => a != b,
        BranchOp::Lt => a < b,
        BranchOp::Gt => a > b,
        BranchOp::Le => a <= b,
        BranchOp::Ge => a >= b,
    }
}

/// Truncates a register value to a 12-bit instruction address.
#[must_use]
pub const fn jump_target(value: i32) -> u16 {
    (value as u32 & 0x0FFF) as u16
}

/// Computes `rs + rt` without wrapping, for address validation.
#[must_use]
pub fn compute_effective_address(instr: &Instruction, state: &CoreState) -> i64 {
    i64::from(read(state, instr.rs)) + i64::from(read(state, instr.rt))
}

/// Reads a general register.
#[must_use]
pub const fn read(state: &CoreState, reg: Register) -> i32 {
    state.registers.gpr(reg)
}
