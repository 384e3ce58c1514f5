//! Instruction execution pipeline for the SIMP ISA.
//!
//! Execution is split in two so that a faulting instruction leaves no partial
//! side effects:
//! 1. [`execute_instruction`] reads operands from an immutable [`CoreState`]
//!    and records every effect in an [`ExecuteState`].
//! 2. [`commit_execution`] applies the recorded effects.
//!
//! Interrupt bookkeeping (`reti` leaving the handler) and trace logging are
//! left to the caller, which sees them as fields of the effect record.

#![allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]

mod helpers;

pub use helpers::{
    alu, branch_taken, compute_effective_address, jump_target, shift_left,
    shift_right_arithmetic, shift_right_logical, AluOp, BranchOp,
};

use helpers::read;

use crate::decoder::Instruction;
use crate::encoding::Opcode;
use crate::fault::FaultCode;
use crate::memory::{validate_data_address, validate_io_address};
use crate::state::{IoRegister, Register, PC_MASK};
use crate::CoreState;

/// Direction of a hardware-register access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum IoDirection {
    /// `in` instruction.
    Read,
    /// `out` instruction.
    Write,
}

impl IoDirection {
    /// Keyword used in the hardware-register trace.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "READ",
            Self::Write => "WRITE",
        }
    }
}

/// One `in`/`out` access to the hardware register bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct IoEvent {
    /// Register accessed.
    pub register: IoRegister,
    /// Read or write.
    pub direction: IoDirection,
    /// Value read or written.
    pub value: u32,
}

/// Side effects accumulated while executing one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteState {
    /// Destination register and value.
    pub register_write: Option<(Register, i32)>,
    /// Data-memory index and value.
    pub memory_write: Option<(usize, i32)>,
    /// Hardware register and value.
    pub io_write: Option<(IoRegister, u32)>,
    /// PC after this instruction.
    pub next_pc: u16,
    /// `halt` retired.
    pub halt: bool,
    /// Hardware-register access to log.
    pub io_event: Option<IoEvent>,
    /// `reti` retired; the interrupt controller leaves its handler.
    pub leave_interrupt: bool,
    /// Recoverable fault; every other effect except `next_pc` is empty.
    pub fault: Option<FaultCode>,
}

impl ExecuteState {
    /// Creates an effect record that only moves PC to `next_pc`.
    #[must_use]
    pub const fn new(next_pc: u16) -> Self {
        Self {
            register_write: None,
            memory_write: None,
            io_write: None,
            next_pc,
            halt: false,
            io_event: None,
            leave_interrupt: false,
            fault: None,
        }
    }

    const fn faulted(next_pc: u16, cause: FaultCode) -> Self {
        let mut exec = Self::new(next_pc);
        exec.fault = Some(cause);
        exec
    }
}

/// Executes a single instruction against `state` without modifying it.
///
/// `state.registers` must already hold the instruction's immediates in
/// `$imm1`/`$imm2`.
#[must_use]
pub fn execute_instruction(instr: &Instruction, state: &CoreState) -> ExecuteState {
    let pc = state.registers.pc();
    let next_pc = pc.wrapping_add(1) & PC_MASK;

    let opcode = match instr.operation() {
        Ok(opcode) => opcode,
        Err(cause) => return ExecuteState::faulted(next_pc, cause),
    };

    match opcode {
        Opcode::Add => execute_alu(instr, state, next_pc, AluOp::Add),
        Opcode::Sub => execute_alu(instr, state, next_pc, AluOp::Sub),
        Opcode::Mac => execute_alu(instr, state, next_pc, AluOp::Mac),
        Opcode::And => execute_alu(instr, state, next_pc, AluOp::And),
        Opcode::Or => execute_alu(instr, state, next_pc, AluOp::Or),
        Opcode::Xor => execute_alu(instr, state, next_pc, AluOp::Xor),
        Opcode::Sll => execute_alu(instr, state, next_pc, AluOp::Sll),
        Opcode::Sra => execute_alu(instr, state, next_pc, AluOp::Sra),
        Opcode::Srl => execute_alu(instr, state, next_pc, AluOp::Srl),
        Opcode::Beq => execute_branch(instr, state, next_pc, BranchOp::Eq),
        Opcode::Bne => execute_branch(instr, state, next_pc, BranchOp::Ne),
        Opcode::Blt => execute_branch(instr, state, next_pc, BranchOp::Lt),
        Opcode::Bgt => execute_branch(instr, state, next_pc, BranchOp::Gt),
        Opcode::Ble => execute_branch(instr, state, next_pc, BranchOp::Le),
        Opcode::Bge => execute_branch(instr, state, next_pc, BranchOp::Ge),
        Opcode::Jal => execute_jal(instr, state, next_pc),
        Opcode::Lw => execute_load(instr, state, next_pc),
        Opcode::Sw => execute_store(instr, state, next_pc),
        Opcode::Reti => execute_reti(state),
        Opcode::In => execute_in(instr, state, next_pc),
        Opcode::Out => execute_out(instr, state, next_pc),
        Opcode::Halt => execute_halt(pc),
    }
}

/// Applies the effects recorded in `exec` to `state`.
pub fn commit_execution(state: &mut CoreState, exec: &ExecuteState) {
    if let Some((reg, value)) = exec.register_write {
        state.registers.set_gpr(reg, value);
    }

    if let Some((index, value)) = exec.memory_write {
        state.memory.write(index, value);
    }

    if let Some((reg, value)) = exec.io_write {
        state.io.set(reg, value);
    }

    state.registers.set_pc(exec.next_pc);
}

fn execute_alu(instr: &Instruction, state: &CoreState, next_pc: u16, op: AluOp) -> ExecuteState {
    let result = alu(
        op,
        read(state, instr.rs),
        read(state, instr.rt),
        read(state, instr.rm),
    );
    let mut exec = ExecuteState::new(next_pc);
    exec.register_write = Some((instr.rd, result));
    exec
}

fn execute_branch(
    instr: &Instruction,
    state: &CoreState,
    next_pc: u16,
    op: BranchOp,
) -> ExecuteState {
    if branch_taken(op, read(state, instr.rs), read(state, instr.rt)) {
        ExecuteState::new(jump_target(read(state, instr.rm)))
    } else {
        ExecuteState::new(next_pc)
    }
}

fn execute_jal(instr: &Instruction, state: &CoreState, next_pc: u16) -> ExecuteState {
    let link = i32::from(next_pc);
    // `rm` is read after the link write, so `jal $ra, ..., $ra` lands on the link.
    let target = if instr.rd == instr.rm && instr.rd != Register::Zero {
        link
    } else {
        read(state, instr.rm)
    };
    let mut exec = ExecuteState::new(jump_target(target));
    exec.register_write = Some((instr.rd, link));
    exec
}

fn execute_load(instr: &Instruction, state: &CoreState, next_pc: u16) -> ExecuteState {
    match validate_data_address(compute_effective_address(instr, state)) {
        Ok(index) => {
            let value = state
                .memory
                .read(index)
                .wrapping_add(read(state, instr.rm));
            let mut exec = ExecuteState::new(next_pc);
            exec.register_write = Some((instr.rd, value));
            exec
        }
        Err(cause) => ExecuteState::faulted(next_pc, cause),
    }
}

fn execute_store(instr: &Instruction, state: &CoreState, next_pc: u16) -> ExecuteState {
    match validate_data_address(compute_effective_address(instr, state)) {
        Ok(index) => {
            let value = read(state, instr.rm).wrapping_add(read(state, instr.rd));
            let mut exec = ExecuteState::new(next_pc);
            exec.memory_write = Some((index, value));
            exec
        }
        Err(cause) => ExecuteState::faulted(next_pc, cause),
    }
}

fn execute_reti(state: &CoreState) -> ExecuteState {
    let mut exec = ExecuteState::new(state.io.irq_return());
    exec.leave_interrupt = true;
    exec
}

fn io_register(instr: &Instruction, state: &CoreState) -> Result<IoRegister, FaultCode> {
    let index = validate_io_address(compute_effective_address(instr, state))?;
    IoRegister::from_index(index).ok_or(FaultCode::IoAddressOutOfRange)
}

fn execute_in(instr: &Instruction, state: &CoreState, next_pc: u16) -> ExecuteState {
    match io_register(instr, state) {
        Ok(register) => {
            let value = state.io.get(register);
            let mut exec = ExecuteState::new(next_pc);
            exec.register_write = Some((instr.rd, value as i32));
            exec.io_event = Some(IoEvent {
                register,
                direction: IoDirection::Read,
                value,
            });
            exec
        }
        Err(cause) => ExecuteState::faulted(next_pc, cause),
    }
}

fn execute_out(instr: &Instruction, state: &CoreState, next_pc: u16) -> ExecuteState {
    match io_register(instr, state) {
        Ok(register) => {
            let value = read(state, instr.rm) as u32;
            let mut exec = ExecuteState::new(next_pc);
            exec.io_write = Some((register, value));
            exec.io_event = Some(IoEvent {
                register,
                direction: IoDirection::Write,
                value,
            });
            exec
        }
        Err(cause) => ExecuteState::faulted(next_pc, cause),
    }
}

const fn execute_halt(pc: u16) -> ExecuteState {
    let mut exec = ExecuteState::new(pc);
    exec.halt = true;
    exec
}
