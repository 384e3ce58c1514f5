//! Opcode semantics coverage driven through the public execute pipeline.

#![allow(clippy::pedantic, clippy::nursery, clippy::cast_sign_loss)]

use log as _;
use proptest::prelude::*;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use simp_core::{
    commit_execution, encode_fields, execute_instruction, hex_to_decimal, to_hex, CoreState,
    Decoder, FaultCode, Instruction, IoRegister, Opcode, Register, OPCODE_TABLE,
};
use thiserror as _;

const fn instr(op: Opcode, rd: Register, rs: Register, rt: Register, rm: Register) -> u64 {
    encode_fields(op.as_u8(), rd, rs, rt, rm, 0, 0)
}

fn decode(raw: u64) -> Instruction {
    Decoder::decode(raw)
}

/// Seeds `$t0`, `$t1`, `$t2` with `a`, `b`, `c`.
fn seeded(a: i32, b: i32, c: i32) -> CoreState {
    let mut state = CoreState::default();
    state.registers.set_gpr(Register::T0, a);
    state.registers.set_gpr(Register::T1, b);
    state.registers.set_gpr(Register::T2, c);
    state
}

fn run_alu(op: Opcode, a: i32, b: i32, c: i32) -> i32 {
    let mut state = seeded(a, b, c);
    let instruction = decode(instr(op, Register::V0, Register::T0, Register::T1, Register::T2));
    let exec = execute_instruction(&instruction, &state);
    commit_execution(&mut state, &exec);
    state.registers.gpr(Register::V0)
}

#[rstest]
#[case(Opcode::Add, 1, 2, 3, 6)]
#[case(Opcode::Add, i32::MAX, 1, 0, i32::MIN)]
#[case(Opcode::Sub, 10, 3, 2, 5)]
#[case(Opcode::Sub, 0, 1, 0, -1)]
#[case(Opcode::Mac, 6, 7, 2, 40)]
#[case(Opcode::Mac, -3, 5, -1, -14)]
#[case(Opcode::And, 0b1111, 0b0110, 0b0011, 0b0010)]
#[case(Opcode::Or, 0b0001, 0b0100, 0b1000, 0b1101)]
#[case(Opcode::Xor, 0b1111, 0b0101, 0b0011, 0b1001)]
#[case(Opcode::Sll, 3, 4, 0, 48)]
#[case(Opcode::Sll, 1, 32, 0, 0)]
#[case(Opcode::Sra, -64, 3, 0, -8)]
#[case(Opcode::Sra, i32::MIN, 100, 0, -1)]
#[case(Opcode::Srl, -1, 31, 0, 1)]
#[case(Opcode::Srl, -1, 32, 0, 0)]
fn alu_opcodes(
    #[case] op: Opcode,
    #[case] a: i32,
    #[case] b: i32,
    #[case] c: i32,
    #[case] expected: i32,
) {
    assert_eq!(run_alu(op, a, b, c), expected, "{op:?}({a}, {b}, {c})");
}

#[rstest]
#[case(Opcode::Beq, 4, 4, true)]
#[case(Opcode::Beq, 4, 5, false)]
#[case(Opcode::Bne, 4, 5, true)]
#[case(Opcode::Bne, 4, 4, false)]
#[case(Opcode::Blt, -1, 0, true)]
#[case(Opcode::Blt, 0, 0, false)]
#[case(Opcode::Bgt, 0, -1, true)]
#[case(Opcode::Bgt, -1, 0, false)]
#[case(Opcode::Ble, 0, 0, true)]
#[case(Opcode::Ble, 1, 0, false)]
#[case(Opcode::Bge, 0, 0, true)]
#[case(Opcode::Bge, -5, 0, false)]
fn branch_opcodes(#[case] op: Opcode, #[case] a: i32, #[case] b: i32, #[case] taken: bool) {
    let mut state = seeded(a, b, 0x7_0123);
    state.registers.set_pc(0x010);
    let instruction = decode(instr(op, Register::Zero, Register::T0, Register::T1, Register::T2));

    let exec = execute_instruction(&instruction, &state);
    commit_execution(&mut state, &exec);

    let expected = if taken { 0x123 } else { 0x011 };
    assert_eq!(state.registers.pc(), expected, "{op:?}({a}, {b})");
}

#[test]
fn every_assigned_opcode_executes_without_fault_on_clean_state() {
    for (value, opcode, _) in OPCODE_TABLE {
        let state = CoreState::default();
        let instruction = decode(encode_fields(
            *value,
            Register::Zero,
            Register::Zero,
            Register::Zero,
            Register::Zero,
            0,
            0,
        ));
        let exec = execute_instruction(&instruction, &state);
        assert!(exec.fault.is_none(), "{opcode:?} faulted on address 0");
        assert_eq!(exec.halt, *opcode == Opcode::Halt);
    }
}

#[test]
fn jal_stores_return_address_and_jumps() {
    let mut state = seeded(0, 0, 0x0ABC);
    state.registers.set_pc(0x0FF);
    let instruction = decode(instr(
        Opcode::Jal,
        Register::Ra,
        Register::Zero,
        Register::Zero,
        Register::T2,
    ));

    let exec = execute_instruction(&instruction, &state);
    commit_execution(&mut state, &exec);

    assert_eq!(state.registers.gpr(Register::Ra), 0x100);
    assert_eq!(state.registers.pc(), 0xABC);
}

#[test]
fn load_and_store_use_rs_plus_rt_addressing() {
    let mut state = seeded(4000, 95, 1);
    state.registers.set_gpr(Register::V0, 41);

    let store = decode(instr(Opcode::Sw, Register::V0, Register::T0, Register::T1, Register::T2));
    let exec = execute_instruction(&store, &state);
    commit_execution(&mut state, &exec);
    assert_eq!(state.memory.read(4095), 42);

    let load = decode(instr(Opcode::Lw, Register::S0, Register::T0, Register::T1, Register::T2));
    let exec = execute_instruction(&load, &state);
    commit_execution(&mut state, &exec);
    assert_eq!(state.registers.gpr(Register::S0), 43);
}

#[rstest]
#[case(Opcode::Lw, -1, FaultCode::NegativeMemoryAddress)]
#[case(Opcode::Sw, -1, FaultCode::NegativeMemoryAddress)]
#[case(Opcode::Lw, 4096, FaultCode::MemoryAddressOutOfRange)]
#[case(Opcode::Sw, 4096, FaultCode::MemoryAddressOutOfRange)]
#[case(Opcode::In, -1, FaultCode::NegativeIoAddress)]
#[case(Opcode::Out, -1, FaultCode::NegativeIoAddress)]
#[case(Opcode::In, 23, FaultCode::IoAddressOutOfRange)]
#[case(Opcode::Out, 23, FaultCode::IoAddressOutOfRange)]
fn illegal_addresses_change_nothing_but_pc(
    #[case] op: Opcode,
    #[case] address: i32,
    #[case] fault: FaultCode,
) {
    let mut state = seeded(address, 0, 99);
    state.registers.set_gpr(Register::V0, 7);
    let before = state.clone();
    let instruction = decode(instr(op, Register::V0, Register::T0, Register::T1, Register::T2));

    let exec = execute_instruction(&instruction, &state);
    assert_eq!(exec.fault, Some(fault));
    commit_execution(&mut state, &exec);

    assert_eq!(state.registers.pc(), 1);
    assert_eq!(state.registers.snapshot(), before.registers.snapshot());
    assert_eq!(state.memory, before.memory);
    assert_eq!(state.io, before.io);
}

#[test]
fn in_and_out_move_words_through_the_hardware_bank() {
    let mut state = seeded(IoRegister::TimerMax.index() as i32, 0, -2);

    let out = decode(instr(Opcode::Out, Register::Zero, Register::T0, Register::T1, Register::T2));
    let exec = execute_instruction(&out, &state);
    commit_execution(&mut state, &exec);
    assert_eq!(state.io.get(IoRegister::TimerMax), 0xFFFF_FFFE);

    let input = decode(instr(Opcode::In, Register::S0, Register::T0, Register::T1, Register::Zero));
    let exec = execute_instruction(&input, &state);
    commit_execution(&mut state, &exec);
    assert_eq!(state.registers.gpr(Register::S0), -2);
}

proptest! {
    #[test]
    fn property_add_wraps_modulo_word(a in any::<i32>(), b in any::<i32>(), c in any::<i32>()) {
        let expected = (i64::from(a) + i64::from(b) + i64::from(c)).rem_euclid(1 << 32);
        let result = i64::from(run_alu(Opcode::Add, a, b, c) as u32);
        prop_assert_eq!(result, expected);
    }

    #[test]
    fn property_sra_of_negative_saturates_at_minus_one(value in i32::MIN..0, amount in 0_i32..64) {
        let shifted = run_alu(Opcode::Sra, value, amount, 0);
        let further = run_alu(Opcode::Sra, value, amount + 1, 0);
        prop_assert!(shifted < 0);
        prop_assert!(further >= shifted);
        if amount >= 31 {
            prop_assert_eq!(shifted, -1);
        }
    }

    #[test]
    fn property_srl_decreases_to_zero(value in any::<i32>(), amount in 0_i32..64) {
        let shifted = run_alu(Opcode::Srl, value, amount, 0) as u32;
        let further = run_alu(Opcode::Srl, value, amount + 1, 0) as u32;
        prop_assert!(further <= shifted);
        if amount >= 32 {
            prop_assert_eq!(shifted, 0);
        }
    }

    #[test]
    fn property_word_hex_round_trips(value in any::<i32>()) {
        let hex = to_hex(i64::from(value), 8);
        prop_assert_eq!(hex.len(), 8);
        prop_assert_eq!(hex_to_decimal(&hex, true), Ok(i64::from(value)));
    }

    #[test]
    fn property_immediate_hex_round_trips(value in -2048_i64..2048) {
        let hex = to_hex(value, 3);
        prop_assert_eq!(hex_to_decimal(&hex, true), Ok(value));
    }

    #[test]
    fn property_decode_never_fails_and_flags_unknown_opcodes(raw in any::<u64>()) {
        let instruction = Decoder::decode(raw);
        prop_assert!(instruction.raw <= 0xFFFF_FFFF_FFFF);
        prop_assert!((-2048..2048).contains(&instruction.imm1));
        prop_assert!((-2048..2048).contains(&instruction.imm2));
        if instruction.opcode > 21 {
            prop_assert_eq!(instruction.operation(), Err(FaultCode::UnknownOpcode));
        } else {
            prop_assert!(instruction.operation().is_ok());
        }
    }
}
