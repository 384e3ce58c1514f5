//! Deterministic run fingerprint used for cross-host comparison.
//!
//! Runs a small program that exercises the timer interrupt, a disk read and
//! the monitor, then hashes the final machine state and every trace stream.

use log as _;
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use simp_core::{
    encode_fields, IoRegister, MachineImage, Opcode, Register, SimConfig, Simulator, StopReason,
};
use std::io;
use thiserror as _;

const fn out_const(reg: IoRegister, value: i32) -> u64 {
    encode_fields(
        Opcode::Out.as_u8(),
        Register::Zero,
        Register::Zero,
        Register::Imm1,
        Register::Imm2,
        reg as i32,
        value,
    )
}

fn program() -> Vec<u64> {
    let mut program = vec![
        out_const(IoRegister::IrqHandler, 0x80),
        out_const(IoRegister::TimerMax, 40),
        out_const(IoRegister::Irq0Enable, 1),
        out_const(IoRegister::TimerEnable, 1),
        out_const(IoRegister::DiskSector, 5),
        out_const(IoRegister::DiskCmd, 1),
        // add $s0, $s0, $imm1, $zero, 1, 0
        encode_fields(
            Opcode::Add.as_u8(),
            Register::S0,
            Register::S0,
            Register::Imm1,
            Register::Zero,
            1,
            0,
        ),
        // blt $zero, $s0, $imm1, $imm2, 2000, 6
        encode_fields(
            Opcode::Blt.as_u8(),
            Register::Zero,
            Register::S0,
            Register::Imm1,
            Register::Imm2,
            2000,
            6,
        ),
        encode_fields(
            Opcode::Halt.as_u8(),
            Register::Zero,
            Register::Zero,
            Register::Zero,
            Register::Zero,
            0,
            0,
        ),
    ];
    program.resize(0x80, 0);
    program.extend([
        out_const(IoRegister::Leds, 1),
        out_const(IoRegister::MonitorData, 0xAA),
        out_const(IoRegister::MonitorCmd, 1),
        out_const(IoRegister::Irq0Status, 0),
        out_const(IoRegister::MonitorCmd, 0),
        encode_fields(
            Opcode::Reti.as_u8(),
            Register::Zero,
            Register::Zero,
            Register::Zero,
            Register::Zero,
            0,
            0,
        ),
    ]);
    program
}

fn hash_bytes(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= u64::from(*byte);
        *hash = hash.wrapping_mul(0x1000_0000_01B3);
    }
}

fn fingerprint() -> io::Result<String> {
    let image = MachineImage {
        instructions: program(),
        disk: (0..128 * 128).collect(),
        ..MachineImage::default()
    };
    let mut sim = Simulator::new(SimConfig::default(), &image);
    let outcome = sim.run();

    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    hash_bytes(&mut hash, &outcome.cycles.to_le_bytes());
    hash_bytes(
        &mut hash,
        &[match outcome.reason {
            StopReason::Halted => 0x10,
            StopReason::CycleBudget => 0x11,
        }],
    );

    let state = sim.state();
    hash_bytes(&mut hash, &state.registers.pc().to_le_bytes());
    for value in state.registers.snapshot() {
        hash_bytes(&mut hash, &value.to_le_bytes());
    }
    for value in state.memory.words() {
        hash_bytes(&mut hash, &value.to_le_bytes());
    }
    hash_bytes(&mut hash, sim.monitor().pixels());

    let recorder = sim.sink();
    let mut streams = Vec::new();
    recorder.write_instructions(&mut streams)?;
    recorder.write_hardware(&mut streams)?;
    recorder.write_leds(&mut streams)?;
    hash_bytes(&mut hash, &streams);

    Ok(format!("{hash:016x}"))
}

fn main() {
    match fingerprint() {
        Ok(hash) => println!("{hash}"),
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    }
}
