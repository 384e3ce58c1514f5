//! Whole-machine scenarios: interrupts, disk latency, monitor and trace output.

#![allow(clippy::pedantic, clippy::nursery)]

use log as _;
use proptest as _;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use simp_core::image::{format_registers, format_words};
use simp_core::{
    encode_fields, FaultCode, IoRegister, MachineImage, Opcode, Register, SimConfig, Simulator,
    StepOutcome, StopReason, TraceWriter, TRACE_LINE_CHARS,
};
use std::io;
use thiserror as _;

/// Encodes `op $rd, $rs, $rt, $rm, imm1, imm2`.
const fn asm(
    op: Opcode,
    rd: Register,
    rs: Register,
    rt: Register,
    rm: Register,
    imm1: i32,
    imm2: i32,
) -> u64 {
    encode_fields(op.as_u8(), rd, rs, rt, rm, imm1, imm2)
}

/// `out $imm2, $zero, $imm1, imm1` writes the constant `value` to `reg`.
const fn out_const(reg: IoRegister, value: i32) -> u64 {
    asm(
        Opcode::Out,
        Register::Zero,
        Register::Zero,
        Register::Imm1,
        Register::Imm2,
        reg as i32,
        value,
    )
}

const HALT: u64 = asm(
    Opcode::Halt,
    Register::Zero,
    Register::Zero,
    Register::Zero,
    Register::Zero,
    0,
    0,
);

/// `beq $zero, $zero, $zero, $imm1, target`: spin or jump forever.
const fn jump(target: i32) -> u64 {
    asm(
        Opcode::Beq,
        Register::Zero,
        Register::Zero,
        Register::Zero,
        Register::Imm1,
        target,
        0,
    )
}

/// Collects what `write` puts into a byte buffer as text.
fn rendered(write: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
    let mut out = Vec::new();
    write(&mut out).expect("writing to a Vec cannot fail");
    String::from_utf8(out).expect("trace output is ASCII")
}

fn machine(instructions: Vec<u64>) -> Simulator {
    machine_with(instructions, Vec::new(), Vec::new(), Vec::new())
}

fn machine_with(
    instructions: Vec<u64>,
    data: Vec<i32>,
    disk: Vec<i32>,
    irq2: Vec<u64>,
) -> Simulator {
    let image = MachineImage {
        instructions,
        data,
        disk,
        irq2,
    };
    Simulator::new(SimConfig::default(), &image)
}

#[test]
fn three_instruction_program_matches_reference_run() {
    let mut sim = machine(vec![
        asm(Opcode::Add, Register::V0, Register::Zero, Register::Zero, Register::Imm1, 5, 0),
        asm(Opcode::Add, Register::V0, Register::V0, Register::Zero, Register::Imm1, 0, 0),
        HALT,
    ]);

    let outcome = sim.run();

    assert_eq!(outcome.reason, StopReason::Halted);
    assert_eq!(outcome.cycles, 3);
    assert_eq!(sim.state().registers.gpr(Register::V0), 5);
    assert_eq!(sim.state().registers.pc(), 2);

    let trace = sim.sink().instructions();
    assert_eq!(trace.len(), 3);
    assert_eq!(trace[0].pc, 0);
    assert_eq!(trace[0].registers[1], 5, "trace shows imm1 after loading");
    assert_eq!(trace[1].registers[3], 5);
    assert_eq!(trace[2].pc, 2);

    let trace = rendered(|out| sim.sink().write_instructions(out));
    assert!(trace.lines().all(|line| line.len() == TRACE_LINE_CHARS));
    assert!(trace.starts_with("000 003001005000 00000000 00000005 00000000 00000000"));

    let regout = format_registers(&sim.state().registers.snapshot());
    assert_eq!(regout.lines().next(), Some("00000005"));
    assert_eq!(regout.lines().count(), 13);
}

#[test]
fn alu_write_to_imm_register_is_overwritten_next_cycle() {
    let mut sim = machine(vec![
        asm(Opcode::Add, Register::Imm2, Register::Imm1, Register::Zero, Register::Zero, 7, 0),
        asm(Opcode::Add, Register::V0, Register::Imm2, Register::Zero, Register::Zero, 0, 3),
        HALT,
    ]);
    sim.run();
    assert_eq!(sim.state().registers.gpr(Register::V0), 3);
}

#[test]
fn jal_through_its_link_register_continues_at_the_next_line() {
    let mut sim = machine(vec![
        asm(Opcode::Add, Register::Ra, Register::Zero, Register::Zero, Register::Imm1, 5, 0),
        asm(Opcode::Jal, Register::Ra, Register::Zero, Register::Zero, Register::Ra, 0, 0),
        HALT,
    ]);

    let outcome = sim.run();

    assert_eq!(outcome.reason, StopReason::Halted);
    assert_eq!(outcome.cycles, 3);
    assert_eq!(sim.state().registers.gpr(Register::Ra), 2);
    assert_eq!(sim.state().registers.pc(), 2);
}

#[test]
fn negative_address_does_not_stop_the_run() {
    let mut sim = machine(vec![
        asm(Opcode::Sw, Register::Imm2, Register::Imm1, Register::Zero, Register::Zero, -4, 9),
        asm(Opcode::Add, Register::V0, Register::Imm1, Register::Zero, Register::Zero, 1, 0),
        HALT,
    ]);

    assert!(matches!(sim.step(), StepOutcome::Fault { .. }));
    let outcome = sim.run();

    assert_eq!(outcome.reason, StopReason::Halted);
    assert_eq!(sim.state().registers.gpr(Register::V0), 1);
    assert!(sim.state().memory.words().iter().all(|word| *word == 0));
    assert_eq!(sim.diag().fault_count_memory, 1);
}

#[test]
fn simultaneous_interrupts_vector_once_and_reti_restores_pc() {
    let mut program = vec![
        out_const(IoRegister::IrqHandler, 0x100),
        out_const(IoRegister::Irq0Enable, 1),
        out_const(IoRegister::Irq2Enable, 1),
        out_const(IoRegister::Irq0Status, 1),
        jump(4),
    ];
    program.resize(0x100, 0);
    program.extend([
        asm(Opcode::Add, Register::S0, Register::S0, Register::Imm1, Register::Zero, 1, 0),
        out_const(IoRegister::Irq0Status, 0),
        asm(Opcode::Reti, Register::Zero, Register::Zero, Register::Zero, Register::Zero, 0, 0),
    ]);
    let mut sim = machine_with(program, Vec::new(), Vec::new(), vec![4]);

    for _ in 0..4 {
        sim.step();
    }
    assert!(!sim.interrupts().in_service());

    sim.step();
    assert!(sim.interrupts().in_service());
    assert_eq!(sim.state().io.get(IoRegister::IrqReturn), 4);
    assert_eq!(sim.diag().interrupt_count, 1);

    sim.step();
    sim.step();
    assert_eq!(sim.state().registers.pc(), 4);
    assert!(!sim.interrupts().in_service());
    assert_eq!(sim.state().registers.gpr(Register::S0), 1);

    for _ in 0..10 {
        sim.step();
    }
    assert_eq!(sim.diag().interrupt_count, 1, "both sources were served by one entry");
    assert_eq!(sim.state().registers.pc(), 4);
}

#[test]
fn external_interrupt_is_a_one_cycle_pulse() {
    let mut sim = machine_with(vec![jump(0)], Vec::new(), Vec::new(), vec![3]);
    for _ in 0..3 {
        sim.step();
    }
    assert!(!sim.state().io.is_set(IoRegister::Irq2Status));
    sim.step();
    assert!(
        !sim.state().io.is_set(IoRegister::Irq2Status),
        "cleared at the end of the cycle it was raised"
    );
    assert_eq!(sim.diag().interrupt_count, 0, "irq2 disabled");
}

#[test]
fn disk_read_is_immediate_and_busy_for_latency() {
    let mut disk = vec![0; 3 * 128];
    disk[2 * 128] = 0x1234;
    disk[2 * 128 + 127] = -7;
    let program = vec![
        out_const(IoRegister::DiskSector, 2),
        out_const(IoRegister::DiskBuffer, 1000),
        out_const(IoRegister::DiskCmd, 1),
        jump(3),
    ];
    let mut sim = machine_with(program, Vec::new(), disk, Vec::new());

    for _ in 0..3 {
        sim.step();
    }
    let started = 2;
    assert_eq!(sim.state().memory.read(1000), 0x1234);
    assert_eq!(sim.state().memory.read(1127), -7);
    assert!(sim.state().io.is_set(IoRegister::DiskStatus));

    while sim.cycles() < started + 1024 {
        sim.step();
        assert!(
            sim.state().io.is_set(IoRegister::DiskStatus),
            "busy at cycle {}",
            sim.cycles() - 1
        );
    }

    sim.step();
    assert!(!sim.state().io.is_set(IoRegister::DiskStatus));
    assert_eq!(sim.state().io.get(IoRegister::DiskCmd), 0);
    assert!(sim.state().io.is_set(IoRegister::Irq1Status));
    assert_eq!(sim.diag().disk_transfer_count, 1);
}

#[test]
fn disk_write_lands_in_disk_image() {
    let program = vec![
        out_const(IoRegister::DiskSector, 1),
        out_const(IoRegister::DiskBuffer, 0),
        out_const(IoRegister::DiskCmd, 2),
        HALT,
    ];
    let mut sim = machine_with(program, vec![5, 6, 7], Vec::new(), Vec::new());
    sim.run();

    let words = sim.disk().disk().words();
    assert_eq!(&words[128..131], &[5, 6, 7]);
    let diskout = format_words(words);
    assert_eq!(diskout.lines().count(), 131);
}

#[rstest]
#[case(IoRegister::DiskSector, 128, FaultCode::DiskSectorOutOfRange)]
#[case(IoRegister::DiskBuffer, -1, FaultCode::DiskBufferOutOfRange)]
fn bad_disk_command_is_dropped(
    #[case] reg: IoRegister,
    #[case] value: i32,
    #[case] cause: FaultCode,
) {
    let program = vec![out_const(reg, value), out_const(IoRegister::DiskCmd, 1), HALT];
    let mut sim = machine_with(program, Vec::new(), vec![1; 128 * 128], Vec::new());

    assert_eq!(sim.step(), StepOutcome::Retired);
    assert_eq!(sim.step(), StepOutcome::Fault { cause });
    let outcome = sim.run();

    assert_eq!(outcome.reason, StopReason::Halted);
    assert_eq!(sim.state().io.get(IoRegister::DiskCmd), 0);
    assert!(!sim.state().io.is_set(IoRegister::DiskStatus));
    assert!(sim.state().memory.words().iter().all(|word| *word == 0));
    assert_eq!(sim.diag().fault_count_disk, 1);
}

#[test]
fn timer_raises_irq0_every_period() {
    let program = vec![
        out_const(IoRegister::TimerMax, 3),
        out_const(IoRegister::TimerEnable, 1),
        jump(2),
    ];
    let mut sim = machine(program);
    let mut fired = Vec::new();
    for _ in 0..12 {
        let cycle = sim.cycles();
        sim.step();
        if sim.state().io.is_set(IoRegister::Irq0Status) {
            fired.push(cycle);
            break;
        }
    }
    assert_eq!(fired, vec![4]);
    assert_eq!(sim.state().io.get(IoRegister::TimerCurrent), 0);
}

#[test]
fn leds_display_and_hardware_trace_are_logged() {
    let program = vec![
        out_const(IoRegister::Leds, 1),
        out_const(IoRegister::Leds, 1),
        out_const(IoRegister::Display7Seg, 0x42),
        asm(Opcode::In, Register::V0, Register::Zero, Register::Imm1, Register::Zero, 9, 0),
        HALT,
    ];
    let mut sim = machine(program);
    sim.run();

    let recorder = sim.sink();
    assert_eq!(rendered(|out| recorder.write_leds(out)), "0 00000001\n");
    assert_eq!(rendered(|out| recorder.write_display(out)), "2 00000042\n");
    assert_eq!(
        rendered(|out| recorder.write_hardware(out)),
        "0 WRITE leds 00000001\n\
         1 WRITE leds 00000001\n\
         2 WRITE display7seg 00000042\n\
         3 READ leds 00000001\n"
    );
    assert_eq!(sim.state().registers.gpr(Register::V0), 1);
}

#[test]
fn streaming_sink_matches_the_in_memory_recorder() {
    let program = vec![
        out_const(IoRegister::Leds, 1),
        out_const(IoRegister::Display7Seg, 0x42),
        asm(Opcode::In, Register::V0, Register::Zero, Register::Imm1, Register::Zero, 9, 0),
        HALT,
    ];
    let image = MachineImage {
        instructions: program,
        ..MachineImage::default()
    };

    let mut recorded = Simulator::new(SimConfig::default(), &image);
    recorded.run();
    let recorder = recorded.sink();

    let (mut trace, mut hardware, mut leds, mut display) =
        (Vec::new(), Vec::new(), Vec::new(), Vec::new());
    let sink = TraceWriter::new(&mut trace, &mut hardware, &mut leds, &mut display);
    let mut streamed = Simulator::with_sink(SimConfig::default(), &image, sink);
    let outcome = streamed.run();
    streamed.into_sink().finish().expect("vec write");

    assert_eq!(outcome.cycles, 4);
    assert_eq!(String::from_utf8_lossy(&trace), rendered(|out| recorder.write_instructions(out)));
    assert_eq!(String::from_utf8_lossy(&hardware), rendered(|out| recorder.write_hardware(out)));
    assert_eq!(String::from_utf8_lossy(&leds), rendered(|out| recorder.write_leds(out)));
    assert_eq!(String::from_utf8_lossy(&display), rendered(|out| recorder.write_display(out)));
}

#[test]
fn monitor_strobe_writes_pixel() {
    let program = vec![
        out_const(IoRegister::MonitorAddr, 0x0203),
        out_const(IoRegister::MonitorData, 0x1FF),
        out_const(IoRegister::MonitorCmd, 1),
        out_const(IoRegister::MonitorCmd, 0),
        HALT,
    ];
    let mut sim = machine(program);
    sim.run();
    assert_eq!(sim.monitor().pixel(2, 3), 0xFF);
    assert_eq!(sim.monitor().pixels().iter().filter(|p| **p != 0).count(), 1);
}

#[test]
fn falling_off_the_program_wraps_to_line_zero() {
    let config = SimConfig {
        max_cycles: 4097,
        ..SimConfig::default()
    };
    let image = MachineImage {
        instructions: vec![asm(
            Opcode::Add,
            Register::S0,
            Register::S0,
            Register::Imm1,
            Register::Zero,
            1,
            0,
        )],
        ..MachineImage::default()
    };
    let mut sim = Simulator::new(config, &image);
    let outcome = sim.run();

    assert_eq!(outcome.reason, StopReason::CycleBudget);
    assert_eq!(sim.state().registers.gpr(Register::S0), 2);
    assert_eq!(sim.state().registers.pc(), 1);
}
