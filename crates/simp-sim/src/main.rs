//! CLI entry point for the SIMP simulator binary.

use std::env;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use log::{debug, info};
use simp_core::image::{
    format_cycles, format_pixels, format_registers, format_words, parse_instructions,
    parse_schedule, parse_words,
};
use simp_core::peripherals::DISK_WORDS;
use simp_core::{
    disassemble_window, ImageError, MachineImage, RunOutcome, SimConfig, Simulator, StopReason,
    TraceWriter, DATA_MEMORY_WORDS,
};
#[cfg(test)]
use tempfile as _;
use thiserror::Error;

const USAGE_TEXT: &str = "\
Usage: simp-sim [options] <imemin> <dmemin> <diskin> <irq2in> <dmemout> <regout>
                <trace> <hwregtrace> <cycles> <leds> <display7seg> <diskout>
                <monitor> [monitor.yuv]

Options:
  --max-cycles <n>  Stop after <n> cycles if the program has not halted
  --no-trace        Do not record the per-cycle execution trace
  -h, --help        Show this help message

Set RUST_LOG=debug to log interrupts and disk transfers.

Examples:
  simp-sim imemin.txt dmemin.txt diskin.txt irq2in.txt dmemout.txt regout.txt \\
           trace.txt hwregtrace.txt cycles.txt leds.txt display7seg.txt \\
           diskout.txt monitor.txt monitor.yuv
";

const INPUT_FILES: usize = 4;
const OUTPUT_FILES: usize = 9;
const REQUIRED_FILES: usize = INPUT_FILES + OUTPUT_FILES;

/// Fatal failure that stops the simulator before or after the run.
#[derive(Debug, Error)]
enum SimError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("{}: {source}", path.display())]
    Image { path: PathBuf, source: ImageError },
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to write trace outputs: {source}")]
    Trace { source: io::Error },
}

/// Simulator streaming its trace files straight to disk.
type FileSimulator = Simulator<TraceWriter<BufWriter<File>>>;

#[derive(Debug, PartialEq, Eq)]
struct InputPaths {
    imem: PathBuf,
    dmem: PathBuf,
    disk: PathBuf,
    irq2: PathBuf,
}

#[derive(Debug, PartialEq, Eq)]
struct OutputPaths {
    dmem: PathBuf,
    regs: PathBuf,
    trace: PathBuf,
    hwreg: PathBuf,
    cycles: PathBuf,
    leds: PathBuf,
    display: PathBuf,
    disk: PathBuf,
    monitor: PathBuf,
    monitor_yuv: Option<PathBuf>,
}

#[derive(Debug, PartialEq, Eq)]
struct RunArgs {
    inputs: InputPaths,
    outputs: OutputPaths,
    config: SimConfig,
}

#[derive(Debug)]
enum ParseResult {
    Run(Box<RunArgs>),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut config = SimConfig::default();
    let mut files: Vec<PathBuf> = Vec::with_capacity(REQUIRED_FILES + 1);

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(ParseResult::Help);
        }

        if arg == "--no-trace" {
            config.trace_enabled = false;
            continue;
        }

        if arg == "--max-cycles" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --max-cycles".to_string())?;
            let value = value.to_string_lossy();
            config.max_cycles = value
                .parse()
                .map_err(|_| format!("invalid cycle count: {value}"))?;
            continue;
        }

        if arg.to_string_lossy().starts_with("--") {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        files.push(PathBuf::from(arg));
    }

    if files.len() < REQUIRED_FILES {
        return Err(format!(
            "expected {REQUIRED_FILES} file paths, got {}",
            files.len()
        ));
    }
    if files.len() > REQUIRED_FILES + 1 {
        return Err(format!(
            "expected at most {} file paths, got {}",
            REQUIRED_FILES + 1,
            files.len()
        ));
    }

    let mut files = files.into_iter();
    let mut next = || files.next().unwrap_or_default();
    let inputs = InputPaths {
        imem: next(),
        dmem: next(),
        disk: next(),
        irq2: next(),
    };
    let outputs = OutputPaths {
        dmem: next(),
        regs: next(),
        trace: next(),
        hwreg: next(),
        cycles: next(),
        leds: next(),
        display: next(),
        disk: next(),
        monitor: next(),
        monitor_yuv: files.next(),
    };

    Ok(ParseResult::Run(Box::new(RunArgs {
        inputs,
        outputs,
        config,
    })))
}

fn read_text(path: &Path) -> Result<String, SimError> {
    fs::read_to_string(path).map_err(|source| SimError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), SimError> {
    fs::write(path, contents).map_err(|source| SimError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn create_file(path: &Path) -> Result<BufWriter<File>, SimError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| SimError::Write {
            path: path.to_path_buf(),
            source,
        })
}

fn load_image(inputs: &InputPaths) -> Result<MachineImage, SimError> {
    let imem = read_text(&inputs.imem)?;
    let dmem = read_text(&inputs.dmem)?;
    let disk = read_text(&inputs.disk)?;
    let irq2 = read_text(&inputs.irq2)?;

    let tag = |path: &Path| {
        let path = path.to_path_buf();
        move |source| SimError::Image { path, source }
    };

    Ok(MachineImage {
        instructions: parse_instructions(&imem).map_err(tag(&inputs.imem))?,
        data: parse_words(&dmem, DATA_MEMORY_WORDS).map_err(tag(&inputs.dmem))?,
        disk: parse_words(&disk, DISK_WORDS).map_err(tag(&inputs.disk))?,
        irq2: parse_schedule(&irq2).map_err(tag(&inputs.irq2))?,
    })
}

fn trace_sink(outputs: &OutputPaths) -> Result<TraceWriter<BufWriter<File>>, SimError> {
    Ok(TraceWriter::new(
        create_file(&outputs.trace)?,
        create_file(&outputs.hwreg)?,
        create_file(&outputs.leds)?,
        create_file(&outputs.display)?,
    ))
}

fn write_outputs(
    sim: FileSimulator,
    outcome: RunOutcome,
    outputs: &OutputPaths,
) -> Result<(), SimError> {
    let state = sim.state();

    write_file(&outputs.dmem, format_words(state.memory.words()))?;
    write_file(&outputs.regs, format_registers(&state.registers.snapshot()))?;
    write_file(&outputs.cycles, format_cycles(outcome.cycles))?;
    write_file(&outputs.disk, format_words(sim.disk().disk().words()))?;
    write_file(&outputs.monitor, format_pixels(sim.monitor().pixels()))?;
    if let Some(path) = &outputs.monitor_yuv {
        write_file(path, sim.monitor().pixels())?;
    }
    sim.into_sink()
        .finish()
        .map_err(|source| SimError::Trace { source })
}

fn report(sim: &FileSimulator, outcome: RunOutcome) {
    let pc = sim.state().registers.pc();
    let verb = match outcome.reason {
        StopReason::Halted => "halted",
        StopReason::CycleBudget => "stopped",
    };
    info!("{verb} at pc {pc:03X} after {} cycles", outcome.cycles);
    for row in disassemble_window(pc, 2, 2, sim.program()) {
        let marker = if row.addr == pc { '>' } else { ' ' };
        debug!(
            "{marker} {:03X}: {:012X}  {} {}",
            row.addr, row.raw, row.mnemonic, row.operands
        );
    }
    info!("{}", sim.diag());
}

fn run(args: RunArgs) -> Result<(), SimError> {
    let image = load_image(&args.inputs)?;
    let sink = trace_sink(&args.outputs)?;
    let mut sim = Simulator::with_sink(args.config, &image, sink);
    let outcome = sim.run();
    report(&sim, outcome);
    write_outputs(sim, outcome, &args.outputs)
}

fn main() {
    env_logger::init();

    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Run(args)) => match run(*args) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("error: {e}");
                1
            }
        },
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            2
        }
    };

    std::process::exit(exit_code);
}
