//! Trace sinks for the execution trace and hardware logs.
//!
//! [`TraceRecorder`] keeps every record in memory for inspection;
//! [`TraceWriter`] streams each line to its output as the event arrives. Each
//! `Display` implementation renders exactly one output line without the
//! trailing newline.

use std::fmt;
use std::io::{self, Write};

use crate::api::{TraceEvent, TraceSink};
use crate::execute::IoEvent;
use crate::GENERAL_REGISTER_COUNT;

/// Length of one rendered execution-trace line.
pub const TRACE_LINE_CHARS: usize = 3 + 1 + 12 + GENERAL_REGISTER_COUNT * 9;

/// One instruction as it was about to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    /// Program counter.
    pub pc: u16,
    /// Raw 48-bit instruction word.
    pub raw: u64,
    /// `R0..R15` after the immediates load.
    pub registers: [i32; GENERAL_REGISTER_COUNT],
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03X} {:012X}", self.pc, self.raw)?;
        for value in self.registers {
            write!(f, " {value:08X}")?;
        }
        Ok(())
    }
}

/// One `in`/`out` access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareRecord {
    /// Cycle of the access.
    pub cycle: u64,
    /// The access.
    pub event: IoEvent,
}

impl fmt::Display for HardwareRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {:08X}",
            self.cycle,
            self.event.direction.as_str(),
            self.event.register.name(),
            self.event.value
        )
    }
}

/// One value change on an output register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRecord {
    /// Cycle of the change.
    pub cycle: u64,
    /// New value.
    pub value: u32,
}

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:08X}", self.cycle, self.value)
    }
}

/// In-memory sink for every trace stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceRecorder {
    instructions: Vec<TraceRecord>,
    hardware: Vec<HardwareRecord>,
    leds: Vec<ChangeRecord>,
    display: Vec<ChangeRecord>,
}

impl TraceSink for TraceRecorder {
    fn on_event(&mut self, event: TraceEvent) {
        match event {
            TraceEvent::InstructionStart { pc, raw, registers } => {
                self.instructions.push(TraceRecord { pc, raw, registers });
            }
            TraceEvent::HardwareAccess { cycle, event } => {
                self.hardware.push(HardwareRecord { cycle, event });
            }
            TraceEvent::LedsChanged { cycle, value } => {
                self.leds.push(ChangeRecord { cycle, value });
            }
            TraceEvent::DisplayChanged { cycle, value } => {
                self.display.push(ChangeRecord { cycle, value });
            }
        }
    }
}

impl TraceRecorder {
    /// Execution trace records.
    #[must_use]
    pub fn instructions(&self) -> &[TraceRecord] {
        &self.instructions
    }

    /// Hardware-register access records.
    #[must_use]
    pub fn hardware(&self) -> &[HardwareRecord] {
        &self.hardware
    }

    /// LED change records.
    #[must_use]
    pub fn leds(&self) -> &[ChangeRecord] {
        &self.leds
    }

    /// Seven-segment display change records.
    #[must_use]
    pub fn display(&self) -> &[ChangeRecord] {
        &self.display
    }

    /// Writes the execution trace file.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `out`.
    pub fn write_instructions(&self, out: impl Write) -> io::Result<()> {
        write_lines(&self.instructions, out)
    }

    /// Writes the hardware-register trace file.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `out`.
    pub fn write_hardware(&self, out: impl Write) -> io::Result<()> {
        write_lines(&self.hardware, out)
    }

    /// Writes the LED log file.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `out`.
    pub fn write_leds(&self, out: impl Write) -> io::Result<()> {
        write_lines(&self.leds, out)
    }

    /// Writes the seven-segment log file.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `out`.
    pub fn write_display(&self, out: impl Write) -> io::Result<()> {
        write_lines(&self.display, out)
    }
}

fn write_lines<T: fmt::Display>(records: &[T], mut out: impl Write) -> io::Result<()> {
    for record in records {
        writeln!(out, "{record}")?;
    }
    Ok(())
}

/// Sink that streams every trace file to its own writer while the run goes on.
///
/// Nothing is kept beyond what the writers buffer themselves. The first write
/// error stops all further output and is reported by [`TraceWriter::finish`].
#[derive(Debug)]
pub struct TraceWriter<W: Write> {
    instructions: W,
    hardware: W,
    leds: W,
    display: W,
    error: Option<io::Error>,
}

impl<W: Write> TraceWriter<W> {
    /// Creates a sink over the trace, hwregtrace, leds and display7seg
    /// outputs.
    #[must_use]
    pub const fn new(instructions: W, hardware: W, leds: W, display: W) -> Self {
        Self {
            instructions,
            hardware,
            leds,
            display,
            error: None,
        }
    }

    /// Flushes every output.
    ///
    /// # Errors
    ///
    /// Returns the first error met while writing or flushing.
    pub fn finish(mut self) -> io::Result<()> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.instructions.flush()?;
        self.hardware.flush()?;
        self.leds.flush()?;
        self.display.flush()
    }

    fn write_event(&mut self, event: TraceEvent) -> io::Result<()> {
        match event {
            TraceEvent::InstructionStart { pc, raw, registers } => {
                writeln!(self.instructions, "{}", TraceRecord { pc, raw, registers })
            }
            TraceEvent::HardwareAccess { cycle, event } => {
                writeln!(self.hardware, "{}", HardwareRecord { cycle, event })
            }
            TraceEvent::LedsChanged { cycle, value } => {
                writeln!(self.leds, "{}", ChangeRecord { cycle, value })
            }
            TraceEvent::DisplayChanged { cycle, value } => {
                writeln!(self.display, "{}", ChangeRecord { cycle, value })
            }
        }
    }
}

impl<W: Write> TraceSink for TraceWriter<W> {
    fn on_event(&mut self, event: TraceEvent) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.write_event(event) {
            self.error = Some(error);
        }
    }
}
