//! Text formats for memory images and run outputs.
//!
//! Input images hold one value per line. Surrounding whitespace and blank lines
//! are ignored, and every location past the last line reads as zero. Output
//! images are written up to and including their last non-zero entry.

use thiserror::Error;

use crate::decoder::Decoder;
use crate::peripherals::DISK_WORDS;
use crate::word::{hex_to_word, to_hex, word_to_hex, CodecError};
use crate::{DATA_MEMORY_WORDS, GENERAL_REGISTER_COUNT, INSTRUCTION_MEMORY_LINES};

/// First register written to the register dump; `R0..R2` are omitted.
pub const FIRST_DUMPED_REGISTER: usize = 3;

const PIXEL_HEX_DIGITS: usize = 2;

/// Failure to load an input image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    /// A line is not a valid encoded value.
    #[error("line {line}: {source}")]
    Codec {
        /// 1-based line number.
        line: usize,
        /// Underlying decode failure.
        source: CodecError,
    },
    /// More entries than the destination store holds.
    #[error("image has {entries} entries but only {capacity} fit")]
    TooLarge {
        /// Entries supplied.
        entries: usize,
        /// Store capacity.
        capacity: usize,
    },
    /// A schedule line is not a decimal cycle number.
    #[error("line {line}: {text:?} is not a cycle number")]
    InvalidCycle {
        /// 1-based line number.
        line: usize,
        /// Offending text.
        text: String,
    },
}

/// Every input a simulation starts from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MachineImage {
    /// Raw instruction words from line 0.
    pub instructions: Vec<u64>,
    /// Initial data memory from address 0.
    pub data: Vec<i32>,
    /// Initial disk contents from sector 0.
    pub disk: Vec<i32>,
    /// Cycles that raise the external interrupt.
    pub irq2: Vec<u64>,
}

impl MachineImage {
    /// Parses the four input files.
    ///
    /// # Errors
    ///
    /// Returns the first [`ImageError`] found.
    pub fn parse(imem: &str, dmem: &str, disk: &str, irq2: &str) -> Result<Self, ImageError> {
        Ok(Self {
            instructions: parse_instructions(imem)?,
            data: parse_words(dmem, DATA_MEMORY_WORDS)?,
            disk: parse_words(disk, DISK_WORDS)?,
            irq2: parse_schedule(irq2)?,
        })
    }
}

fn entries(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

fn check_capacity(entries: usize, capacity: usize) -> Result<(), ImageError> {
    if entries > capacity {
        return Err(ImageError::TooLarge { entries, capacity });
    }
    Ok(())
}

/// Parses an instruction image of twelve-hex-digit lines.
///
/// # Errors
///
/// Returns [`ImageError::Codec`] for a malformed line and
/// [`ImageError::TooLarge`] past 4096 lines.
pub fn parse_instructions(text: &str) -> Result<Vec<u64>, ImageError> {
    let words = entries(text)
        .map(|(line, entry)| {
            Decoder::decode_line(entry)
                .map(|instruction| instruction.raw)
                .map_err(|source| ImageError::Codec { line, source })
        })
        .collect::<Result<Vec<_>, _>>()?;
    check_capacity(words.len(), INSTRUCTION_MEMORY_LINES)?;
    Ok(words)
}

/// Parses a word image of eight-hex-digit lines into at most `capacity` words.
///
/// # Errors
///
/// Returns [`ImageError::Codec`] for a malformed line and
/// [`ImageError::TooLarge`] past `capacity` lines.
pub fn parse_words(text: &str, capacity: usize) -> Result<Vec<i32>, ImageError> {
    let words = entries(text)
        .map(|(line, entry)| {
            hex_to_word(entry).map_err(|source| ImageError::Codec { line, source })
        })
        .collect::<Result<Vec<_>, _>>()?;
    check_capacity(words.len(), capacity)?;
    Ok(words)
}

/// Parses an external-interrupt schedule of decimal cycle numbers.
///
/// # Errors
///
/// Returns [`ImageError::InvalidCycle`] for a line that is not a non-negative
/// decimal number.
pub fn parse_schedule(text: &str) -> Result<Vec<u64>, ImageError> {
    entries(text)
        .map(|(line, entry)| {
            entry.parse::<u64>().map_err(|_| ImageError::InvalidCycle {
                line,
                text: entry.to_string(),
            })
        })
        .collect()
}

fn used_len<T: Default + PartialEq>(values: &[T]) -> usize {
    let zero = T::default();
    values
        .iter()
        .rposition(|value| *value != zero)
        .map_or(0, |last| last + 1)
}

/// Renders words as eight-hex-digit lines up to the last non-zero word.
#[must_use]
pub fn format_words(words: &[i32]) -> String {
    format_all(&words[..used_len(words)])
}

/// Renders `R3..R15`, one eight-hex-digit word per line.
#[must_use]
pub fn format_registers(registers: &[i32; GENERAL_REGISTER_COUNT]) -> String {
    format_all(&registers[FIRST_DUMPED_REGISTER..])
}

fn format_all(words: &[i32]) -> String {
    words.iter().fold(String::new(), |mut out, word| {
        out.push_str(&word_to_hex(*word));
        out.push('\n');
        out
    })
}

/// Renders framebuffer bytes as two-hex-digit lines up to the last lit pixel.
#[must_use]
pub fn format_pixels(pixels: &[u8]) -> String {
    pixels[..used_len(pixels)]
        .iter()
        .fold(String::new(), |mut out, pixel| {
            out.push_str(&to_hex(i64::from(*pixel), PIXEL_HEX_DIGITS));
            out.push('\n');
            out
        })
}

/// Renders the cycle count file.
#[must_use]
pub fn format_cycles(cycles: u64) -> String {
    format!("{cycles}\n")
}
