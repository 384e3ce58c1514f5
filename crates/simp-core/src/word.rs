//! Fixed-width text encodings of machine words.
//!
//! Images and logs carry words as fixed-width hex (and, for diagnostics,
//! binary) digit strings. Inside the core every value is a native integer;
//! this module is the only place where the two meet.
//!
//! Signed decoding never leans on native overflow: a negative binary string is
//! decoded by inverting every bit, reading the result unsigned, negating it and
//! subtracting one.

use thiserror::Error;

/// Hex digits used for one data word in images, traces and logs.
pub const WORD_HEX_DIGITS: usize = 8;

/// Widest hex string accepted by [`hex_to_decimal`].
pub const MAX_HEX_DIGITS: usize = 15;

/// Widest binary string accepted by [`signed_binary_to_decimal`].
pub const MAX_BINARY_DIGITS: usize = 64;

/// Failure to interpret a digit string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The input held no digits.
    #[error("empty digit string")]
    Empty,
    /// A character outside `0-9a-fA-F`.
    #[error("invalid hex digit {0:?}")]
    InvalidHexDigit(char),
    /// A character other than `0` or `1`.
    #[error("invalid binary digit {0:?}")]
    InvalidBinaryDigit(char),
    /// More digits than the decoder supports.
    #[error("{digits} digits exceed the {max}-digit limit")]
    TooWide {
        /// Digits supplied.
        digits: usize,
        /// Digits supported.
        max: usize,
    },
}

/// Encodes `value` as exactly `digits` upper-case hex digits.
///
/// Negative values are written as `2^(4 * digits) + value`, so `-1` over eight
/// digits becomes `FFFFFFFF`. Values outside the width wrap modulo
/// `2^(4 * digits)`; callers are expected to have validated the width.
#[must_use]
pub fn to_hex(value: i64, digits: usize) -> String {
    let modulus = 1_i128 << (4 * digits.min(31));
    let encoded = i128::from(value).rem_euclid(modulus);
    format!("{encoded:0digits$X}")
}

/// Encodes `value` as exactly `bits` binary digits in two's complement.
#[must_use]
pub fn to_binary(value: i64, bits: usize) -> String {
    let modulus = 1_i128 << bits.min(126);
    let encoded = i128::from(value).rem_euclid(modulus);
    format!("{encoded:0bits$b}")
}

/// Encodes a 32-bit word as eight hex digits.
#[must_use]
pub fn word_to_hex(value: i32) -> String {
    to_hex(i64::from(value), WORD_HEX_DIGITS)
}

/// Decodes a two's-complement binary string whose width is its length.
///
/// The most significant digit selects the sign. For negative input every bit
/// is flipped, the flipped string is read unsigned, and the result is negated
/// and decremented.
///
/// # Errors
///
/// Returns [`CodecError`] for empty input, non-binary characters, or more than
/// 64 digits.
pub fn signed_binary_to_decimal(bits: &str) -> Result<i64, CodecError> {
    check_binary(bits, MAX_BINARY_DIGITS)?;

    if !bits.starts_with('1') {
        return i64::from_str_radix(bits, 2).map_err(|_| CodecError::TooWide {
            digits: bits.len(),
            max: MAX_BINARY_DIGITS,
        });
    }

    let flipped: String = bits
        .chars()
        .map(|bit| if bit == '0' { '1' } else { '0' })
        .collect();
    let magnitude = i64::from_str_radix(&flipped, 2).map_err(|_| CodecError::TooWide {
        digits: bits.len(),
        max: MAX_BINARY_DIGITS,
    })?;

    Ok(-magnitude - 1)
}

/// Decodes a hex string, optionally as a two's-complement value of
/// `4 * hex.len()` bits.
///
/// Signed decoding round-trips through the binary form so that the sign
/// rule lives in exactly one place ([`signed_binary_to_decimal`]).
///
/// # Errors
///
/// Returns [`CodecError`] for empty input, non-hex characters, or more than
/// [`MAX_HEX_DIGITS`] digits.
pub fn hex_to_decimal(hex: &str, signed: bool) -> Result<i64, CodecError> {
    if hex.is_empty() {
        return Err(CodecError::Empty);
    }
    if let Some(bad) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(CodecError::InvalidHexDigit(bad));
    }
    if hex.len() > MAX_HEX_DIGITS {
        return Err(CodecError::TooWide {
            digits: hex.len(),
            max: MAX_HEX_DIGITS,
        });
    }

    let unsigned = i64::from_str_radix(hex, 16).map_err(|_| CodecError::TooWide {
        digits: hex.len(),
        max: MAX_HEX_DIGITS,
    })?;

    if signed {
        signed_binary_to_decimal(&to_binary(unsigned, 4 * hex.len()))
    } else {
        Ok(unsigned)
    }
}

/// Decodes up to eight hex digits as a signed 32-bit word.
///
/// Shorter strings are zero-extended to eight digits before the sign is
/// examined, so `"F"` is `15`, not `-1`.
///
/// # Errors
///
/// Returns [`CodecError`] for empty input, non-hex characters, or more than
/// eight digits.
pub fn hex_to_word(hex: &str) -> Result<i32, CodecError> {
    if hex.len() > WORD_HEX_DIGITS {
        return Err(CodecError::TooWide {
            digits: hex.len(),
            max: WORD_HEX_DIGITS,
        });
    }
    let padded = format!("{hex:0>WORD_HEX_DIGITS$}");
    let value = hex_to_decimal(&padded, true)?;
    i32::try_from(value).map_err(|_| CodecError::TooWide {
        digits: hex.len(),
        max: WORD_HEX_DIGITS,
    })
}

fn check_binary(bits: &str, max: usize) -> Result<(), CodecError> {
    if bits.is_empty() {
        return Err(CodecError::Empty);
    }
    if let Some(bad) = bits.chars().find(|c| *c != '0' && *c != '1') {
        return Err(CodecError::InvalidBinaryDigit(bad));
    }
    if bits.len() > max {
        return Err(CodecError::TooWide {
            digits: bits.len(),
            max,
        });
    }
    Ok(())
}
