//! Entropy arithmetic.
//!
//! Pure conversions between bit-strength targets, wordlist/charset sizes and
//! the counts needed to reach a target.

use crate::errors::{GenError, Result};

fn require_target(entropy_bits: f64) -> Result<()> {
    if !entropy_bits.is_finite() || entropy_bits <= 0.0 {
        return Err(GenError::invalid(format!(
            "entropy target must be greater than 0, got {entropy_bits}"
        )));
    }
    Ok(())
}

fn require_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(GenError::invalid(format!(
            "{name} must be 0 or greater, got {value}"
        )));
    }
    Ok(())
}

/// `log2(len)`; undefined for an empty collection.
pub fn entropy_bits<T>(collection: &[T]) -> Result<f64> {
    if collection.is_empty() {
        return Err(GenError::invalid("cannot compute entropy of an empty collection"));
    }
    Ok((collection.len() as f64).log2())
}

/// Entropy of a number drawn uniformly from `[min, max]`. Bound order does not matter.
pub fn entropy_bits_nrange(min: f64, max: f64) -> Result<f64> {
    require_non_negative("range minimum", min)?;
    require_non_negative("range maximum", max)?;
    Ok(((max - min).abs() + 1.0).log2())
}

/// Characters needed from a charset of `charset_size` symbols to reach `entropy_bits`.
pub fn password_length_needed(entropy_bits: f64, charset_size: usize) -> Result<usize> {
    require_target(entropy_bits)?;
    if charset_size <= 1 {
        return Err(GenError::invalid(format!(
            "charset must hold at least 2 characters, got {charset_size}"
        )));
    }
    let length = (entropy_bits / (charset_size as f64).log2()).ceil() as usize;
    Ok(length.max(1))
}

/// Words needed to reach `entropy_bits` once `amount_n` numbers of
/// `entropy_n` bits each have been accounted for. Zero when the numbers
/// already cover the target.
pub fn words_amount_needed(
    entropy_bits: f64,
    entropy_w: f64,
    entropy_n: f64,
    amount_n: usize,
) -> Result<usize> {
    require_target(entropy_bits)?;
    require_non_negative("bits per number", entropy_n)?;
    if !entropy_w.is_finite() || entropy_w <= 0.0 {
        return Err(GenError::invalid(format!(
            "bits per word must be greater than 0, got {entropy_w}"
        )));
    }
    let remaining = (entropy_bits - entropy_n * amount_n as f64).max(0.0);
    Ok((remaining / entropy_w).ceil() as usize)
}

pub fn password_entropy(length: usize, charset_size: usize) -> Result<f64> {
    if charset_size == 0 {
        return Err(GenError::invalid("character set is empty"));
    }
    Ok(length as f64 * (charset_size as f64).log2())
}

pub fn passphrase_entropy(
    amount_w: usize,
    entropy_w: f64,
    entropy_n: f64,
    amount_n: usize,
) -> Result<f64> {
    require_non_negative("bits per word", entropy_w)?;
    require_non_negative("bits per number", entropy_n)?;
    Ok(amount_w as f64 * entropy_w + amount_n as f64 * entropy_n)
}
