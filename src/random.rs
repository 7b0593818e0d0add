//! Unbiased sampling over a cryptographically secure byte source.
//!
//! Every draw goes through [`RandomSource::fill`], so a failing CSPRNG
//! surfaces as [`GenError::RandomSourceUnavailable`] at the call that
//! needed the bytes. Ranges are reduced by rejection sampling, never by a
//! bare modulo.

use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::errors::{GenError, Result};

/// Sampling primitives backed by `R`, the operating system CSPRNG by default.
pub struct RandomSource<R = OsRng> {
    rng: R,
}

impl RandomSource<OsRng> {
    pub fn new() -> Self {
        Self { rng: OsRng }
    }
}

impl Default for RandomSource<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: TryRngCore> RandomSource<R> {
    /// Wraps an arbitrary generator. Tests use this with a seeded `StdRng`.
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }

    pub fn fill(&mut self, dest: &mut [u8]) -> Result<()> {
        self.rng
            .try_fill_bytes(dest)
            .map_err(|e| GenError::RandomSourceUnavailable(e.to_string()))
    }

    /// Returns a value uniformly distributed over `[min, max]`.
    ///
    /// Draws just enough big-endian bytes to cover the range size and
    /// rejects draws at or above the largest multiple of that size.
    pub fn randbetween(&mut self, min: i64, max: i64) -> Result<i64> {
        if min > max {
            return Err(GenError::invalid(format!(
                "randbetween: min ({min}) is greater than max ({max})"
            )));
        }

        let range = (i128::from(max) - i128::from(min) + 1) as u128;
        if range == 1 {
            return Ok(min);
        }

        let bits = u128::BITS - (range - 1).leading_zeros();
        let nbytes = bits.div_ceil(8) as usize;
        let space = 1u128 << (nbytes * 8);
        let limit = space - space % range;

        let mut buf = [0u8; 8];
        loop {
            let bytes = &mut buf[..nbytes];
            self.fill(bytes)?;
            let draw = bytes
                .iter()
                .fold(0u128, |acc, &b| (acc << 8) | u128::from(b));
            if draw < limit {
                return Ok((i128::from(min) + (draw % range) as i128) as i64);
            }
        }
    }

    pub fn randchoice<'a, T>(&mut self, seq: &'a [T]) -> Result<&'a T> {
        if seq.is_empty() {
            return Err(GenError::invalid("randchoice: sequence is empty"));
        }
        let idx = self.randbetween(0, (seq.len() - 1) as i64)? as usize;
        Ok(&seq[idx])
    }

    /// `2 * nbytes` lowercase hex characters from `nbytes` random bytes.
    pub fn randhex(&mut self, nbytes: usize) -> Result<String> {
        if nbytes == 0 {
            return Err(GenError::invalid("randhex: byte count must be greater than 0"));
        }
        let mut bytes = vec![0u8; nbytes];
        self.fill(&mut bytes)?;
        Ok(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// Picks `amount` distinct indices out of `0..len` (partial Fisher-Yates).
    pub fn sample_indices(&mut self, len: usize, amount: usize) -> Result<Vec<usize>> {
        if amount > len {
            return Err(GenError::invalid(format!(
                "cannot pick {amount} distinct positions out of {len}"
            )));
        }
        let mut pool: Vec<usize> = (0..len).collect();
        for i in 0..amount {
            let j = self.randbetween(i as i64, (len - 1) as i64)? as usize;
            pool.swap(i, j);
        }
        pool.truncate(amount);
        Ok(pool)
    }
}
