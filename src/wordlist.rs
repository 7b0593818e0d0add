//! Wordlists for passphrase generation.
//!
//! The EFF large wordlist (7776 words) ships inside the binary. External
//! lists are read either as one word per line or in diceware format
//! (`<roll> <word>` per line).

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use tracing::debug;

use crate::calc;
use crate::errors::{GenError, Result};

static EFF_LARGE: &str = include_str!("../res/eff_large_wordlist.txt");

/// log2(7776), precomputed for the embedded list.
pub const EFF_LARGE_ENTROPY_BITS: f64 = 12.925;

static EFF_LARGE_WORDS: LazyLock<Vec<String>> = LazyLock::new(|| parse_plain(EFF_LARGE));

#[derive(Debug, Clone, PartialEq)]
pub struct Wordlist {
    words: Vec<String>,
    entropy_bits: Option<f64>,
}

impl Wordlist {
    /// An externally supplied list; its entropy is computed on demand.
    pub fn new(words: Vec<String>) -> Self {
        Self {
            words,
            entropy_bits: None,
        }
    }

    /// A list whose bits-per-word value is already known.
    pub fn with_entropy_bits(words: Vec<String>, entropy_bits: f64) -> Self {
        Self {
            words,
            entropy_bits: Some(entropy_bits),
        }
    }

    pub fn internal() -> Self {
        Self::with_entropy_bits(EFF_LARGE_WORDS.clone(), EFF_LARGE_ENTROPY_BITS)
    }

    pub fn load<P: AsRef<Path>>(path: P, is_diceware: bool) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| GenError::Wordlist {
            path: path.to_path_buf(),
            source,
        })?;
        let words = if is_diceware {
            parse_diceware(&content)
        } else {
            parse_plain(&content)
        };
        debug!(path = %path.display(), words = words.len(), is_diceware, "loaded wordlist");
        Ok(Self::new(words))
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn is_external(&self) -> bool {
        self.entropy_bits.is_none()
    }

    /// Bits contributed by one uniformly drawn word.
    pub fn entropy_bits(&self) -> Result<f64> {
        match self.entropy_bits {
            Some(bits) => Ok(bits),
            None => calc::entropy_bits(&self.words),
        }
    }
}

pub fn parse_plain(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Keeps the second column of each line; lines without one are skipped.
pub fn parse_diceware(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(String::from)
        .collect()
}
