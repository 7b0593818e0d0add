use rand::TryRngCore;

use crate::errors::{GenError, Result};
use crate::random::RandomSource;

pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &str = "0123456789";
pub const PUNCTUATION: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;

/// Random bytes behind a UUIDv4: 30 hex characters, the version and
/// variant nibbles are filled in separately.
const UUID4_RANDOM_BYTES: usize = 15;

/// Character classes enabled for password generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharClasses {
    pub lowercase: bool,
    pub uppercase: bool,
    pub digits: bool,
    pub punctuation: bool,
}

impl Default for CharClasses {
    fn default() -> Self {
        Self {
            lowercase: true,
            uppercase: true,
            digits: true,
            punctuation: true,
        }
    }
}

impl CharClasses {
    pub fn none() -> Self {
        Self {
            lowercase: false,
            uppercase: false,
            digits: false,
            punctuation: false,
        }
    }

    /// Enabled classes concatenated in lowercase, uppercase, digits, punctuation order.
    pub fn charset(&self) -> Vec<char> {
        let mut chars = String::new();
        if self.lowercase {
            chars.push_str(LOWERCASE);
        }
        if self.uppercase {
            chars.push_str(UPPERCASE);
        }
        if self.digits {
            chars.push_str(DIGITS);
        }
        if self.punctuation {
            chars.push_str(PUNCTUATION);
        }
        chars.chars().collect()
    }

    pub fn is_empty(&self) -> bool {
        !(self.lowercase || self.uppercase || self.digits || self.punctuation)
    }

    /// Human readable list of the enabled classes, for verbose output.
    pub fn describe(&self) -> String {
        let names = [
            (self.uppercase, "uppercase characters"),
            (self.lowercase, "lowercase characters"),
            (self.digits, "digits"),
            (self.punctuation, "punctuation characters"),
        ];
        names
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, name)| *name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub fn generate_password<R: TryRngCore>(
    rng: &mut RandomSource<R>,
    charset: &[char],
    length: usize,
) -> Result<Vec<char>> {
    if charset.is_empty() {
        return Err(GenError::invalid("can't generate password: character set is empty"));
    }
    (0..length).map(|_| rng.randchoice(charset).copied()).collect()
}

/// The five groups of a version 4 UUID, in canonical 8-4-4-4-12 order.
pub fn generate_uuid4<R: TryRngCore>(rng: &mut RandomSource<R>) -> Result<Vec<String>> {
    let hex = rng.randhex(UUID4_RANDOM_BYTES)?;
    let variant = rng.randbetween(8, 11)?;

    Ok(vec![
        hex[..8].to_string(),
        hex[8..12].to_string(),
        format!("4{}", &hex[12..15]),
        format!("{variant:x}{}", &hex[15..18]),
        hex[18..].to_string(),
    ])
}
