//! Optional JSON file holding defaults for the command line.
//!
//! ```json
//! { "entropy_bits": 96, "separator": "-", "numbers": 1 }
//! ```
//!
//! Every key is optional. Flags given on the command line win over the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{GenError, Result};

const CONFIG_DIR: &str = "passphrase";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    pub entropy_bits: Option<f64>,
    pub separator: Option<String>,
    pub numbers: Option<usize>,
    pub randnum_min: Option<i64>,
    pub randnum_max: Option<i64>,
    pub wordlist: Option<PathBuf>,
    #[serde(default)]
    pub diceware: bool,
}

impl Defaults {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| GenError::Config(format!("{}: {}", path.display(), e)))?;
        let defaults: Defaults = serde_json::from_str(&content)
            .map_err(|e| GenError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "loaded defaults");
        Ok(defaults)
    }

    /// Loads the file at the per-user location, or empty defaults when there is none.
    pub fn load_user() -> Result<Self> {
        match default_path() {
            Some(path) if path.is_file() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }
}

/// `<config dir>/passphrase/config.json`, e.g. `~/.config/passphrase/config.json` on Linux.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}
