use std::fs;
use std::io;
use std::path::Path;

use crate::passphrase::Token;

/// Joins tokens with `separator`, no trailing separator.
pub fn join_tokens(tokens: &[Token], separator: &str) -> String {
    tokens
        .iter()
        .map(Token::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Writes `text` to `path`, creating missing parent directories and
/// overwriting an existing file.
pub fn write_to_file(path: &Path, text: &str, newline: bool) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let linefeed = if newline { "\n" } else { "" };
    fs::write(path, format!("{text}{linefeed}"))
}
