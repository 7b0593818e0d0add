//! Cryptographically secure passphrase, password and UUIDv4 generation.
//!
//! Results are sized against an entropy target: the crate works out how many
//! words or characters are needed to reach a requested bit-strength, draws
//! them from the operating system CSPRNG without modulo bias, and can force
//! an exact number of letters to uppercase.
//!
//! # Examples
//!
//! A passphrase from the embedded EFF large wordlist, long enough for 77 bits:
//!
//! ```
//! use passphrase::{Passphrase, Token, Wordlist};
//!
//! let mut pp = Passphrase::builder()
//!     .wordlist(Wordlist::internal())
//!     .entropy_bits_req(77.0)
//!     .amount_n(0)
//!     .build()
//!     .unwrap();
//!
//! let words = pp.words_amount_needed().unwrap();
//! assert_eq!(words, 6);
//! pp.set_amount_w(words);
//!
//! let tokens = pp.generate(2).unwrap();
//! assert_eq!(tokens.len(), 6);
//! assert!(matches!(tokens[0], Token::Text(_)));
//! ```
//!
//! A password over the full printable charset:
//!
//! ```
//! use passphrase::Passphrase;
//!
//! let mut pp = Passphrase::builder().entropy_bits_req(128.0).build().unwrap();
//! let length = pp.password_length_needed().unwrap();
//! pp.set_passwordlen(length);
//! assert_eq!(pp.generate_password().unwrap().len(), 20);
//! ```

pub mod calc;
pub mod case;
pub mod config;
pub mod errors;
pub mod generators;
pub mod output;
pub mod passphrase;
pub mod random;
pub mod settings;
pub mod system;
pub mod wordlist;

pub use case::{CaseNode, make_chars_uppercase};
pub use errors::{GenError, Result};
pub use generators::CharClasses;
pub use passphrase::{Passphrase, PassphraseBuilder, Token};
pub use random::RandomSource;
pub use wordlist::Wordlist;
