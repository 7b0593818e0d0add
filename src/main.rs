use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::EnvFilter;

use passphrase::config::Defaults;
use passphrase::output::{join_tokens, write_to_file};
use passphrase::settings::{
    ENTROPY_BITS_MIN, MAX_NUM, MIN_NUM, SYSTEM_ENTROPY_BITS_MIN, UUID4_ENTROPY_BITS,
};
use passphrase::system::system_entropy;
use passphrase::{CharClasses, Passphrase, Wordlist};

/// Generates a cryptographically secure passphrase, based on a wordlist, or a
/// password, and prints it to standard output.
///
/// By default it uses the embedded EFF large wordlist and picks as many words
/// as needed to reach the entropy target.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Force generation even if the system's entropy is too low
    #[arg(long)]
    insecure: bool,

    /// Don't print a newline after the result
    #[arg(long)]
    no_newline: bool,

    /// Don't print the result (useful with --output)
    #[arg(short, long)]
    mute: bool,

    /// Print additional information to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Entropy bits used for length calculations [default: 77]
    #[arg(short, long = "entropybits", value_parser = positive_bits)]
    entropybits: Option<f64>,

    /// Generate a UUID v4 string
    #[arg(long)]
    uuid4: bool,

    /// Generate a password of the given length (0 or no value: as long as the entropy target needs)
    #[arg(short, long, num_args = 0..=1, default_missing_value = "0", value_name = "LENGTH")]
    password: Option<usize>,

    /// Use uppercase characters for passwords, or the amount of uppercase
    /// characters in a passphrase (no value: all)
    #[arg(long, num_args = 0..=1, default_missing_value = "0", value_name = "AMOUNT")]
    use_uppercase: Option<usize>,

    /// Use lowercase characters for passwords, or the amount of lowercase
    /// characters in a passphrase (no value: all)
    #[arg(long, num_args = 0..=1, default_missing_value = "0", value_name = "AMOUNT")]
    use_lowercase: Option<usize>,

    /// Use digits for passwords
    #[arg(long)]
    use_digits: bool,

    /// Use lowercase, uppercase and digits for passwords
    #[arg(long)]
    use_alphanumeric: bool,

    /// Use punctuation characters for passwords
    #[arg(long)]
    use_punctuation: bool,

    /// Amount of words
    #[arg(short, long)]
    words: Option<usize>,

    /// Amount of numbers [default: 0]
    #[arg(short, long)]
    numbers: Option<usize>,

    /// Separator between words and numbers [default: space]
    #[arg(short, long, allow_hyphen_values = true)]
    separator: Option<String>,

    /// Write the result to this file (overwritten if it exists)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Wordlist file, one word per line
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Treat the input file as a diceware list (two columns)
    #[arg(short, long)]
    diceware: bool,

    /// JSON file with default settings
    #[arg(long)]
    config: Option<PathBuf>,
}

fn positive_bits(s: &str) -> Result<f64, String> {
    let bits: f64 = s.parse().map_err(|e| format!("{s}: {e}"))?;
    if !bits.is_finite() || bits <= 0.0 {
        return Err(format!("{bits} should be bigger than 0"));
    }
    Ok(bits)
}

/// Maps the case flags onto a case bias: uppercase amounts are positive,
/// lowercase amounts negative, a flag without amount means every letter.
fn case_bias(uppercase: Option<usize>, lowercase: Option<usize>) -> i64 {
    let amount = |n: usize| i64::try_from(n).unwrap_or(i64::MAX);
    match (uppercase, lowercase) {
        (_, Some(0)) => i64::MIN,
        (_, Some(n)) => -amount(n),
        (Some(0), None) => i64::MAX,
        (Some(n), None) => amount(n),
        (None, None) => 0,
    }
}

/// The entropy target only matters when it drives a length: not for UUIDs,
/// and not for a passphrase whose word and number counts are both given.
fn warns_low_entropy_target(args: &Args, entropy_bits: f64) -> bool {
    let explicit_passphrase = args.password.is_none()
        && matches!(args.words, Some(n) if n > 0)
        && matches!(args.numbers, Some(n) if n > 0);
    !args.uuid4 && !explicit_passphrase && entropy_bits < ENTROPY_BITS_MIN
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn check_system_entropy(insecure: bool) -> Result<()> {
    let Some(bits) = system_entropy() else {
        debug!("system entropy probe unavailable, skipping check");
        return Ok(());
    };
    if bits < SYSTEM_ENTROPY_BITS_MIN {
        warn!("the system has too little entropy: {bits} bits; randomness quality could be poor");
        if !insecure {
            bail!("system entropy too low: {bits} < {SYSTEM_ENTROPY_BITS_MIN}");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let defaults = match &args.config {
        Some(path) => Defaults::load(path)?,
        None => Defaults::load_user()?,
    };
    info!("passphrase v{}", env!("CARGO_PKG_VERSION"));

    check_system_entropy(args.insecure)?;

    let entropy_bits = args
        .entropybits
        .or(defaults.entropy_bits)
        .unwrap_or(ENTROPY_BITS_MIN);
    info!(
        "Using {entropy_bits} bits of entropy for calculations (if any). The minimum recommended is {ENTROPY_BITS_MIN}"
    );

    if warns_low_entropy_target(&args, entropy_bits) {
        warn!("insecure number of bits for entropy calculations chosen! Should be bigger than {ENTROPY_BITS_MIN}");
    }

    let mut pp = Passphrase::builder()
        .entropy_bits_req(entropy_bits)
        .amount_n(args.numbers.or(defaults.numbers).unwrap_or(0))
        .randnum_range(
            defaults.randnum_min.unwrap_or(MIN_NUM),
            defaults.randnum_max.unwrap_or(MAX_NUM),
        )
        .build()
        .context("invalid settings")?;

    let (what, entropy) = if args.uuid4 {
        info!("Generating UUID v4");
        pp.generate_uuid4()?;
        pp.set_separator("-");
        ("UUID v4", UUID4_ENTROPY_BITS)
    } else if let Some(length) = args.password {
        let any_class = args.use_uppercase.is_some()
            || args.use_lowercase.is_some()
            || args.use_digits
            || args.use_punctuation
            || args.use_alphanumeric;
        if any_class {
            pp.set_char_classes(CharClasses {
                lowercase: args.use_lowercase.is_some() || args.use_alphanumeric,
                uppercase: args.use_uppercase.is_some() || args.use_alphanumeric,
                digits: args.use_digits || args.use_alphanumeric,
                punctuation: args.use_punctuation,
            });
        }

        let min_len = pp.password_length_needed()?;
        let length = if length == 0 {
            min_len
        } else {
            if length < min_len {
                warn!("insecure password length chosen! Should be bigger than or equal to {min_len}");
            }
            length
        };
        pp.set_passwordlen(length);
        let entropy = pp.generated_password_entropy()?;

        info!(
            "Generating password of {length} characters long using {}",
            pp.char_classes().describe()
        );
        pp.generate_password()?;
        pp.set_separator("");
        ("password", entropy)
    } else {
        let (source, diceware) = match (&args.input, &defaults.wordlist) {
            (Some(path), _) => (Some(path), args.diceware),
            (None, Some(path)) => (Some(path), args.diceware || defaults.diceware),
            (None, None) => (None, false),
        };
        let wordlist = match source {
            Some(path) => Wordlist::load(path, diceware)
                .with_context(|| format!("can't read wordlist {}", path.display()))?,
            None => Wordlist::internal(),
        };
        pp.set_wordlist(wordlist);

        let needed = pp.words_amount_needed()?;
        let amount_w = match args.words {
            None => needed,
            Some(words) => {
                if words < needed {
                    warn!("insecure amount of words chosen! Should be bigger than or equal to {needed}");
                }
                words
            }
        };
        pp.set_amount_w(amount_w);
        let entropy = pp.generated_passphrase_entropy()?;

        info!(
            "Generating a passphrase of {amount_w} words and {} numbers using {}",
            pp.amount_n().unwrap_or(0),
            match source {
                Some(path) if diceware => format!("external wordlist: {} (diceware-like)", path.display()),
                Some(path) => format!("external wordlist: {}", path.display()),
                None => "internal wordlist".to_string(),
            }
        );
        pp.generate(case_bias(args.use_uppercase, args.use_lowercase))?;
        pp.set_separator(
            args.separator
                .clone()
                .or(defaults.separator.clone())
                .unwrap_or_else(|| " ".to_string()),
        );
        ("passphrase", entropy)
    };

    info!("The entropy of this {what} is {entropy:.2} bits");
    if entropy < ENTROPY_BITS_MIN {
        warn!("the {what} is too short!");
    }

    let text = join_tokens(pp.last_result(), pp.separator());
    if !args.mute {
        if args.no_newline {
            print!("{text}");
        } else {
            println!("{text}");
        }
    }

    if let Some(path) = &args.output {
        write_to_file(path, &text, !args.no_newline)
            .with_context(|| format!("can't write {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_flags_map_to_bias() {
        assert_eq!(case_bias(None, None), 0);
        assert_eq!(case_bias(Some(3), None), 3);
        assert_eq!(case_bias(Some(0), None), i64::MAX);
        assert_eq!(case_bias(None, Some(2)), -2);
        assert_eq!(case_bias(None, Some(0)), i64::MIN);
        assert_eq!(case_bias(Some(4), Some(1)), -1);
    }

    #[test]
    fn optional_values_fall_back_to_zero() {
        let args = Args::try_parse_from(["passphrase", "-p", "--use-digits"]).unwrap();
        assert_eq!(args.password, Some(0));
        assert!(args.use_digits);

        let args = Args::try_parse_from(["passphrase", "--use-uppercase", "-w", "4"]).unwrap();
        assert_eq!(args.use_uppercase, Some(0));
        assert_eq!(args.words, Some(4));

        let args = Args::try_parse_from(["passphrase", "--use-lowercase", "5"]).unwrap();
        assert_eq!(args.use_lowercase, Some(5));
    }

    #[test]
    fn entropy_bits_must_be_positive() {
        assert!(Args::try_parse_from(["passphrase", "-e", "-3"]).is_err());
        assert!(Args::try_parse_from(["passphrase", "-e", "abc"]).is_err());
        let args = Args::try_parse_from(["passphrase", "--entropybits", "96"]).unwrap();
        assert_eq!(args.entropybits, Some(96.0));
    }

    #[test]
    fn low_entropy_target_warning() {
        let warns = |argv: &[&str]| {
            let args = Args::try_parse_from(argv.iter().copied()).unwrap();
            let bits = args.entropybits.unwrap_or(ENTROPY_BITS_MIN);
            warns_low_entropy_target(&args, bits)
        };
        assert!(warns(&["passphrase", "-e", "10"]));
        assert!(warns(&["passphrase", "-w", "5", "-n", "0", "-e", "10"]));
        assert!(warns(&["passphrase", "-w", "0", "-n", "2", "-e", "10"]));
        assert!(warns(&["passphrase", "-p", "-w", "5", "-n", "2", "-e", "10"]));
        assert!(!warns(&["passphrase", "-w", "5", "-n", "2", "-e", "10"]));
        assert!(!warns(&["passphrase", "--uuid4", "-e", "10"]));
        assert!(!warns(&["passphrase", "-w", "5", "-n", "0"]));
    }

    #[test]
    fn separator_accepts_a_dash() {
        let args = Args::try_parse_from(["passphrase", "-s", "-"]).unwrap();
        assert_eq!(args.separator.as_deref(), Some("-"));
    }
}
