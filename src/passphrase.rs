use std::fmt;

use rand::TryRngCore;
use rand::rngs::OsRng;
use tracing::debug;

use crate::calc;
use crate::case::{CaseNode, make_chars_uppercase};
use crate::errors::{GenError, Result};
use crate::generators::{self, CharClasses};
use crate::random::RandomSource;
use crate::settings::{DEFAULT_SEPARATOR, MAX_NUM, MIN_NUM};
use crate::wordlist::Wordlist;

/// One element of a generated result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    Number(i64),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Text(s) => f.write_str(s),
            Token::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Generation settings plus the last produced result.
///
/// Built through [`PassphraseBuilder`], which rejects inconsistent settings
/// up front. Fields an operation depends on but that were left unset make
/// that operation fail with [`GenError::InvalidConfiguration`].
pub struct Passphrase<R = OsRng> {
    rng: RandomSource<R>,
    wordlist: Option<Wordlist>,
    amount_w: Option<usize>,
    amount_n: Option<usize>,
    randnum_min: i64,
    randnum_max: i64,
    passwordlen: Option<usize>,
    char_classes: CharClasses,
    entropy_bits_req: Option<f64>,
    separator: String,
    last_result: Vec<Token>,
}

pub struct PassphraseBuilder<R = OsRng> {
    rng: RandomSource<R>,
    wordlist: Option<Wordlist>,
    amount_w: Option<usize>,
    amount_n: Option<usize>,
    randnum_min: i64,
    randnum_max: i64,
    passwordlen: Option<usize>,
    char_classes: CharClasses,
    entropy_bits_req: Option<f64>,
    separator: String,
}

impl Passphrase<OsRng> {
    pub fn builder() -> PassphraseBuilder<OsRng> {
        PassphraseBuilder {
            rng: RandomSource::new(),
            wordlist: None,
            amount_w: None,
            amount_n: None,
            randnum_min: MIN_NUM,
            randnum_max: MAX_NUM,
            passwordlen: None,
            char_classes: CharClasses::default(),
            entropy_bits_req: None,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl<R: TryRngCore> PassphraseBuilder<R> {
    /// Swaps the randomness source, e.g. for a seeded generator in tests.
    pub fn rng<S: TryRngCore>(self, rng: S) -> PassphraseBuilder<S> {
        PassphraseBuilder {
            rng: RandomSource::from_rng(rng),
            wordlist: self.wordlist,
            amount_w: self.amount_w,
            amount_n: self.amount_n,
            randnum_min: self.randnum_min,
            randnum_max: self.randnum_max,
            passwordlen: self.passwordlen,
            char_classes: self.char_classes,
            entropy_bits_req: self.entropy_bits_req,
            separator: self.separator,
        }
    }

    pub fn wordlist(mut self, wordlist: Wordlist) -> Self {
        self.wordlist = Some(wordlist);
        self
    }

    pub fn amount_w(mut self, amount: usize) -> Self {
        self.amount_w = Some(amount);
        self
    }

    pub fn amount_n(mut self, amount: usize) -> Self {
        self.amount_n = Some(amount);
        self
    }

    pub fn randnum_range(mut self, min: i64, max: i64) -> Self {
        self.randnum_min = min;
        self.randnum_max = max;
        self
    }

    pub fn passwordlen(mut self, length: usize) -> Self {
        self.passwordlen = Some(length);
        self
    }

    pub fn char_classes(mut self, classes: CharClasses) -> Self {
        self.char_classes = classes;
        self
    }

    pub fn entropy_bits_req(mut self, bits: f64) -> Self {
        self.entropy_bits_req = Some(bits);
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn build(self) -> Result<Passphrase<R>> {
        if self.randnum_min < 0 {
            return Err(GenError::invalid(format!(
                "randnum_min should be 0 or greater, got {}",
                self.randnum_min
            )));
        }
        if self.randnum_min > self.randnum_max {
            return Err(GenError::invalid(format!(
                "randnum_min ({}) is greater than randnum_max ({})",
                self.randnum_min, self.randnum_max
            )));
        }
        if let Some(bits) = self.entropy_bits_req {
            validate_entropy_bits(bits)?;
        }

        Ok(Passphrase {
            rng: self.rng,
            wordlist: self.wordlist,
            amount_w: self.amount_w,
            amount_n: self.amount_n,
            randnum_min: self.randnum_min,
            randnum_max: self.randnum_max,
            passwordlen: self.passwordlen,
            char_classes: self.char_classes,
            entropy_bits_req: self.entropy_bits_req,
            separator: self.separator,
            last_result: Vec::new(),
        })
    }
}

fn validate_entropy_bits(bits: f64) -> Result<()> {
    if !bits.is_finite() || bits <= 0.0 {
        return Err(GenError::invalid(format!(
            "entropy_bits_req should be greater than 0, got {bits}"
        )));
    }
    Ok(())
}

/// Applies a case bias to freshly drawn words, keeping word boundaries.
///
/// A positive bias is the number of letters to uppercase; a negative one is
/// the number of lowercase letters to keep, the rest being uppercased.
/// Letters that are already uppercase are never lowered.
fn apply_case_bias<R: TryRngCore>(
    words: Vec<String>,
    case_bias: i64,
    rng: &mut RandomSource<R>,
) -> Result<Vec<String>> {
    let node = CaseNode::Ordered(words.into_iter().map(CaseNode::Text).collect());
    let lowercase = node.count_upcasable();
    let uppercase = if case_bias > 0 {
        case_bias
    } else {
        let keep = usize::try_from(case_bias.unsigned_abs()).unwrap_or(usize::MAX);
        i64::try_from(lowercase.saturating_sub(keep)).unwrap_or(i64::MAX)
    };
    debug!(case_bias, lowercase, uppercase, "redistributing letter case");

    match make_chars_uppercase(&node, uppercase, rng)? {
        CaseNode::Ordered(items) => items
            .into_iter()
            .map(|item| match item {
                CaseNode::Text(word) => Ok(word),
                other => Err(GenError::unsupported(format!("expected a word, got {other:?}"))),
            })
            .collect(),
        other => Err(GenError::unsupported(format!("expected a word sequence, got {other:?}"))),
    }
}

impl<R: TryRngCore> Passphrase<R> {
    pub fn wordlist(&self) -> Option<&Wordlist> {
        self.wordlist.as_ref()
    }

    pub fn set_wordlist(&mut self, wordlist: Wordlist) {
        self.wordlist = Some(wordlist);
    }

    pub fn amount_w(&self) -> Option<usize> {
        self.amount_w
    }

    pub fn set_amount_w(&mut self, amount: usize) {
        self.amount_w = Some(amount);
    }

    pub fn amount_n(&self) -> Option<usize> {
        self.amount_n
    }

    pub fn set_amount_n(&mut self, amount: usize) {
        self.amount_n = Some(amount);
    }

    pub fn randnum_range(&self) -> (i64, i64) {
        (self.randnum_min, self.randnum_max)
    }

    pub fn passwordlen(&self) -> Option<usize> {
        self.passwordlen
    }

    pub fn set_passwordlen(&mut self, length: usize) {
        self.passwordlen = Some(length);
    }

    pub fn char_classes(&self) -> CharClasses {
        self.char_classes
    }

    pub fn set_char_classes(&mut self, classes: CharClasses) {
        self.char_classes = classes;
    }

    pub fn entropy_bits_req(&self) -> Option<f64> {
        self.entropy_bits_req
    }

    pub fn set_entropy_bits_req(&mut self, bits: f64) -> Result<()> {
        validate_entropy_bits(bits)?;
        self.entropy_bits_req = Some(bits);
        Ok(())
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn set_separator(&mut self, separator: impl Into<String>) {
        self.separator = separator.into();
    }

    pub fn last_result(&self) -> &[Token] {
        &self.last_result
    }

    fn populated_wordlist(&self) -> Result<&Wordlist> {
        self.wordlist
            .as_ref()
            .filter(|list| !list.is_empty())
            .ok_or_else(|| GenError::invalid("wordlist is empty or not set"))
    }

    fn entropy_per_number(&self) -> Result<f64> {
        calc::entropy_bits_nrange(self.randnum_min as f64, self.randnum_max as f64)
    }

    /// Draws `amount_w` words followed by `amount_n` numbers.
    ///
    /// A positive `case_bias` is the number of letters to uppercase across
    /// the words; a negative one is the number of letters to leave
    /// lowercase, the rest being uppercased. Zero keeps the wordlist casing.
    pub fn generate(&mut self, case_bias: i64) -> Result<&[Token]> {
        let (Some(amount_w), Some(amount_n)) = (self.amount_w, self.amount_n) else {
            return Err(GenError::invalid(
                "can't generate passphrase: amount_w or amount_n isn't set",
            ));
        };
        let wordlist = self
            .wordlist
            .as_ref()
            .filter(|list| !list.is_empty())
            .ok_or_else(|| GenError::invalid("can't generate passphrase: wordlist is empty"))?;

        let mut words = (0..amount_w)
            .map(|_| self.rng.randchoice(wordlist.words()).cloned())
            .collect::<Result<Vec<String>>>()?;

        if case_bias != 0 {
            words = apply_case_bias(words, case_bias, &mut self.rng)?;
        }

        let mut result: Vec<Token> = words.into_iter().map(Token::Text).collect();
        for _ in 0..amount_n {
            let n = self.rng.randbetween(self.randnum_min, self.randnum_max)?;
            result.push(Token::Number(n));
        }

        debug!(amount_w, amount_n, "generated passphrase");
        self.last_result = result;
        Ok(&self.last_result)
    }

    /// Draws `passwordlen` characters from the enabled character classes.
    pub fn generate_password(&mut self) -> Result<&[Token]> {
        let Some(length) = self.passwordlen else {
            return Err(GenError::invalid("can't generate password: passwordlen isn't set"));
        };
        let charset = self.char_classes.charset();
        let chars = generators::generate_password(&mut self.rng, &charset, length)?;

        debug!(length, charset = charset.len(), "generated password");
        self.last_result = chars.into_iter().map(|c| Token::Text(c.to_string())).collect();
        Ok(&self.last_result)
    }

    pub fn generate_uuid4(&mut self) -> Result<&[Token]> {
        let groups = generators::generate_uuid4(&mut self.rng)?;
        self.last_result = groups.into_iter().map(Token::Text).collect();
        Ok(&self.last_result)
    }

    pub fn generated_password_entropy(&self) -> Result<f64> {
        let length = self
            .passwordlen
            .ok_or_else(|| GenError::invalid("passwordlen isn't set"))?;
        calc::password_entropy(length, self.char_classes.charset().len())
    }

    pub fn generated_passphrase_entropy(&self) -> Result<f64> {
        let (Some(amount_w), Some(amount_n)) = (self.amount_w, self.amount_n) else {
            return Err(GenError::invalid("amount_w or amount_n isn't set"));
        };
        let entropy_w = self.populated_wordlist()?.entropy_bits()?;
        calc::passphrase_entropy(amount_w, entropy_w, self.entropy_per_number()?, amount_n)
    }

    pub fn words_amount_needed(&self) -> Result<usize> {
        let (Some(bits), Some(amount_n)) = (self.entropy_bits_req, self.amount_n) else {
            return Err(GenError::invalid(
                "can't calculate the words amount needed: entropy_bits_req or amount_n isn't set",
            ));
        };
        let entropy_w = self.populated_wordlist()?.entropy_bits()?;
        calc::words_amount_needed(bits, entropy_w, self.entropy_per_number()?, amount_n)
    }

    pub fn password_length_needed(&self) -> Result<usize> {
        let Some(bits) = self.entropy_bits_req else {
            return Err(GenError::invalid(
                "can't calculate the password length needed: entropy_bits_req isn't set",
            ));
        };
        if self.char_classes.is_empty() {
            return Err(GenError::invalid(
                "can't calculate the password length needed: the character set is empty",
            ));
        }
        calc::password_length_needed(bits, self.char_classes.charset().len())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    const WORDS: [&str; 6] = ["vivacious", "frigidly", "condiment", "passive", "reverse", "brunt"];

    fn small_list() -> Wordlist {
        Wordlist::new(WORDS.iter().map(|w| w.to_string()).collect())
    }

    fn seeded(seed: u64) -> PassphraseBuilder<StdRng> {
        Passphrase::builder().rng(StdRng::seed_from_u64(seed))
    }

    fn letters(tokens: &[Token], pred: fn(&char) -> bool) -> usize {
        tokens
            .iter()
            .map(|t| match t {
                Token::Text(s) => s.chars().filter(pred).count(),
                Token::Number(_) => 0,
            })
            .sum()
    }

    fn alphabetic(tokens: &[Token]) -> usize {
        letters(tokens, |c| c.is_alphabetic())
    }

    #[test]
    fn generate_returns_words_then_numbers() {
        let internal = Wordlist::internal();
        for seed in 0..50 {
            let amount_w = (seed % 11) as usize;
            let amount_n = (seed % 7) as usize;
            let mut pp = seeded(seed)
                .wordlist(internal.clone())
                .amount_w(amount_w)
                .amount_n(amount_n)
                .build()
                .unwrap();
            let result = pp.generate(0).unwrap().to_vec();
            assert_eq!(result.len(), amount_w + amount_n);
            for token in &result[..amount_w] {
                let Token::Text(word) = token else {
                    panic!("expected a word, got {token:?}");
                };
                assert!(internal.words().contains(word));
            }
            for token in &result[amount_w..] {
                assert!(matches!(token, Token::Number(n) if (MIN_NUM..=MAX_NUM).contains(n)));
            }
        }
    }

    #[test]
    fn generate_with_empty_counts_is_empty() {
        let mut pp = seeded(1)
            .wordlist(Wordlist::internal())
            .amount_w(0)
            .amount_n(0)
            .build()
            .unwrap();
        assert!(pp.generate(0).unwrap().is_empty());
    }

    #[test]
    fn generate_requires_counts_and_wordlist() {
        let mut pp = seeded(1).build().unwrap();
        assert!(matches!(pp.generate(0), Err(GenError::InvalidConfiguration(_))));
        pp.set_amount_n(0);
        assert!(pp.generate(0).is_err());
        pp.set_amount_w(0);
        assert!(pp.generate(0).is_err());
        pp.set_wordlist(Wordlist::new(vec![]));
        assert!(pp.generate(0).is_err());
        pp.set_wordlist(small_list());
        assert!(pp.generate(0).is_ok());
    }

    #[test]
    fn positive_case_bias_uppercases_exact_count() {
        for seed in 0..100 {
            let bias = (seed % 5 + 1) as i64;
            let mut pp = seeded(seed)
                .wordlist(Wordlist::internal())
                .amount_w((seed % 4) as usize + 1)
                .amount_n(1)
                .build()
                .unwrap();
            let result = pp.generate(bias).unwrap();
            let total = alphabetic(result);
            let upper = letters(result, |c| c.is_uppercase());
            assert_eq!(upper, (bias as usize).min(total));
        }
    }

    #[test]
    fn negative_case_bias_keeps_exact_lowercase() {
        for seed in 0..100 {
            let bias = -((seed % 5 + 1) as i64);
            let mut pp = seeded(seed)
                .wordlist(Wordlist::internal())
                .amount_w((seed % 4) as usize + 1)
                .amount_n(0)
                .build()
                .unwrap();
            let result = pp.generate(bias).unwrap();
            let total = alphabetic(result);
            let lower = letters(result, |c| c.is_lowercase());
            assert_eq!(lower, (bias.unsigned_abs() as usize).min(total));
        }
    }

    #[test]
    fn case_bias_with_mixed_case_wordlist() {
        let list = Wordlist::new(vec!["ABCdef".to_string()]);
        for seed in 0..20 {
            let mut pp = seeded(seed)
                .wordlist(list.clone())
                .amount_w(1)
                .amount_n(0)
                .build()
                .unwrap();

            let kept = pp.generate(-3).unwrap();
            assert_eq!(kept, [Token::Text("ABCdef".to_string())]);

            let one = pp.generate(-1).unwrap();
            assert_eq!(letters(one, |c| c.is_lowercase()), 1);
            assert_eq!(letters(one, |c| c.is_uppercase()), 5);

            let raised = pp.generate(2).unwrap();
            assert_eq!(letters(raised, |c| c.is_uppercase()), 5);
            assert!(matches!(&raised[0], Token::Text(w) if w.starts_with("ABC")));

            let all = pp.generate(i64::MAX).unwrap();
            assert_eq!(all, [Token::Text("ABCDEF".to_string())]);
            let untouched = pp.generate(i64::MIN).unwrap();
            assert_eq!(untouched, [Token::Text("ABCdef".to_string())]);
        }
    }

    #[test]
    fn case_bias_skips_letters_without_single_uppercase() {
        let list = Wordlist::new(vec!["straße".to_string()]);
        let mut pp = seeded(7)
            .wordlist(list)
            .amount_w(1)
            .amount_n(0)
            .build()
            .unwrap();
        let result = pp.generate(-2).unwrap();
        assert_eq!(letters(result, |c| c.is_uppercase()), 3);
        assert!(matches!(&result[0], Token::Text(w) if w.chars().count() == 6 && w.contains('ß')));
    }

    #[test]
    fn extreme_case_bias_saturates() {
        let mut pp = seeded(3)
            .wordlist(small_list())
            .amount_w(4)
            .amount_n(0)
            .build()
            .unwrap();
        let upper = pp.generate(i64::MAX).unwrap();
        assert_eq!(letters(upper, |c| c.is_lowercase()), 0);
        let lower = pp.generate(i64::MIN).unwrap();
        assert_eq!(letters(lower, |c| c.is_uppercase()), 0);
    }

    #[test]
    fn generate_replaces_last_result() {
        let mut pp = seeded(5)
            .wordlist(small_list())
            .amount_w(3)
            .amount_n(2)
            .passwordlen(4)
            .build()
            .unwrap();
        assert!(pp.last_result().is_empty());
        pp.generate(0).unwrap();
        assert_eq!(pp.last_result().len(), 5);
        pp.generate_password().unwrap();
        assert_eq!(pp.last_result().len(), 4);
        pp.generate_uuid4().unwrap();
        assert_eq!(pp.last_result().len(), 5);
    }

    #[test]
    fn generate_password_length_and_charset() {
        for length in 0..=10 {
            let mut pp = seeded(length as u64).passwordlen(length).build().unwrap();
            let result = pp.generate_password().unwrap();
            assert_eq!(result.len(), length);
            assert!(result.iter().all(|t| matches!(t, Token::Text(s) if s.chars().count() == 1)));
        }

        let mut digits_only = seeded(9)
            .passwordlen(16)
            .char_classes(CharClasses {
                digits: true,
                ..CharClasses::none()
            })
            .build()
            .unwrap();
        let result = digits_only.generate_password().unwrap();
        assert!(result.iter().all(|t| t.to_string().chars().all(|c| c.is_ascii_digit())));
    }

    #[test]
    fn generate_password_requires_length_and_charset() {
        let mut pp = seeded(1).build().unwrap();
        assert!(matches!(pp.generate_password(), Err(GenError::InvalidConfiguration(_))));
        pp.set_passwordlen(8);
        pp.set_char_classes(CharClasses::none());
        assert!(matches!(pp.generate_password(), Err(GenError::InvalidConfiguration(_))));
    }

    #[test]
    fn uuid4_groups() {
        let mut pp = seeded(11).build().unwrap();
        let joined = pp
            .generate_uuid4()
            .unwrap()
            .iter()
            .map(Token::to_string)
            .collect::<Vec<_>>()
            .join("-");
        assert_eq!(joined.len(), 36);
        assert_eq!(joined.chars().nth(14), Some('4'));
        assert!(matches!(joined.chars().nth(19), Some('8' | '9' | 'a' | 'b')));
    }

    #[test]
    fn password_entropy_for_single_char() {
        let pp = seeded(0).passwordlen(1).build().unwrap();
        assert!((pp.generated_password_entropy().unwrap() - 6.55).abs() < 0.01);
    }

    #[test]
    fn passphrase_entropy_internal_word_and_number() {
        let pp = seeded(0)
            .wordlist(Wordlist::internal())
            .amount_w(1)
            .amount_n(1)
            .build()
            .unwrap();
        assert!((pp.generated_passphrase_entropy().unwrap() - 32.70).abs() < 0.01);
    }

    #[test]
    fn password_length_needed_for_128_bits() {
        let pp = seeded(0).entropy_bits_req(128.0).build().unwrap();
        assert_eq!(pp.password_length_needed().unwrap(), 20);
    }

    #[test]
    fn words_amount_needed_follows_wordlist() {
        let mut pp = seeded(0)
            .wordlist(Wordlist::internal())
            .entropy_bits_req(77.0)
            .amount_n(0)
            .build()
            .unwrap();
        assert_eq!(pp.words_amount_needed().unwrap(), 6);
        pp.set_wordlist(small_list());
        assert_eq!(pp.words_amount_needed().unwrap(), 30);
    }

    #[test]
    fn derivations_require_their_inputs() {
        let mut pp = seeded(0).wordlist(Wordlist::internal()).build().unwrap();
        assert!(matches!(pp.words_amount_needed(), Err(GenError::InvalidConfiguration(_))));
        assert!(pp.password_length_needed().is_err());
        assert!(pp.generated_password_entropy().is_err());
        assert!(pp.generated_passphrase_entropy().is_err());

        pp.set_entropy_bits_req(77.0).unwrap();
        pp.set_char_classes(CharClasses::none());
        assert!(pp.password_length_needed().is_err());
        assert!(pp.words_amount_needed().is_err());
    }

    #[test]
    fn builder_rejects_inconsistent_settings() {
        assert!(matches!(
            Passphrase::builder().entropy_bits_req(-1.0).build(),
            Err(GenError::InvalidConfiguration(_))
        ));
        assert!(Passphrase::builder().entropy_bits_req(0.0).build().is_err());
        assert!(Passphrase::builder().randnum_range(10, 9).build().is_err());
        assert!(Passphrase::builder().randnum_range(-1, 9).build().is_err());
        assert!(Passphrase::builder().randnum_range(5, 5).build().is_ok());

        let mut pp = Passphrase::builder().build().unwrap();
        assert!(pp.set_entropy_bits_req(-3.0).is_err());
        assert_eq!(pp.entropy_bits_req(), None);
    }

    #[test]
    fn custom_number_range_is_respected() {
        let mut pp = seeded(2)
            .wordlist(small_list())
            .amount_w(0)
            .amount_n(20)
            .randnum_range(1, 3)
            .build()
            .unwrap();
        let result = pp.generate(0).unwrap();
        assert!(result.iter().all(|t| matches!(t, Token::Number(1..=3))));
    }
}
