//! Forcing an exact number of characters to uppercase across nested data.
//!
//! Input is a closed recursive tree. Containers keep their kind through the
//! transform: an `Ordered` node comes back `Ordered` with the same arity,
//! an `Unordered` node comes back `Unordered`.

use std::collections::{BTreeSet, HashSet};

use rand::TryRngCore;
use serde_json::Value;

use crate::errors::{GenError, Result};
use crate::random::RandomSource;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CaseNode {
    /// A single character or a whole string.
    Text(String),
    /// Carried through untouched.
    Number(i64),
    Ordered(Vec<CaseNode>),
    Unordered(BTreeSet<CaseNode>),
}

impl CaseNode {
    fn fold_chars(&self, pred: fn(char) -> bool) -> usize {
        match self {
            CaseNode::Text(s) => s.chars().filter(|&c| pred(c)).count(),
            CaseNode::Number(_) => 0,
            CaseNode::Ordered(items) => items.iter().map(|n| n.fold_chars(pred)).sum(),
            CaseNode::Unordered(items) => items.iter().map(|n| n.fold_chars(pred)).sum(),
        }
    }

    pub fn count_alphabetic(&self) -> usize {
        self.fold_chars(char::is_alphabetic)
    }

    pub fn count_uppercase(&self) -> usize {
        self.fold_chars(char::is_uppercase)
    }

    pub fn count_lowercase(&self) -> usize {
        self.fold_chars(char::is_lowercase)
    }

    /// Lowercase characters that uppercase to exactly one character; the
    /// only candidates [`make_chars_uppercase`] picks from.
    pub fn count_upcasable(&self) -> usize {
        self.fold_chars(|c| upcased(c).is_some())
    }

    /// Uppercases every candidate character. Characters such as `ß`, whose
    /// uppercase form is longer, are left as they are.
    pub fn to_uppercase(&self) -> CaseNode {
        match self {
            CaseNode::Text(s) => CaseNode::Text(s.chars().map(|c| upcased(c).unwrap_or(c)).collect()),
            CaseNode::Number(n) => CaseNode::Number(*n),
            CaseNode::Ordered(items) => CaseNode::Ordered(items.iter().map(Self::to_uppercase).collect()),
            CaseNode::Unordered(items) => {
                CaseNode::Unordered(items.iter().map(Self::to_uppercase).collect())
            }
        }
    }

    /// Uppercases the candidate characters whose traversal position is in
    /// `picks`. `cursor` counts candidates seen so far.
    fn uppercase_at(&self, picks: &HashSet<usize>, cursor: &mut usize) -> CaseNode {
        match self {
            CaseNode::Text(s) => {
                let mut out = String::with_capacity(s.len());
                for c in s.chars() {
                    match upcased(c) {
                        Some(upper) => {
                            out.push(if picks.contains(cursor) { upper } else { c });
                            *cursor += 1;
                        }
                        None => out.push(c),
                    }
                }
                CaseNode::Text(out)
            }
            CaseNode::Number(n) => CaseNode::Number(*n),
            CaseNode::Ordered(items) => CaseNode::Ordered(
                items.iter().map(|n| n.uppercase_at(picks, cursor)).collect(),
            ),
            CaseNode::Unordered(items) => CaseNode::Unordered(
                items.iter().map(|n| n.uppercase_at(picks, cursor)).collect(),
            ),
        }
    }
}

/// The uppercase form of `c` when `c` is lowercase and maps to a single
/// character, so one pick always adds exactly one uppercase letter.
fn upcased(c: char) -> Option<char> {
    if !c.is_lowercase() {
        return None;
    }
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) if u.is_uppercase() => Some(u),
        _ => None,
    }
}

impl From<&str> for CaseNode {
    fn from(s: &str) -> Self {
        CaseNode::Text(s.to_string())
    }
}

impl From<String> for CaseNode {
    fn from(s: String) -> Self {
        CaseNode::Text(s)
    }
}

impl From<char> for CaseNode {
    fn from(c: char) -> Self {
        CaseNode::Text(c.to_string())
    }
}

impl From<i64> for CaseNode {
    fn from(n: i64) -> Self {
        CaseNode::Number(n)
    }
}

impl From<Vec<CaseNode>> for CaseNode {
    fn from(items: Vec<CaseNode>) -> Self {
        CaseNode::Ordered(items)
    }
}

impl From<BTreeSet<CaseNode>> for CaseNode {
    fn from(items: BTreeSet<CaseNode>) -> Self {
        CaseNode::Unordered(items)
    }
}

/// Arrays, strings and integers map onto the tree; anything else is rejected.
impl TryFrom<Value> for CaseNode {
    type Error = GenError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(CaseNode::Text(s)),
            Value::Number(n) => n
                .as_i64()
                .map(CaseNode::Number)
                .ok_or_else(|| GenError::unsupported(format!("non-integral number {n}"))),
            Value::Array(items) => items
                .into_iter()
                .map(CaseNode::try_from)
                .collect::<Result<Vec<_>>>()
                .map(CaseNode::Ordered),
            other => Err(GenError::unsupported(format!(
                "cannot change the case of {other}"
            ))),
        }
    }
}

/// Returns a copy of `data` where exactly `min(count, candidates)` lowercase
/// characters, chosen uniformly without replacement, have been uppercased.
/// Every other character keeps its original case. Candidates are counted by
/// [`CaseNode::count_upcasable`].
///
/// Members of an `Unordered` node that become equal once uppercased merge,
/// so such a set can come back smaller.
pub fn make_chars_uppercase<R: TryRngCore>(
    data: &CaseNode,
    count: i64,
    rng: &mut RandomSource<R>,
) -> Result<CaseNode> {
    if count < 0 {
        return Err(GenError::unsupported(format!(
            "uppercase count must be 0 or greater, got {count}"
        )));
    }
    let count = count as usize;
    let total = data.count_upcasable();

    if count == 0 {
        return Ok(data.clone());
    }
    if count >= total {
        return Ok(data.to_uppercase());
    }

    let picks: HashSet<usize> = rng.sample_indices(total, count)?.into_iter().collect();
    let mut cursor = 0;
    Ok(data.uppercase_at(&picks, &mut cursor))
}
