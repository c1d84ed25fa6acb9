//! Splits an argument string on prefixes such as `n/` or `t/`.
//!
//! A prefix only counts when it starts the string or follows whitespace, so
//! `a/Blk 30/5` keeps its inner slash. Text before the first prefix is the
//! preamble; each prefix may appear several times.

use std::collections::HashMap;
use std::fmt;

use crate::parser::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Prefix(pub &'static str);

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

pub const PREFIX_NAME: Prefix = Prefix("n/");
pub const PREFIX_PHONE: Prefix = Prefix("p/");
pub const PREFIX_EMAIL: Prefix = Prefix("e/");
pub const PREFIX_ADDRESS: Prefix = Prefix("a/");
pub const PREFIX_TUTORIAL: Prefix = Prefix("t/");
pub const PREFIX_STUDENT: Prefix = Prefix("s/");
pub const PREFIX_DATE: Prefix = Prefix("d/");
pub const PREFIX_GRADE: Prefix = Prefix("g/");

/// Values captured for each prefix, in the order they appeared.
#[derive(Debug, Clone, Default)]
pub struct ArgumentMultimap {
    preamble: String,
    values: HashMap<Prefix, Vec<String>>,
}

impl ArgumentMultimap {
    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    /// Last value given for `prefix`.
    pub fn value(&self, prefix: Prefix) -> Option<&str> {
        self.values
            .get(&prefix)
            .and_then(|v| v.last())
            .map(String::as_str)
    }

    pub fn all_values(&self, prefix: Prefix) -> &[String] {
        self.values.get(&prefix).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, prefix: Prefix) -> bool {
        self.values.contains_key(&prefix)
    }

    /// Reject repeated single-valued prefixes.
    pub fn verify_no_duplicate_prefixes(&self, prefixes: &[Prefix]) -> Result<(), ParseError> {
        let repeated: Vec<String> = prefixes
            .iter()
            .filter(|p| self.all_values(**p).len() > 1)
            .map(ToString::to_string)
            .collect();
        if repeated.is_empty() {
            return Ok(());
        }
        Err(ParseError::new(format!(
            "Multiple values specified for the following single-valued field(s): {}",
            repeated.join(" ")
        )))
    }
}

pub fn tokenize(args: &str, prefixes: &[Prefix]) -> ArgumentMultimap {
    let mut positions: Vec<(usize, Prefix)> = Vec::new();
    for prefix in prefixes {
        for (at, _) in args.match_indices(prefix.0) {
            let starts_token = args[..at]
                .chars()
                .next_back()
                .is_none_or(char::is_whitespace);
            if starts_token {
                positions.push((at, *prefix));
            }
        }
    }
    positions.sort_by_key(|(at, _)| *at);

    let first = positions.first().map_or(args.len(), |(at, _)| *at);
    let mut map = ArgumentMultimap {
        preamble: args[..first].trim().to_string(),
        values: HashMap::new(),
    };
    for (i, (at, prefix)) in positions.iter().enumerate() {
        let start = at + prefix.0.len();
        let end = positions.get(i + 1).map_or(args.len(), |(next, _)| *next);
        map.values
            .entry(*prefix)
            .or_default()
            .push(args[start..end].trim().to_string());
    }
    map
}
