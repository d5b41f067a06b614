//! Step patterns.
//!
//! A [`Pattern`] keeps the text a step definition was declared with next to
//! a [`Regex`] anchored to match a whole step text. Equality, ordering and
//! hashing go by the declared text only.

use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};

use derive_more::{Debug, Display};
use regex::Regex;

/// Step pattern matching the *entire* text of a step.
#[derive(Clone, Debug, Display)]
#[display("{source}")]
pub struct Pattern {
    /// Text the pattern was declared with.
    source: String,

    /// [`Regex`] compiled out of the `source` wrapped into `^(?:...)$`.
    #[debug(skip)]
    regex: Regex,
}

impl Pattern {
    /// Compiles the given declared `source` into a full-text [`Pattern`].
    ///
    /// # Errors
    ///
    /// If the `source` isn't a valid regular expression.
    pub fn new(source: impl Into<String>) -> Result<Self, regex::Error> {
        let source = source.into();
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self { source, regex })
    }

    /// Returns the text this [`Pattern`] was declared with.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the anchored [`Regex`].
    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Number of capture groups declared in this [`Pattern`], not counting
    /// the implicit whole-match group.
    #[must_use]
    pub fn captures_count(&self) -> usize {
        self.regex.captures_len() - 1
    }

    /// Matches the whole `text` returning its captures.
    ///
    /// Groups which didn't participate in the match are returned as empty
    /// strings.
    #[must_use]
    pub fn captures(&self, text: &str) -> Option<Vec<String>> {
        self.regex.captures(text).map(|caps| {
            caps.iter()
                .skip(1)
                .map(|m| m.map_or_else(String::new, |m| m.as_str().to_owned()))
                .collect()
        })
    }
}

impl Hash for Pattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl PartialOrd for Pattern {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pattern {
    fn cmp(&self, other: &Self) -> Ordering {
        self.source.cmp(&other.source)
    }
}
