//! Errors of matching a step text against a [`Registry`].
//!
//! [`Registry`]: super::Registry

use std::fmt;

use derive_more::Error;
use itertools::Itertools as _;

use super::{location::Location, regex::Pattern};

/// Error of a step text matching more than one registered [`Pattern`].
#[derive(Clone, Debug, Error)]
pub struct AmbiguousMatchError {
    /// [`Pattern`]s the step text matches, along with where they were
    /// registered.
    pub possible_matches: Vec<(Pattern, Location)>,
}

impl AmbiguousMatchError {
    /// Creates a new [`AmbiguousMatchError`] out of the conflicting matches,
    /// sorting them by their pattern text.
    #[must_use]
    pub fn new(possible_matches: Vec<(Pattern, Location)>) -> Self {
        Self {
            possible_matches: possible_matches.into_iter().sorted().collect(),
        }
    }

    /// Iterates over the texts of the conflicting [`Pattern`]s.
    pub fn patterns(&self) -> impl Iterator<Item = &str> + '_ {
        self.possible_matches.iter().map(|(p, _)| p.as_str())
    }
}

impl fmt::Display for AmbiguousMatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Possible matches:")?;
        for (pattern, loc) in &self.possible_matches {
            write!(f, "\n{pattern} --> {loc}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_patterns_sorted_with_locations() {
        let err = AmbiguousMatchError::new(vec![
            (
                Pattern::new("I have (.*) jumpers").unwrap(),
                Location::new("tests/b.rs", 20, 9),
            ),
            (
                Pattern::new("I have (\\d+) jumpers").unwrap(),
                Location::new("tests/a.rs", 10, 5),
            ),
        ]);

        assert_eq!(
            err.patterns().collect::<Vec<_>>(),
            ["I have (.*) jumpers", "I have (\\d+) jumpers"],
        );
        assert_eq!(
            err.to_string(),
            "Possible matches:\n\
             I have (.*) jumpers --> tests/b.rs:20:9\n\
             I have (\\d+) jumpers --> tests/a.rs:10:5",
        );
    }
}
