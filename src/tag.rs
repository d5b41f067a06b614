// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Evaluation of tag expressions against scenario tags.

use gherkin::tagexpr::TagOperation;
use sealed::sealed;

/// Extension of a [`TagOperation`] allowing to evaluate it.
#[sealed]
pub trait Ext {
    /// Evaluates this [`TagOperation`] for the given `tags` (without the
    /// leading `@`).
    ///
    /// Tags are compared case-sensitively.
    #[must_use]
    fn eval<I, S>(&self, tags: I) -> bool
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S> + Clone;
}

#[sealed]
impl Ext for TagOperation {
    fn eval<I, S>(&self, tags: I) -> bool
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S> + Clone,
    {
        match self {
            Self::And(l, r) => l.eval(tags.clone()) && r.eval(tags),
            Self::Or(l, r) => l.eval(tags.clone()) || r.eval(tags),
            Self::Not(t) => !t.eval(tags),
            Self::Tag(t) => {
                let t = t.strip_prefix('@').unwrap_or(t);
                tags.into_iter().any(|tag| tag.as_ref() == t)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(t: &str) -> Box<TagOperation> {
        Box::new(TagOperation::Tag(t.to_owned()))
    }

    #[test]
    fn evaluates_expressions() {
        let slow_not_flaky =
            TagOperation::And(tag("slow"), Box::new(TagOperation::Not(tag("flaky"))));

        assert!(slow_not_flaky.eval(["slow", "db"]));
        assert!(!slow_not_flaky.eval(["slow", "flaky"]));
        assert!(!slow_not_flaky.eval(Vec::<String>::new()));

        let either = TagOperation::Or(tag("a"), tag("b"));
        assert!(either.eval(["b"]));
        assert!(!either.eval(["c"]));
    }

    #[test]
    fn case_sensitive() {
        assert!(!TagOperation::Tag("Slow".into()).eval(["slow"]));
        assert!(TagOperation::Tag("@slow".into()).eval(["slow"]));
    }
}
