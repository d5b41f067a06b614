// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Structured form of a feature text: [`Feature`], [`Scenario`] and [`Step`].

use std::fmt;

use derive_more::Display;

use crate::{
    compiler::Action,
    data_table::Table,
    error::HandlerFailure,
    event::{Failure, Outcome, SkipReason},
};

/// Tag marking a [`Scenario`] (or a whole [`Feature`]) as not to be executed.
pub const IGNORE_TAG: &str = "ignore";

/// Effective keyword category of a [`Step`].
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum StepType {
    /// `Given` step.
    Given,

    /// `When` step.
    When,

    /// `Then` step.
    Then,
}

/// Single step of a [`Scenario`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Step {
    /// Keyword exactly as written (`Given`, `And`, `*`, ...).
    pub keyword: String,

    /// Effective [`StepType`], with `And`/`But`/`*` resolved.
    pub ty: StepType,

    /// Step text without the keyword.
    pub value: String,

    /// [`Table`] written under the step, if any.
    pub table: Option<Table>,

    /// 1-based line of the step in the feature text.
    pub line: usize,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.keyword, self.value)
    }
}

/// Single executable test case.
#[derive(Clone)]
pub struct Scenario {
    /// Name of the scenario.
    pub name: String,

    /// Tags without the leading `@`, in written order and without duplicates.
    ///
    /// Tags of the enclosing [`Feature`] aren't included.
    pub tags: Vec<String>,

    /// Tags of the enclosing [`Feature`], so the [`Scenario`] stays
    /// self-contained once detached from it.
    pub feature_tags: Vec<String>,

    /// Steps in source order, background steps included.
    pub steps: Vec<Step>,

    /// Free-text lines preceding the steps, joined by newlines.
    pub description: String,

    /// Source name of the enclosing [`Feature`].
    pub source: String,

    /// 1-based line of the scenario header, or of the examples row this
    /// scenario was expanded from.
    pub line: usize,

    /// Compiled [`Action`], once the scenario is bound to step definitions.
    pub action: Option<Action>,
}

impl Scenario {
    /// Indicates whether this [`Scenario`] has the given tag.
    ///
    /// Tags are compared case-sensitively.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Indicates whether this [`Scenario`] or its [`Feature`] is tagged with
    /// [`IGNORE_TAG`].
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        self.has_tag(IGNORE_TAG)
            || self.feature_tags.iter().any(|t| t == IGNORE_TAG)
    }

    /// Runs the compiled [`Action`] of this [`Scenario`].
    ///
    /// An ignored [`Scenario`] is reported as skipped without invoking its
    /// [`Action`].
    #[must_use]
    pub fn run(&self) -> Outcome {
        if self.is_ignored() {
            return Outcome::Skipped(SkipReason::Ignored);
        }
        match &self.action {
            Some(action) => action.run().into(),
            None => Outcome::Failed(Failure {
                step: None,
                error: HandlerFailure::NotCompiled,
            }),
        }
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("feature_tags", &self.feature_tags)
            .field("steps", &self.steps)
            .field("description", &self.description)
            .field("source", &self.source)
            .field("line", &self.line)
            .field("compiled", &self.action.is_some())
            .finish()
    }
}

/// Named collection of [`Scenario`]s parsed from a single text.
#[derive(Clone, Debug)]
pub struct Feature {
    /// Name of the feature.
    pub name: String,

    /// Logical name of the text this feature was parsed from.
    pub source: String,

    /// Narrative lines following the header, joined by newlines.
    pub description: String,

    /// Tags written above the `Feature:` header, without the leading `@`.
    pub tags: Vec<String>,

    /// Background steps, already prepended to every [`Scenario`].
    pub background: Vec<Step>,

    /// Scenarios in source order, outlines expanded.
    pub scenarios: Vec<Scenario>,
}

impl Feature {
    /// Returns the first [`Scenario`] with the given `name`.
    #[must_use]
    pub fn scenario(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    /// Iterates over the tags of the given [`Scenario`] merged with the tags
    /// of this [`Feature`].
    pub fn effective_tags<'s>(
        &'s self,
        scenario: &'s Scenario,
    ) -> impl Iterator<Item = &'s str> + Clone + 's {
        self.tags
            .iter()
            .chain(&scenario.tags)
            .map(String::as_str)
    }

    /// Indicates whether the given [`Scenario`] must be skipped because it or
    /// this whole [`Feature`] is tagged with [`IGNORE_TAG`].
    #[must_use]
    pub fn is_ignored(&self, scenario: &Scenario) -> bool {
        self.effective_tags(scenario).any(|t| t == IGNORE_TAG)
    }

    /// Counts the steps of all the [`Scenario`]s.
    #[must_use]
    pub fn count_steps(&self) -> usize {
        self.scenarios.iter().map(|s| s.steps.len()).sum()
    }
}
