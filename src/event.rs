// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Outcomes of executed scenarios and the events reported to a [`Writer`].
//!
//! [`Writer`]: crate::Writer

use std::{sync::Arc, time::Duration};

use derive_more::Display;

use crate::{
    error::{Error, HandlerFailure},
    feature::{Feature, Scenario},
};

/// Reason of a [`Scenario`] being skipped.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum SkipReason {
    /// [`Scenario`] is tagged `@ignore`.
    #[display("ignored")]
    Ignored,

    /// A previous [`Scenario`] failed and fail-fast mode is on.
    #[display("fail-fast")]
    FailFast,
}

/// Step which caused a [`Scenario`] to fail.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[display("{keyword} {text}")]
pub struct FailedStep {
    /// Zero-based index of the step in the [`Scenario`], background steps
    /// included.
    pub index: usize,

    /// Keyword as written.
    pub keyword: String,

    /// Step text.
    pub text: String,

    /// 1-based line of the step.
    pub line: usize,
}

/// Failure of a [`Scenario`] execution.
#[derive(Clone, Debug)]
pub struct Failure {
    /// Step that failed, [`None`] if the scenario failed before its first
    /// step (on [`World`] construction, for example).
    ///
    /// [`World`]: crate::World
    pub step: Option<FailedStep>,

    /// Underlying failure.
    pub error: HandlerFailure,
}

/// Outcome of a single [`Scenario`] execution.
#[derive(Clone, Debug)]
pub enum Outcome {
    /// All steps passed.
    Passed,

    /// [`Scenario`] was not executed.
    Skipped(SkipReason),

    /// A step failed, the remaining ones were not executed.
    Failed(Failure),
}

impl Outcome {
    /// Indicates whether this is [`Outcome::Passed`].
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Indicates whether this is [`Outcome::Skipped`].
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    /// Indicates whether this is [`Outcome::Failed`].
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the [`Failure`], if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failed(f) => Some(f),
            Self::Passed | Self::Skipped(_) => None,
        }
    }
}

impl From<Result<(), Failure>> for Outcome {
    fn from(res: Result<(), Failure>) -> Self {
        res.map_or_else(Self::Failed, |()| Self::Passed)
    }
}

/// Report of a single executed (or skipped) [`Scenario`].
#[derive(Clone, Debug)]
pub struct ScenarioReport {
    /// Name of the [`Scenario`].
    pub name: String,

    /// 1-based line of the [`Scenario`].
    pub line: usize,

    /// Tags of the [`Scenario`].
    pub tags: Vec<String>,

    /// [`Outcome`] of the execution.
    pub outcome: Outcome,

    /// Time the execution took, zero for skipped scenarios.
    pub duration: Duration,
}

impl ScenarioReport {
    /// Creates a new [`ScenarioReport`] of the given [`Scenario`].
    #[must_use]
    pub fn new(scenario: &Scenario, outcome: Outcome, duration: Duration) -> Self {
        Self {
            name: scenario.name.clone(),
            line: scenario.line,
            tags: scenario.tags.clone(),
            outcome,
            duration,
        }
    }
}

/// Report of a single executed [`Feature`].
#[derive(Clone, Debug)]
pub struct FeatureReport {
    /// Name of the [`Feature`].
    pub name: String,

    /// Source name of the [`Feature`].
    pub source: String,

    /// Reports of the [`Scenario`]s which passed filtering, in source order.
    pub scenarios: Vec<ScenarioReport>,
}

impl FeatureReport {
    /// Counts the [`Outcome`]s of the [`Scenario`]s.
    #[must_use]
    pub fn stats(&self) -> Stats {
        self.scenarios.iter().map(|s| &s.outcome).collect()
    }

    /// Returns the [`ScenarioReport`] with the given `name`, if any.
    #[must_use]
    pub fn scenario(&self, name: &str) -> Option<&ScenarioReport> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    /// Indicates whether any [`Scenario`] failed.
    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.scenarios.iter().any(|s| s.outcome.is_failed())
    }
}

/// Counts of [`Outcome`]s.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    /// Number of passed [`Scenario`]s.
    pub passed: usize,

    /// Number of skipped [`Scenario`]s.
    pub skipped: usize,

    /// Number of failed [`Scenario`]s.
    pub failed: usize,
}

impl Stats {
    /// Total number of [`Scenario`]s counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.skipped + self.failed
    }

    /// Counts the given [`Outcome`].
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Passed => self.passed += 1,
            Outcome::Skipped(_) => self.skipped += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
    }
}

impl<'o> FromIterator<&'o Outcome> for Stats {
    fn from_iter<I: IntoIterator<Item = &'o Outcome>>(iter: I) -> Self {
        let mut stats = Self::default();
        for o in iter {
            stats.record(o);
        }
        stats
    }
}

/// Summary of a whole run.
#[derive(Clone, Debug, Default)]
pub struct Summary {
    /// Reports of the executed [`Feature`]s.
    pub features: Vec<FeatureReport>,

    /// Errors of the features which could not be loaded or generated.
    pub errors: Vec<Arc<Error>>,
}

impl Summary {
    /// Counts the [`Outcome`]s of all the [`Scenario`]s.
    #[must_use]
    pub fn stats(&self) -> Stats {
        self.features
            .iter()
            .flat_map(|f| &f.scenarios)
            .map(|s| &s.outcome)
            .collect()
    }

    /// Indicates whether the run has failed: either a [`Scenario`] failed, or
    /// a [`Feature`] couldn't be generated.
    #[must_use]
    pub fn execution_has_failed(&self) -> bool {
        !self.errors.is_empty() || self.features.iter().any(FeatureReport::has_failed)
    }
}

/// Event reported to a [`Writer`] during a run.
///
/// [`Writer`]: crate::Writer
#[derive(Clone, Debug)]
pub enum Event<'a> {
    /// Run has started.
    Started,

    /// Execution of a [`Feature`] has started.
    FeatureStarted(&'a Feature),

    /// A [`Scenario`] has been executed or skipped.
    Scenario(&'a Feature, &'a Scenario, &'a ScenarioReport),

    /// Execution of a [`Feature`] has finished.
    FeatureFinished(&'a Feature, &'a FeatureReport),

    /// A feature text couldn't be loaded or generated.
    GenerationFailed(&'a Error),

    /// Run has finished.
    Finished(&'a Summary),
}
