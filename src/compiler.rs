// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Compilation of parsed [`Scenario`]s into executable [`Action`]s.

use std::{fmt, sync::Arc};

use itertools::Itertools as _;

use crate::{
    error::MatchError,
    event::{FailedStep, Failure},
    feature::{Feature, Scenario},
    step::{resolve, BoundStep, Registry},
    world::{InstanceSet, Owner},
};

/// Executable form of a compiled [`Scenario`].
///
/// Every [`Action::run()`] constructs a fresh [`InstanceSet`] and runs the
/// bound steps against it in source order, stopping at the first failure.
/// Runs never share state, so an [`Action`] may be run repeatedly and from
/// multiple threads.
#[derive(Clone)]
pub struct Action {
    steps: usize,
    run: Arc<dyn Fn() -> Result<(), Failure> + Send + Sync>,
}

impl Action {
    fn new(scenario: &str, steps: Vec<BoundStep>) -> Self {
        let owners = steps
            .iter()
            .map(|s| s.owner)
            .unique_by(Owner::type_id)
            .collect::<Vec<_>>();
        let scenario = scenario.to_owned();
        let len = steps.len();

        Self {
            steps: len,
            run: Arc::new(move || -> Result<(), Failure> {
                let mut instances =
                    InstanceSet::new(&owners).map_err(|error| Failure {
                        step: None,
                        error,
                    })?;

                for (index, step) in steps.iter().enumerate() {
                    tracing::trace!(
                        scenario = %scenario,
                        step = %format_args!("{} {}", step.keyword, step.text),
                        "running step",
                    );
                    (step.run)(&mut instances).map_err(|error| {
                        tracing::debug!(
                            scenario = %scenario,
                            line = step.line,
                            %error,
                            "step failed",
                        );
                        Failure {
                            step: Some(FailedStep {
                                index,
                                keyword: step.keyword.clone(),
                                text: step.text.clone(),
                                line: step.line,
                            }),
                            error,
                        }
                    })?;
                }
                Ok(())
            }),
        }
    }

    /// Runs the bound steps against a fresh [`InstanceSet`].
    ///
    /// # Errors
    ///
    /// With the [`Failure`] of the first failing step, or of constructing
    /// the [`InstanceSet`].
    pub fn run(&self) -> Result<(), Failure> {
        (self.run)()
    }

    /// Number of bound steps.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.steps
    }

    /// Indicates whether there are no bound steps.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.steps == 0
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

/// Binds every step of the given [`Scenario`] and attaches the resulting
/// [`Action`].
///
/// # Errors
///
/// With the [`MatchError`] of the first step which cannot be bound.
pub fn compile_scenario(
    registry: &Registry,
    mut scenario: Scenario,
    strict: bool,
) -> Result<Scenario, MatchError> {
    let steps = scenario
        .steps
        .iter()
        .map(|step| resolve(registry, step, &scenario.name, strict))
        .collect::<Result<Vec<_>, _>>()?;

    scenario.action = Some(Action::new(&scenario.name, steps));
    Ok(scenario)
}

/// Compiles every [`Scenario`] of the given [`Feature`].
///
/// Ignored scenarios are compiled too, so authoring defects surface before
/// anything runs.
///
/// # Errors
///
/// With the first [`MatchError`] in source order.
pub fn compile_feature(
    registry: &Registry,
    mut feature: Feature,
    strict: bool,
) -> Result<Feature, MatchError> {
    feature.scenarios = feature
        .scenarios
        .into_iter()
        .map(|s| compile_scenario(registry, s, strict))
        .collect::<Result<_, _>>()?;

    tracing::debug!(
        feature = %feature.name,
        scenarios = feature.scenarios.len(),
        steps = feature.count_steps(),
        "compiled feature",
    );
    Ok(feature)
}
