// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Execution of compiled [`Feature`]s.
//!
//! [`Scenario`]s are executed sequentially by default. With
//! [`Config::max_concurrent_scenarios`] above `1` they are executed in
//! batches on scoped threads, yet reported in source order.

use std::{
    panic::{self, AssertUnwindSafe},
    thread,
    time::{Duration, Instant},
};

use crate::{
    config::Config,
    error::{HandlerFailure, PanicPayloadExt as _},
    event::{
        Event, FeatureReport, Failure, Outcome, ScenarioReport, SkipReason,
    },
    feature::{Feature, Scenario},
    writer::Writer,
};

/// Executes the [`Scenario`]s of the compiled `feature` selected by the
/// `config`, reporting each of them to the `writer` as it finishes.
///
/// Emits [`Event::FeatureStarted`], one [`Event::Scenario`] per selected
/// [`Scenario`] and [`Event::FeatureFinished`].
pub fn run_feature<W: Writer + ?Sized>(
    feature: &Feature,
    config: &Config,
    writer: &mut W,
) -> FeatureReport {
    writer.handle_event(&Event::FeatureStarted(feature));

    let selected = feature
        .scenarios
        .iter()
        .filter(|sc| config.is_selected(feature, sc))
        .collect::<Vec<_>>();
    tracing::debug!(
        feature = %feature.name,
        selected = selected.len(),
        total = feature.scenarios.len(),
        "running feature",
    );

    let mut scenarios = Vec::with_capacity(selected.len());
    let mut failed = false;
    for batch in selected.chunks(config.max_concurrent_scenarios.max(1)) {
        let skip = failed && config.fail_fast;
        let reports = if batch.len() == 1 {
            batch.iter().map(|sc| run_scenario(feature, sc, skip)).collect()
        } else {
            run_concurrently(feature, batch, skip)
        };

        for (sc, report) in batch.iter().zip(reports) {
            failed |= report.outcome.is_failed();
            writer.handle_event(&Event::Scenario(feature, sc, &report));
            scenarios.push(report);
        }
    }

    let report = FeatureReport {
        name: feature.name.clone(),
        source: feature.source.clone(),
        scenarios,
    };
    writer.handle_event(&Event::FeatureFinished(feature, &report));
    report
}

/// Runs the `batch` of [`Scenario`]s at once, one scoped thread each.
fn run_concurrently(
    feature: &Feature,
    batch: &[&Scenario],
    skip: bool,
) -> Vec<ScenarioReport> {
    thread::scope(|s| {
        let handles = batch
            .iter()
            .map(|&sc| {
                (sc, s.spawn(move || run_scenario(feature, sc, skip)))
            })
            .collect::<Vec<_>>();

        handles
            .into_iter()
            .map(|(sc, handle)| {
                handle.join().unwrap_or_else(|payload| {
                    let outcome = Outcome::Failed(Failure {
                        step: None,
                        error: HandlerFailure::Panicked(payload.describe()),
                    });
                    ScenarioReport::new(sc, outcome, Duration::ZERO)
                })
            })
            .collect()
    })
}

/// Runs a single [`Scenario`], unless it's ignored or `skip`ped.
fn run_scenario(
    feature: &Feature,
    scenario: &Scenario,
    skip: bool,
) -> ScenarioReport {
    if feature.is_ignored(scenario) {
        tracing::debug!(scenario = %scenario.name, "ignored");
        let outcome = Outcome::Skipped(SkipReason::Ignored);
        return ScenarioReport::new(scenario, outcome, Duration::ZERO);
    }
    if skip {
        let outcome = Outcome::Skipped(SkipReason::FailFast);
        return ScenarioReport::new(scenario, outcome, Duration::ZERO);
    }

    let span = tracing::info_span!(
        "scenario",
        name = %scenario.name,
        source = %scenario.source,
        line = scenario.line,
    );
    let _entered = span.enter();

    let started = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| scenario.run()))
        .unwrap_or_else(|payload| {
            Outcome::Failed(Failure {
                step: None,
                error: HandlerFailure::Panicked(payload.describe()),
            })
        });
    let duration = started.elapsed();

    match &outcome {
        Outcome::Failed(f) => tracing::debug!(
            error = %f.error,
            step = ?f.step.as_ref().map(ToString::to_string),
            "scenario failed",
        ),
        Outcome::Passed | Outcome::Skipped(_) => {
            tracing::debug!(?duration, "scenario finished");
        }
    }
    ScenarioReport::new(scenario, outcome, duration)
}
