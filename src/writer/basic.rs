// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Default [`Writer`] implementation.

use std::io;

use itertools::Itertools as _;

use crate::{
    error::Error,
    event::{Event, Outcome, ScenarioReport, Summary},
    feature::{Feature, Scenario},
    writer::{
        out::{Coloring, Styles, WriteStrExt as _},
        Writer,
    },
};

/// Default [`Writer`] implementation outputting to an [`io::Write`]
/// implementor.
///
/// Prints every scenario with its steps once it's finished, followed by a
/// summary at the end of a run.
#[derive(Clone, Debug)]
pub struct Basic<Out: io::Write = io::Stdout> {
    output: Out,
    styles: Styles,
}

impl Default for Basic {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Basic {
    /// Creates a new [`Basic`] [`Writer`] outputting to [`io::Stdout`].
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout(), Coloring::Auto)
    }
}

impl<Out: io::Write> Basic<Out> {
    /// Creates a new [`Basic`] [`Writer`] outputting to the given `output`.
    #[must_use]
    pub fn new(output: Out, coloring: Coloring) -> Self {
        Self {
            output,
            styles: Styles::new(coloring),
        }
    }

    /// Changes the [`Coloring`] policy of this [`Writer`].
    pub fn set_coloring(&mut self, coloring: Coloring) {
        self.styles = Styles::new(coloring);
    }

    /// Returns the underlying output.
    #[must_use]
    pub fn into_inner(self) -> Out {
        self.output
    }

    fn write(&mut self, event: &Event<'_>) -> io::Result<()> {
        match event {
            Event::Started | Event::FeatureFinished(..) => Ok(()),
            Event::FeatureStarted(f) => self.feature_started(f),
            Event::Scenario(_, sc, report) => self.scenario(sc, report),
            Event::GenerationFailed(e) => self.generation_failed(e),
            Event::Finished(summary) => self.summary(summary),
        }
    }

    fn feature_started(&mut self, feature: &Feature) -> io::Result<()> {
        let header = format!("Feature: {}", feature.name);
        let header = self.styles.header(header).into_owned();
        self.output.write_line(header)
    }

    fn generation_failed(&mut self, err: &Error) -> io::Result<()> {
        let line = self.styles.err(format!("Failed to generate: {err}"));
        let line = line.into_owned();
        self.output.write_line(line)
    }

    fn scenario(
        &mut self,
        scenario: &Scenario,
        report: &ScenarioReport,
    ) -> io::Result<()> {
        let failure = match &report.outcome {
            Outcome::Passed => None,
            Outcome::Failed(f) => Some(f),
            Outcome::Skipped(reason) => {
                let line = self.styles.skipped(format!(
                    "  ?  Scenario: {} (skipped: {reason})",
                    scenario.name,
                ));
                let line = line.into_owned();
                return self.output.write_line(line);
            }
        };
        let failed_index =
            failure.and_then(|f| f.step.as_ref()).map(|s| s.index);

        let header = format!("  Scenario: {}", scenario.name);
        let header = match failure {
            Some(_) => self.styles.err(header),
            None => self.styles.ok(header),
        }
        .into_owned();
        self.output.write_line(header)?;

        if let Some(f) = failure.filter(|f| f.step.is_none()) {
            //       ✘
            let line = self.styles.err(format!("   \u{2718}  {}", f.error));
            let line = line.into_owned();
            self.output.write_line(line)?;
        }

        for (i, step) in scenario.steps.iter().enumerate() {
            let line = match (failure, failed_index) {
                (Some(f), Some(idx)) if i == idx => {
                    let error = f
                        .error
                        .to_string()
                        .lines()
                        .map(|l| format!("      {l}"))
                        .join("\n");
                    //       ✘
                    self.styles.err(format!("   \u{2718}  {step}\n{error}"))
                }
                (Some(_), Some(idx)) if i > idx => {
                    self.styles.skipped(format!("   ?  {step} (skipped)"))
                }
                (Some(_), None) => {
                    self.styles.skipped(format!("   ?  {step} (skipped)"))
                }
                //        ✔
                _ => self.styles.ok(format!("   \u{2714}  {step}")),
            }
            .into_owned();
            self.output.write_line(line)?;
        }
        Ok(())
    }

    fn summary(&mut self, summary: &Summary) -> io::Result<()> {
        let stats = summary.stats();
        let features = summary.features.len();
        let header = self.styles.bold("[Summary]").into_owned();

        let mut parts = Vec::with_capacity(3);
        if stats.passed > 0 {
            parts.push(self.styles.ok(format!("{} passed", stats.passed)));
        }
        if stats.skipped > 0 {
            parts.push(
                self.styles.skipped(format!("{} skipped", stats.skipped)),
            );
        }
        if stats.failed > 0 {
            parts.push(self.styles.err(format!("{} failed", stats.failed)));
        }
        let parts = parts.iter().join(", ");

        self.output.write_line(header)?;
        self.output.write_line(format!(
            "{features} feature{}",
            if features == 1 { "" } else { "s" },
        ))?;
        self.output.write_line(format!(
            "{} scenario{}{}",
            stats.total(),
            if stats.total() == 1 { "" } else { "s" },
            if parts.is_empty() {
                String::new()
            } else {
                format!(" ({parts})")
            },
        ))?;
        if !summary.errors.is_empty() {
            let errors = self
                .styles
                .err(format!(
                    "{} generation error{}",
                    summary.errors.len(),
                    if summary.errors.len() == 1 { "" } else { "s" },
                ))
                .into_owned();
            self.output.write_line(errors)?;
        }
        self.output.flush()
    }
}

impl<Out: io::Write> Writer for Basic<Out> {
    fn handle_event(&mut self, event: &Event<'_>) {
        if let Err(e) = self.write(event) {
            tracing::error!(error = %e, "failed to write output");
        }
    }
}
