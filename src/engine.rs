// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Top-level [`Engine`] for generating and executing features.

use std::{path::Path, sync::Arc};

use crate::{
    cli, compiler,
    error::Error,
    event::{Event, FeatureReport, Summary},
    feature::{Feature, Scenario},
    parser::{self, Parser as _},
    runner,
    writer::{self, Coloring, Writer},
    Config, Registry,
};

/// Top-level entry point: generates [`Feature`]s out of feature texts and
/// executes them against a [`Registry`] of step definitions.
///
/// Cloning an [`Engine`] is cheap, the [`Registry`] is shared.
///
/// # Example
///
/// ```rust
/// # use std::convert::Infallible;
/// use stepbind::{Engine, Registry, Steps, World};
///
/// #[derive(Default)]
/// struct Stock {
///     jumpers: u32,
/// }
///
/// impl World for Stock {
///     type Error = Infallible;
///
///     fn new() -> Result<Self, Self::Error> {
///         Ok(Self::default())
///     }
///
///     fn steps(steps: &mut Steps<Self>) {
///         _ = steps
///             .given("I have (\\d+) black jumpers? left in stock", |s: &mut Self, n: u32| {
///                 s.jumpers = n;
///             })
///             .when("he returns the jumper for a refund", |s: &mut Self| {
///                 s.jumpers += 1;
///             })
///             .then("I should have (\\d+) black jumpers? in stock", |s: &mut Self, n: u32| {
///                 assert_eq!(s.jumpers, n);
///             });
///     }
/// }
///
/// # fn main() -> Result<(), stepbind::Error> {
/// let engine = Engine::new(Registry::builder().world::<Stock>().build()?);
/// let report = engine.execute(
///     "refund.feature",
///     "Feature: Refunds
///        Scenario: Refunded items should be returned to stock
///          Given I have 1 black jumper left in stock
///          When he returns the jumper for a refund
///          Then I should have 2 black jumpers in stock",
/// )?;
/// assert_eq!(report.stats().passed, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Engine {
    registry: Arc<Registry>,
    config: Config,
    coloring: Coloring,
}

impl Engine {
    /// Creates a new [`Engine`] with the default [`Config`].
    #[must_use]
    pub fn new(registry: impl Into<Arc<Registry>>) -> Self {
        Self {
            registry: registry.into(),
            config: Config::default(),
            coloring: Coloring::Auto,
        }
    }

    /// Replaces the [`Config`] of this [`Engine`].
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Applies the given [`cli::Opts`].
    #[must_use]
    pub fn with_cli(mut self, opts: cli::Opts) -> Self {
        self.config = opts.config();
        self.coloring = opts.color;
        self
    }

    /// Returns the [`Registry`] of this [`Engine`].
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the [`Config`] of this [`Engine`].
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Parses the given `text` and compiles every [`Scenario`] of it.
    ///
    /// # Errors
    ///
    /// With [`Error::Feature`] naming the `source_name` if the `text` cannot
    /// be parsed, or any of its steps cannot be bound.
    pub fn generate_feature(
        &self,
        source_name: &str,
        text: &str,
    ) -> Result<Feature, Error> {
        let feature = parser::parse(source_name, text)
            .map_err(|e| Error::feature(source_name, e))?;
        compiler::compile_feature(
            &self.registry,
            feature,
            self.config.strict_keywords,
        )
        .map_err(|e| Error::feature(source_name, e))
    }

    /// Same as [`Engine::generate_feature()`], but returns only the compiled
    /// [`Scenario`]s.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::generate_feature()`].
    pub fn generate_scenarios(
        &self,
        text: &str,
    ) -> Result<Vec<Scenario>, Error> {
        self.generate_feature("", text).map(|f| f.scenarios)
    }

    /// Generates the `text` and executes every selected [`Scenario`] of it.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::generate_feature()`]. Nothing is executed then.
    pub fn execute(
        &self,
        source_name: &str,
        text: &str,
    ) -> Result<FeatureReport, Error> {
        self.execute_with(source_name, text, &mut writer::Discard)
    }

    /// Same as [`Engine::execute()`], but reports to the given [`Writer`].
    ///
    /// # Errors
    ///
    /// Same as [`Engine::generate_feature()`].
    pub fn execute_with<W: Writer + ?Sized>(
        &self,
        source_name: &str,
        text: &str,
        writer: &mut W,
    ) -> Result<FeatureReport, Error> {
        let feature = self.generate_feature(source_name, text)?;
        Ok(runner::run_feature(&feature, &self.config, writer))
    }

    /// Loads every feature file at the given `path` (a single file or a
    /// directory searched recursively), executes them and prints the
    /// results to [`io::Stdout`].
    ///
    /// [`io::Stdout`]: std::io::Stdout
    pub fn run(&self, path: impl AsRef<Path>) -> Summary {
        let mut writer = writer::Basic::stdout();
        writer.set_coloring(self.coloring);
        self.run_with(path, &mut writer)
    }

    /// Same as [`Engine::run()`], but reports to the given [`Writer`].
    ///
    /// A file which cannot be read or generated is reported and recorded in
    /// [`Summary::errors`], the remaining files still run.
    pub fn run_with<W: Writer + ?Sized>(
        &self,
        path: impl AsRef<Path>,
        writer: &mut W,
    ) -> Summary {
        let mut summary = Summary::default();
        writer.handle_event(&Event::Started);

        for source in parser::Basic.parse(path) {
            let generated = source.and_then(|src| {
                self.generate_feature(&src.name, &src.text)
            });
            match generated {
                Ok(feature) => {
                    let report =
                        runner::run_feature(&feature, &self.config, writer);
                    summary.features.push(report);
                }
                Err(e) => {
                    tracing::debug!(error = %e, "feature generation failed");
                    writer.handle_event(&Event::GenerationFailed(&e));
                    summary.errors.push(Arc::new(e));
                }
            }
        }

        writer.handle_event(&Event::Finished(&summary));
        summary
    }

    /// Same as [`Engine::run()`], but panics if the run has failed.
    ///
    /// # Panics
    ///
    /// If any [`Scenario`] failed, or any feature file couldn't be generated.
    pub fn run_and_exit(&self, path: impl AsRef<Path>) {
        let summary = self.run(path);
        if summary.execution_has_failed() {
            let stats = summary.stats();
            panic!(
                "{} scenario{} failed, {} feature{} failed to generate",
                stats.failed,
                if stats.failed == 1 { "" } else { "s" },
                summary.errors.len(),
                if summary.errors.len() == 1 { "" } else { "s" },
            );
        }
    }
}
