// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! CLI options of an [`Engine`].
//!
//! Intended for test binaries with `harness = false`:
//!
//! ```rust,no_run
//! # use std::convert::Infallible;
//! # use stepbind::{cli, Engine, Registry, Steps, World};
//! #
//! # struct Noop;
//! #
//! # impl World for Noop {
//! #     type Error = Infallible;
//! #     fn new() -> Result<Self, Self::Error> { Ok(Self) }
//! #     fn steps(_: &mut Steps<Self>) {}
//! # }
//! #
//! # fn main() -> Result<(), stepbind::Error> {
//! let registry = Registry::builder().world::<Noop>().build()?;
//! Engine::new(registry)
//!     .with_cli(cli::Opts::parsed())
//!     .run_and_exit("tests/features");
//! # Ok(())
//! # }
//! ```
//!
//! [`Engine`]: crate::Engine

use gherkin::tagexpr::TagOperation;
use regex::Regex;

use crate::{writer::Coloring, Config};

/// Run the scenarios of feature files.
#[derive(clap::Parser, Clone, Debug)]
#[command(name = "stepbind", about = "Run the scenarios of feature files.")]
pub struct Opts {
    /// Regex to filter scenarios by their name.
    #[arg(
        id = "name",
        long = "name",
        short = 'n',
        value_name = "regex",
        visible_alias = "scenario-name"
    )]
    pub re_filter: Option<Regex>,

    /// Tag expression to filter scenarios by.
    ///
    /// Note: Feature and Scenario tags are merged together on filtering.
    #[arg(
        id = "tags",
        long = "tags",
        short = 't',
        value_name = "tagexpr",
        conflicts_with = "name"
    )]
    pub tags_filter: Option<TagOperation>,

    /// Skip the remaining scenarios after the first failure.
    #[arg(long)]
    pub fail_fast: bool,

    /// Number of scenarios to run concurrently.
    #[arg(long, short, value_name = "int", default_value_t = 1)]
    pub concurrency: usize,

    /// Match steps only against definitions declared for their keyword.
    #[arg(long)]
    pub strict_keywords: bool,

    /// Coloring policy for a console output.
    #[arg(long, value_name = "auto|always|never", default_value = "auto")]
    pub color: Coloring,
}

impl Opts {
    /// Shortcut for [`clap::Parser::parse()`], which doesn't require the trait
    /// being imported.
    #[must_use]
    pub fn parsed() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Converts these [`Opts`] into a [`Config`].
    #[must_use]
    pub fn config(&self) -> Config {
        Config {
            name_filter: self.re_filter.clone(),
            tags_filter: self.tags_filter.clone(),
            fail_fast: self.fail_fast,
            max_concurrent_scenarios: self.concurrency.max(1),
            strict_keywords: self.strict_keywords,
        }
    }
}
