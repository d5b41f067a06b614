// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Execution settings of an [`Engine`].
//!
//! [`Engine`]: crate::Engine

use gherkin::tagexpr::TagOperation;
use regex::Regex;
use smart_default::SmartDefault;

use crate::{
    feature::{Feature, Scenario},
    tag::Ext as _,
};

/// Execution settings of an [`Engine`].
///
/// [`Engine`]: crate::Engine
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// Only [`Scenario`]s whose name matches this regex are executed.
    pub name_filter: Option<Regex>,

    /// Only [`Scenario`]s whose tags (merged with the [`Feature`] tags)
    /// satisfy this expression are executed.
    pub tags_filter: Option<TagOperation>,

    /// Skip the remaining [`Scenario`]s after the first failure.
    pub fail_fast: bool,

    /// Maximum number of [`Scenario`]s executed at once.
    ///
    /// `1` executes them sequentially.
    #[default(1)]
    pub max_concurrent_scenarios: usize,

    /// Match a step only against step definitions declared for its effective
    /// keyword.
    pub strict_keywords: bool,
}

impl Config {
    /// Sets the [`Config::name_filter`].
    #[must_use]
    pub fn filter_name(mut self, re: Regex) -> Self {
        self.name_filter = Some(re);
        self
    }

    /// Sets the [`Config::tags_filter`].
    #[must_use]
    pub fn filter_tags(mut self, op: TagOperation) -> Self {
        self.tags_filter = Some(op);
        self
    }

    /// Turns on [`Config::fail_fast`].
    #[must_use]
    pub const fn fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Sets the [`Config::max_concurrent_scenarios`], `0` is treated as `1`.
    #[must_use]
    pub fn max_concurrent_scenarios(mut self, max: usize) -> Self {
        self.max_concurrent_scenarios = max.max(1);
        self
    }

    /// Turns on [`Config::strict_keywords`].
    #[must_use]
    pub const fn strict_keywords(mut self) -> Self {
        self.strict_keywords = true;
        self
    }

    /// Indicates whether the given [`Scenario`] of the [`Feature`] passes
    /// the name and tag filters.
    #[must_use]
    pub fn is_selected(&self, feature: &Feature, scenario: &Scenario) -> bool {
        self.name_filter
            .as_ref()
            .map_or(true, |re| re.is_match(&scenario.name))
            && self
                .tags_filter
                .as_ref()
                .map_or(true, |op| op.eval(feature.effective_tags(scenario)))
    }
}
