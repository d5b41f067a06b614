// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Parsing of feature text into a [`Feature`], and sources of such text.
//!
//! The grammar is line-oriented:
//!
//! ```gherkin
//! @feature-tag
//! Feature: Stock
//!   Narrative lines.
//!
//!   Background:
//!     Given a shop
//!
//!   @tag
//!   Scenario: Refunded items go back to stock
//!     Given I have 1 black jumper left in stock
//!     When he returns the jumper for a refund
//!     Then I should have 2 black jumpers in stock
//!
//!   Scenario Outline: Tables
//!     Given a board layout:
//!       | mark | row | col    |
//!       | <m>  | top | left   |
//!
//!     Examples:
//!       | m |
//!       | X |
//! ```

pub mod basic;
mod lines;
mod outline;

use itertools::Itertools as _;

use crate::{
    data_table::{Table, TableShapeError},
    error::{Error, ParseError},
    feature::{Feature, Scenario, Step, StepType},
};

use self::{
    lines::{classify, Line},
    outline::Examples,
};

#[doc(inline)]
pub use self::basic::Basic;

/// Named feature text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Source {
    /// Logical name of the text (file path, resource name).
    pub name: String,

    /// Feature text itself.
    pub text: String,
}

/// Source of feature texts.
pub trait Parser<I> {
    /// Output [`Iterator`] of loaded [`Source`]s.
    type Output: Iterator<Item = Result<Source, Error>>;

    /// Loads the feature texts referenced by the given `input`.
    fn parse(self, input: I) -> Self::Output;
}

/// Parses the feature `text` named `source`.
///
/// Parsing is pure and deterministic: the same text always yields the same
/// [`Feature`].
///
/// # Errors
///
/// See [`ParseError`] for details.
pub fn parse(source: &str, text: &str) -> Result<Feature, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut state = State::new(source);
    for (i, raw) in text.lines().enumerate() {
        state.line(i + 1, raw)?;
    }
    let feature = state.finish()?;

    tracing::debug!(
        source,
        feature = %feature.name,
        scenarios = feature.scenarios.len(),
        "parsed feature",
    );
    Ok(feature)
}

/// Table rows along with their 1-based lines.
type Rows = Vec<(usize, Vec<String>)>;

/// Builds a [`Table`] out of the collected `rows`, if there are any.
fn table(
    owner: &str,
    rows: Rows,
) -> Result<Option<(Table, Vec<usize>)>, ParseError> {
    let Some(((_, header), data)) = rows.split_first() else {
        return Ok(None);
    };
    let lines = rows.iter().map(|(l, _)| *l).collect::<Vec<_>>();
    let table = Table::new(
        header.clone(),
        data.iter().map(|(_, r)| r.clone()).collect(),
    )
    .map_err(|e| {
        let (row, expected, found) = match e {
            TableShapeError::Ragged {
                row,
                expected,
                found,
            } => (row, expected, found),
            TableShapeError::Empty => (0, 0, 0),
        };
        ParseError::MalformedTable {
            scenario: owner.to_owned(),
            row,
            line: lines.get(row).copied().unwrap_or_default(),
            expected,
            found,
        }
    })?;
    Ok(Some((table, lines)))
}

/// Step whose table may still be growing.
#[derive(Debug)]
struct StepDraft {
    keyword: String,
    ty: StepType,
    value: String,
    line: usize,
    rows: Rows,
}

impl StepDraft {
    fn finish(self, owner: &str) -> Result<Step, ParseError> {
        Ok(Step {
            table: table(owner, self.rows)?.map(|(t, _)| t),
            keyword: self.keyword,
            ty: self.ty,
            value: self.value,
            line: self.line,
        })
    }
}

/// Steps of a scenario or background.
fn finish_steps(
    owner: &str,
    steps: Vec<StepDraft>,
) -> Result<Vec<Step>, ParseError> {
    steps.into_iter().map(|s| s.finish(owner)).collect()
}

/// `Examples:` block being collected.
#[derive(Debug)]
struct ExamplesDraft {
    tags: Vec<String>,
    rows: Rows,
}

/// Scenario being collected.
#[derive(Debug)]
struct ScenarioDraft {
    name: String,
    tags: Vec<String>,
    line: usize,
    description: Vec<String>,
    steps: Vec<StepDraft>,
    examples: Vec<ExamplesDraft>,
}

/// Part of the feature text the parser is in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Section {
    /// Before the `Feature:` header.
    Preamble,

    /// After the header, before any background or scenario.
    Narrative,

    /// Inside `Background:`.
    Background,

    /// Inside a scenario, before any `Examples:`.
    Scenario,

    /// Inside an `Examples:` block.
    Examples,
}

/// Parsing state machine.
#[derive(Debug)]
struct State<'s> {
    source: &'s str,
    section: Section,
    name: String,
    description: Vec<String>,
    feature_tags: Vec<String>,
    pending_tags: Vec<String>,
    background_draft: Vec<StepDraft>,
    background: Vec<Step>,
    current: Option<ScenarioDraft>,
    scenarios: Vec<Scenario>,

    /// Whether the previous line may be continued with a table row.
    rows_open: bool,
}

impl<'s> State<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            section: Section::Preamble,
            name: String::new(),
            description: Vec::new(),
            feature_tags: Vec::new(),
            pending_tags: Vec::new(),
            background_draft: Vec::new(),
            background: Vec::new(),
            current: None,
            scenarios: Vec::new(),
            rows_open: false,
        }
    }

    fn line(&mut self, n: usize, raw: &str) -> Result<(), ParseError> {
        let unexpected = || ParseError::UnexpectedLine {
            line: n,
            text: raw.trim().to_owned(),
        };

        let line = classify(raw);
        let rows_open = std::mem::replace(
            &mut self.rows_open,
            matches!(line, Line::Step { .. } | Line::Examples | Line::Row(_)),
        );
        if self.section == Section::Preamble {
            return match line {
                Line::Skip => Ok(()),
                Line::Tags(tags) => {
                    self.tag(tags);
                    Ok(())
                }
                Line::Feature("") => {
                    Err(ParseError::MissingFeatureName { line: n })
                }
                Line::Feature(name) => {
                    name.clone_into(&mut self.name);
                    self.feature_tags = self.take_tags();
                    self.section = Section::Narrative;
                    Ok(())
                }
                _ => Err(ParseError::EmptyFeature),
            };
        }

        match line {
            Line::Skip => {}
            Line::Tags(tags) => self.tag(tags),
            Line::Feature(_) => return Err(unexpected()),
            Line::Background => {
                if self.section != Section::Narrative {
                    return Err(unexpected());
                }
                self.drop_tags(n);
                self.section = Section::Background;
            }
            Line::Scenario { name, .. } => {
                self.finish_section()?;
                self.current = Some(ScenarioDraft {
                    name: name.to_owned(),
                    tags: self.take_tags(),
                    line: n,
                    description: Vec::new(),
                    steps: Vec::new(),
                    examples: Vec::new(),
                });
                self.section = Section::Scenario;
            }
            Line::Examples => {
                let tags = self.take_tags();
                let Some(draft) = self.current.as_mut() else {
                    return Err(unexpected());
                };
                draft.examples.push(ExamplesDraft {
                    tags,
                    rows: Vec::new(),
                });
                self.section = Section::Examples;
            }
            Line::Step { keyword, ty, text } => {
                let steps = match self.section {
                    Section::Background => &mut self.background_draft,
                    Section::Scenario => match self.current.as_mut() {
                        Some(draft) => &mut draft.steps,
                        None => return Err(unexpected()),
                    },
                    Section::Preamble
                    | Section::Narrative
                    | Section::Examples => return Err(unexpected()),
                };
                let ty = ty
                    .or_else(|| steps.last().map(|s| s.ty))
                    .unwrap_or(StepType::Given);
                steps.push(StepDraft {
                    keyword: keyword.to_owned(),
                    ty,
                    value: text.to_owned(),
                    line: n,
                    rows: Vec::new(),
                });
            }
            Line::Row(cells) => {
                if !rows_open {
                    return Err(unexpected());
                }
                let rows = match self.section {
                    Section::Background => {
                        self.background_draft.last_mut().map(|s| &mut s.rows)
                    }
                    Section::Scenario => self
                        .current
                        .as_mut()
                        .and_then(|d| d.steps.last_mut())
                        .map(|s| &mut s.rows),
                    Section::Examples => self
                        .current
                        .as_mut()
                        .and_then(|d| d.examples.last_mut())
                        .map(|e| &mut e.rows),
                    Section::Preamble | Section::Narrative => None,
                };
                rows.ok_or_else(unexpected)?.push((n, cells));
            }
            Line::Text(text) => match self.section {
                Section::Narrative => self.description.push(text.to_owned()),
                Section::Background if self.background_draft.is_empty() => {}
                Section::Scenario => match self.current.as_mut() {
                    Some(d) if d.steps.is_empty() => {
                        d.description.push(text.to_owned());
                    }
                    _ => return Err(unexpected()),
                },
                Section::Examples
                    if self
                        .current
                        .as_ref()
                        .and_then(|d| d.examples.last())
                        .is_some_and(|e| e.rows.is_empty()) =>
                {
                    self.rows_open = true;
                }
                Section::Preamble
                | Section::Background
                | Section::Examples => return Err(unexpected()),
            },
        }
        Ok(())
    }

    fn tag(&mut self, tags: Vec<&str>) {
        self.pending_tags.extend(tags.into_iter().map(str::to_owned));
    }

    fn take_tags(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_tags)
            .into_iter()
            .unique()
            .collect()
    }

    fn drop_tags(&mut self, line: usize) {
        if !self.pending_tags.is_empty() {
            tracing::warn!(
                source = self.source,
                line,
                tags = ?self.pending_tags,
                "tags not followed by a scenario are ignored",
            );
            self.pending_tags.clear();
        }
    }

    /// Completes the background or the scenario being collected.
    fn finish_section(&mut self) -> Result<(), ParseError> {
        if self.section == Section::Background {
            self.background = finish_steps(
                "Background",
                std::mem::take(&mut self.background_draft),
            )?;
        }
        let Some(draft) = self.current.take() else {
            return Ok(());
        };

        let steps = finish_steps(&draft.name, draft.steps)?;
        let examples = draft
            .examples
            .into_iter()
            .filter_map(|ex| {
                table(&draft.name, ex.rows)
                    .map(|t| {
                        t.map(|(table, lines)| Examples {
                            tags: ex.tags,
                            table,
                            lines: lines.into_iter().skip(1).collect(),
                        })
                    })
                    .transpose()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let outline = Scenario {
            name: draft.name,
            tags: draft.tags,
            feature_tags: self.feature_tags.clone(),
            steps,
            description: draft.description.join("\n"),
            source: self.source.to_owned(),
            line: draft.line,
            action: None,
        };
        for mut scenario in outline::expand(outline, &examples)? {
            _ = scenario
                .steps
                .splice(0..0, self.background.iter().cloned());
            self.scenarios.push(scenario);
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Feature, ParseError> {
        if self.section == Section::Preamble {
            return Err(ParseError::EmptyFeature);
        }
        self.finish_section()?;
        if !self.pending_tags.is_empty() {
            tracing::warn!(
                source = self.source,
                tags = ?self.pending_tags,
                "trailing tags are ignored",
            );
        }

        Ok(Feature {
            name: self.name,
            source: self.source.to_owned(),
            description: self.description.join("\n"),
            tags: self.feature_tags,
            background: self.background,
            scenarios: self.scenarios,
        })
    }
}
