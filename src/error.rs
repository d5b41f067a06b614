// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Consolidated error types.
//!
//! Structural errors ([`RegistryError`], [`ParseError`], [`MatchError`]) are
//! raised eagerly while building a [`Registry`] or generating a [`Feature`].
//! A [`HandlerFailure`] is raised by step logic itself and only ever fails
//! the scenario being executed.
//!
//! [`Feature`]: crate::Feature
//! [`Registry`]: crate::Registry

use std::{any::Any, io, path::PathBuf, sync::Arc};

use derive_more::{Display, Error, From};

use crate::step::{AmbiguousMatchError, Location, ParamKind};

/// Top-level error of generating or loading [`Feature`]s.
///
/// [`Feature`]: crate::Feature
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// Step definitions could not be registered.
    #[display("Failed to build step registry: {_0}")]
    Registry(RegistryError),

    /// A feature text could not be turned into executable scenarios.
    #[display("{source_name}: {kind}")]
    #[from(skip)]
    Feature {
        /// Logical name of the feature text (file or resource name).
        #[error(not(source))]
        source_name: String,

        /// What went wrong.
        #[error(source)]
        kind: FeatureError,
    },

    /// A feature file could not be read.
    #[display("Failed to read `{}`: {source}", path.display())]
    #[from(skip)]
    Io {
        /// Path of the file or directory.
        path: PathBuf,

        /// Underlying I/O error.
        source: io::Error,
    },
}

impl Error {
    /// Annotates the given `kind` of error with the `source_name` of the
    /// feature text it happened in.
    #[must_use]
    pub fn feature(
        source_name: impl Into<String>,
        kind: impl Into<FeatureError>,
    ) -> Self {
        Self::Feature {
            source_name: source_name.into(),
            kind: kind.into(),
        }
    }

    /// Returns the [`FeatureError`], if this is one.
    #[must_use]
    pub const fn as_feature_error(&self) -> Option<&FeatureError> {
        match self {
            Self::Feature { kind, .. } => Some(kind),
            Self::Registry(_) | Self::Io { .. } => None,
        }
    }
}

/// Error of generating a single [`Feature`].
///
/// [`Feature`]: crate::Feature
#[derive(Clone, Debug, Display, Error, From)]
pub enum FeatureError {
    /// Feature text is malformed.
    #[display("{_0}")]
    Parse(ParseError),

    /// A step could not be bound to a step definition.
    #[display("{_0}")]
    Match(MatchError),
}

/// Error of building a [`Registry`].
///
/// [`Registry`]: crate::Registry
#[derive(Clone, Debug, Display, Error)]
pub enum RegistryError {
    /// Two step definitions are declared with byte-identical pattern text.
    #[display(
        "Duplicate step pattern `{pattern}` registered at {first} and {second}"
    )]
    DuplicateBinding {
        /// Pattern text.
        #[error(not(source))]
        pattern: String,

        /// Where the pattern was registered first.
        first: Location,

        /// Where the pattern was registered again.
        second: Location,
    },

    /// Pattern text is not a valid regular expression.
    #[display("Invalid step pattern `{pattern}` at {location}: {source}")]
    InvalidPattern {
        /// Pattern text.
        pattern: String,

        /// Where the pattern was registered.
        location: Location,

        /// Regex compilation error.
        source: regex::Error,
    },

    /// Number of capture groups differs from the number of parameters
    /// populated by them.
    #[display(
        "Step pattern `{pattern}` at {location} has {captures} capture \
         group(s), but its handler takes {params} captured parameter(s)"
    )]
    ArityMismatch {
        /// Pattern text.
        #[error(not(source))]
        pattern: String,

        /// Where the pattern was registered.
        location: Location,

        /// Number of capture groups in the pattern.
        captures: usize,

        /// Number of non-table handler parameters.
        params: usize,
    },

    /// A table parameter is declared anywhere but last.
    #[display(
        "Step handler of `{pattern}` at {location} declares a table \
         parameter at position {position}, but only the last one may be"
    )]
    TableNotLast {
        /// Pattern text.
        #[error(not(source))]
        pattern: String,

        /// Where the pattern was registered.
        location: Location,

        /// Zero-based position of the misplaced table parameter.
        position: usize,
    },
}

/// Error of parsing a feature text.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum ParseError {
    /// Text is empty or doesn't start with a `Feature:` header.
    #[display("No `Feature:` header found")]
    EmptyFeature,

    /// `Feature:` header has no name.
    #[display("Feature header at line {line} has no name")]
    MissingFeatureName {
        /// 1-based line of the header.
        line: usize,
    },

    /// Rows of a table have different numbers of cells.
    #[display(
        "Malformed table in `{scenario}`: row {row} at line {line} has \
         {found} cell(s), expected {expected}"
    )]
    MalformedTable {
        /// Name of the scenario (or background) the table belongs to.
        #[error(not(source))]
        scenario: String,

        /// Index of the offending row, the header being row `0`.
        row: usize,

        /// 1-based line of the offending row.
        line: usize,

        /// Number of header cells.
        expected: usize,

        /// Number of cells in the offending row.
        found: usize,
    },

    /// Line doesn't fit the grammar at its position.
    #[display("Unexpected line {line}: `{text}`")]
    UnexpectedLine {
        /// 1-based line number.
        line: usize,

        /// Trimmed line text.
        #[error(not(source))]
        text: String,
    },

    /// Outline references a placeholder missing from its examples.
    #[display(
        "Scenario outline `{scenario}` uses `<{placeholder}>` not present in \
         its examples at line {line}"
    )]
    UnknownPlaceholder {
        /// Name of the scenario outline.
        #[error(not(source))]
        scenario: String,

        /// Placeholder name.
        placeholder: String,

        /// 1-based line of the examples row.
        line: usize,
    },
}

/// Error of binding a step to a step definition.
#[derive(Clone, Debug, Display, Error)]
pub enum MatchError {
    /// No pattern matches the step text.
    #[display("Step `{step}` at line {line} of `{scenario}` matches no step definition")]
    Unbound {
        /// Step text.
        #[error(not(source))]
        step: String,

        /// 1-based line of the step.
        line: usize,

        /// Name of the scenario.
        scenario: String,
    },

    /// More than one pattern matches the step text.
    #[display(
        "Step `{step}` at line {line} of `{scenario}` is ambiguous. {source}"
    )]
    Ambiguous {
        /// Step text.
        step: String,

        /// 1-based line of the step.
        line: usize,

        /// Name of the scenario.
        scenario: String,

        /// Conflicting patterns.
        source: AmbiguousMatchError,
    },

    /// A captured value cannot be converted to the declared parameter type.
    #[display(
        "Step `{step}` at line {line} of `{scenario}`: parameter {position} \
         expects {expected}, {reason}"
    )]
    ParameterConversion {
        /// Step text.
        #[error(not(source))]
        step: String,

        /// 1-based line of the step.
        line: usize,

        /// Name of the scenario.
        scenario: String,

        /// Zero-based position of the parameter.
        position: usize,

        /// Expected parameter type.
        expected: ParamKind,

        /// Why the conversion failed.
        reason: String,
    },
}

impl MatchError {
    /// Returns the text of the step that failed to bind.
    #[must_use]
    pub fn step(&self) -> &str {
        match self {
            Self::Unbound { step, .. }
            | Self::Ambiguous { step, .. }
            | Self::ParameterConversion { step, .. } => step,
        }
    }
}

/// Failure raised by a step definition during execution.
#[derive(Clone, Debug, Display, Error)]
pub enum HandlerFailure {
    /// Handler panicked, usually on a failed assertion.
    #[display("Step panicked: {_0}")]
    Panicked(#[error(not(source))] String),

    /// Handler returned an error.
    #[display("{_0:#}")]
    Returned(#[error(not(source))] Arc<anyhow::Error>),

    /// [`World`] instance could not be created.
    ///
    /// [`World`]: crate::World
    #[display("Failed to create `{world}`: {reason}")]
    WorldInit {
        /// Type name of the [`World`].
        ///
        /// [`World`]: crate::World
        #[error(not(source))]
        world: &'static str,

        /// Error returned by `World::new()`.
        reason: String,
    },

    /// Scenario step referenced a [`World`] missing from its instance set.
    ///
    /// [`World`]: crate::World
    #[display("No instance of `{world}` in the scenario")]
    NotInstantiated {
        /// Type name of the [`World`].
        ///
        /// [`World`]: crate::World
        #[error(not(source))]
        world: &'static str,
    },

    /// Scenario was parsed, but never compiled into an executable action.
    #[display("Scenario has no compiled action")]
    NotCompiled,
}

/// Extension of a panic payload for rendering it.
pub(crate) trait PanicPayloadExt {
    /// Renders the panic message, if it's a string.
    fn describe(&self) -> String;
}

impl PanicPayloadExt for Box<dyn Any + Send + 'static> {
    fn describe(&self) -> String {
        if let Some(s) = self.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = self.downcast_ref::<&str>() {
            (*s).to_owned()
        } else {
            "unknown panic payload".to_owned()
        }
    }
}
