//! Conversion of captured step text into typed handler arguments.
//!
//! The set of conversions is closed: every handler parameter is one of the
//! [`ParamKind`]s and is converted explicitly, failing on mismatch instead of
//! coercing.

use std::fmt;

use derive_more::{Display, Error};

use crate::data_table::Table;

/// Semantic type of a handler parameter.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ParamKind {
    /// Integer parsed out of a capture group.
    Integer,

    /// Raw text of a capture group.
    String,

    /// One of the listed literal tokens, usually matched by an alternation
    /// like `(X|O)`.
    Token(&'static [&'static str]),

    /// [`Table`] attached to the step. Never produced by a capture group.
    Table,
}

impl ParamKind {
    /// Indicates whether this parameter consumes a capture group.
    #[must_use]
    pub const fn is_capture(&self) -> bool {
        !matches!(self, Self::Table)
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::String => write!(f, "string"),
            Self::Token(tokens) => write!(f, "one of `{}`", tokens.join("|")),
            Self::Table => write!(f, "table"),
        }
    }
}

/// Type usable as a step handler parameter.
///
/// Implemented for all primitive integers, [`String`], [`Table`] and
/// `Option<Table>`. Fieldless enums matched from alternation captures use the
/// [`token_param!`] macro.
///
/// [`token_param!`]: crate::token_param
pub trait Param: Clone + Send + Sync + Sized + 'static {
    /// [`ParamKind`] of this parameter.
    const KIND: ParamKind;

    /// Converts the text of a capture group.
    ///
    /// # Errors
    ///
    /// With a human-readable reason if the `text` isn't a valid value.
    fn from_capture(text: &str) -> Result<Self, String>;

    /// Converts the [`Table`] attached to a step, if any.
    ///
    /// # Errors
    ///
    /// By default, as only table parameters accept tables.
    fn from_table(table: Option<&Table>) -> Result<Self, String> {
        _ = table;
        Err(format!("{} parameter cannot take a table", Self::KIND))
    }
}

macro_rules! impl_integer_param {
    ($($ty:ty),* $(,)?) => {$(
        impl Param for $ty {
            const KIND: ParamKind = ParamKind::Integer;

            fn from_capture(text: &str) -> Result<Self, String> {
                text.parse()
                    .map_err(|e| format!("`{text}` is not {}: {e}", stringify!($ty)))
            }
        }
    )*};
}

impl_integer_param!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,
);

impl Param for String {
    const KIND: ParamKind = ParamKind::String;

    fn from_capture(text: &str) -> Result<Self, String> {
        Ok(text.to_owned())
    }
}

impl Param for Table {
    const KIND: ParamKind = ParamKind::Table;

    fn from_capture(_: &str) -> Result<Self, String> {
        Err("tables are never captured from step text".to_owned())
    }

    fn from_table(table: Option<&Table>) -> Result<Self, String> {
        table.cloned().ok_or_else(|| "step has no table".to_owned())
    }
}

impl Param for Option<Table> {
    const KIND: ParamKind = ParamKind::Table;

    fn from_capture(_: &str) -> Result<Self, String> {
        Err("tables are never captured from step text".to_owned())
    }

    fn from_table(table: Option<&Table>) -> Result<Self, String> {
        Ok(table.cloned())
    }
}

/// Implements [`Param`] for a fieldless enum matched by literal tokens.
///
/// ```rust
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// enum Mark {
///     X,
///     O,
/// }
///
/// stepbind::token_param!(Mark { "X" => Mark::X, "O" => Mark::O });
///
/// use stepbind::Param as _;
///
/// assert_eq!(Mark::from_capture("O"), Ok(Mark::O));
/// assert!(Mark::from_capture("Z").is_err());
/// ```
#[macro_export]
macro_rules! token_param {
    ($ty:ty { $($token:literal => $value:expr),+ $(,)? }) => {
        impl $crate::Param for $ty {
            const KIND: $crate::ParamKind =
                $crate::ParamKind::Token(&[$($token),+]);

            fn from_capture(text: &str) -> Result<Self, String> {
                match text {
                    $($token => Ok($value),)+
                    _ => Err(format!(
                        "`{text}` is not {}",
                        <Self as $crate::Param>::KIND,
                    )),
                }
            }
        }
    };
}

/// Failure to convert a single handler argument.
#[derive(Clone, Debug, Display, Error)]
#[display("parameter {position} expects {expected}: {reason}")]
pub struct ConversionFailure {
    /// Zero-based position of the parameter in the handler signature.
    pub position: usize,

    /// Expected [`ParamKind`].
    pub expected: ParamKind,

    /// Why the conversion failed.
    pub reason: String,
}

/// Sequential reader of handler arguments out of a matched step.
#[derive(Debug)]
pub struct Arguments<'a> {
    captures: &'a [String],
    table: Option<&'a Table>,
    next_capture: usize,
    position: usize,
}

impl<'a> Arguments<'a> {
    /// Creates new [`Arguments`] out of the step's capture groups and its
    /// optional [`Table`].
    #[must_use]
    pub const fn new(captures: &'a [String], table: Option<&'a Table>) -> Self {
        Self {
            captures,
            table,
            next_capture: 0,
            position: 0,
        }
    }

    /// Converts the next handler argument.
    ///
    /// Table parameters take the step's [`Table`], all the others take the
    /// next capture group.
    ///
    /// # Errors
    ///
    /// If the conversion fails or there are no capture groups left.
    pub fn next<P: Param>(&mut self) -> Result<P, ConversionFailure> {
        let position = self.position;
        self.position += 1;

        let converted = if P::KIND.is_capture() {
            let capture = self.captures.get(self.next_capture);
            self.next_capture += 1;
            capture
                .ok_or_else(|| "not enough capture groups".to_owned())
                .and_then(|text| P::from_capture(text))
        } else {
            P::from_table(self.table)
        };

        converted.map_err(|reason| ConversionFailure {
            position,
            expected: P::KIND,
            reason,
        })
    }
}
