//! Binding of parsed [`Step`]s to registered step definitions.

use derive_more::Debug;

use crate::{error::MatchError, feature::Step, world::Owner};

use super::{
    collection::{ErasedStep, Registry},
    param::Arguments,
};

/// [`Step`] bound to a step definition with its arguments converted.
#[derive(Debug)]
pub struct BoundStep {
    /// Keyword as written.
    pub keyword: String,

    /// Step text.
    pub text: String,

    /// 1-based line of the step.
    pub line: usize,

    /// [`Owner`] of the matched handler.
    pub owner: Owner,

    /// Handler invocation.
    #[debug(skip)]
    pub run: ErasedStep,
}

/// Resolves the given `step` of the `scenario` against the `registry`.
///
/// With `strict` keywords only step definitions declared with the step's
/// effective keyword are considered.
///
/// # Errors
///
/// - [`MatchError::Unbound`] if no step definition matches;
/// - [`MatchError::Ambiguous`] if more than one does;
/// - [`MatchError::ParameterConversion`] if a captured value (or the table)
///   cannot be converted into the declared parameter type.
pub fn resolve(
    registry: &Registry,
    step: &Step,
    scenario: &str,
    strict: bool,
) -> Result<BoundStep, MatchError> {
    let found = registry
        .find(&step.value, strict.then_some(step.ty))
        .map_err(|source| MatchError::Ambiguous {
            step: step.value.clone(),
            line: step.line,
            scenario: scenario.to_owned(),
            source,
        })?
        .ok_or_else(|| MatchError::Unbound {
            step: step.value.clone(),
            line: step.line,
            scenario: scenario.to_owned(),
        })?;

    let run = found
        .binding
        .bind(&mut Arguments::new(&found.captures, step.table.as_ref()))
        .map_err(|e| MatchError::ParameterConversion {
            step: step.value.clone(),
            line: step.line,
            scenario: scenario.to_owned(),
            position: e.position,
            expected: e.expected,
            reason: e.reason,
        })?;

    tracing::trace!(
        step = %step,
        pattern = found.binding.pattern().as_str(),
        "bound step",
    );
    Ok(BoundStep {
        keyword: step.keyword.clone(),
        text: step.value.clone(),
        line: step.line,
        owner: *found.binding.owner(),
        run,
    })
}
