//! Registry of step definitions and matching of step text against it.

use std::{
    any::TypeId,
    collections::{HashMap, HashSet},
    fmt,
    marker::PhantomData,
    sync::Arc,
};

use derive_more::Debug;

use crate::{
    error::{HandlerFailure, RegistryError},
    feature::StepType,
    world::{InstanceSet, Owner, World},
};

use super::{
    error::AmbiguousMatchError,
    handler::Handler,
    location::Location,
    param::{Arguments, ConversionFailure, ParamKind},
    regex::Pattern,
};

/// Step handler invocation bound to its converted arguments, operating on the
/// scenario [`InstanceSet`].
pub type ErasedStep =
    Box<dyn Fn(&mut InstanceSet) -> Result<(), HandlerFailure> + Send + Sync>;

/// Type-erased function converting arguments and binding them to a handler.
type BindFn = Arc<
    dyn Fn(&mut Arguments<'_>) -> Result<ErasedStep, ConversionFailure>
        + Send
        + Sync,
>;

/// Single registered step definition: one pattern bound to one handler.
///
/// A handler registered with several patterns produces several [`Binding`]s
/// sharing that handler.
#[derive(Clone, Debug)]
pub struct Binding {
    pattern: Pattern,
    keywords: Vec<StepType>,
    owner: Owner,
    signature: Vec<ParamKind>,
    location: Location,
    #[debug(skip)]
    bind: BindFn,
}

impl Binding {
    /// Full-text [`Pattern`] of this [`Binding`].
    #[must_use]
    pub const fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Keyword categories this [`Binding`] was declared with.
    ///
    /// They don't restrict matching unless strict keyword matching is on.
    #[must_use]
    pub fn keywords(&self) -> &[StepType] {
        &self.keywords
    }

    /// [`Owner`] of the handler.
    #[must_use]
    pub const fn owner(&self) -> &Owner {
        &self.owner
    }

    /// Declared parameter types of the handler, in order.
    #[must_use]
    pub fn signature(&self) -> &[ParamKind] {
        &self.signature
    }

    /// [`Location`] of the registration.
    #[must_use]
    pub const fn location(&self) -> Location {
        self.location
    }

    /// Converts the [`Arguments`] and binds them to the handler.
    ///
    /// # Errors
    ///
    /// If any argument fails to convert.
    pub fn bind(
        &self,
        args: &mut Arguments<'_>,
    ) -> Result<ErasedStep, ConversionFailure> {
        (self.bind)(args)
    }
}

/// [`Binding`] matched by a step text, along with its capture groups.
#[derive(Debug)]
pub struct Match<'r> {
    /// Matched [`Binding`].
    pub binding: &'r Binding,

    /// Texts of the capture groups, empty for non-participating ones.
    pub captures: Vec<String>,
}

/// Step definition not validated yet.
struct Declared {
    pattern: String,
    keywords: Vec<StepType>,
    signature: Vec<ParamKind>,
    location: Location,
    bind: BindFn,
}

/// Step definitions of a single [`World`], collected by [`World::steps()`].
pub struct Steps<W> {
    declared: Vec<Declared>,
    _world: PhantomData<fn() -> W>,
}

impl<W> fmt::Debug for Steps<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.declared.iter().map(|d| &d.pattern))
            .finish()
    }
}

impl<W: World> Steps<W> {
    fn new() -> Self {
        Self {
            declared: Vec::new(),
            _world: PhantomData,
        }
    }

    /// Registers a [Given] step definition.
    ///
    /// [Given]: https://cucumber.io/docs/gherkin/reference#given
    #[track_caller]
    pub fn given<Args, H: Handler<W, Args>>(
        &mut self,
        pattern: impl Into<String>,
        handler: H,
    ) -> &mut Self {
        self.step(&[StepType::Given], pattern, handler)
    }

    /// Registers a [When] step definition.
    ///
    /// [When]: https://cucumber.io/docs/gherkin/reference#when
    #[track_caller]
    pub fn when<Args, H: Handler<W, Args>>(
        &mut self,
        pattern: impl Into<String>,
        handler: H,
    ) -> &mut Self {
        self.step(&[StepType::When], pattern, handler)
    }

    /// Registers a [Then] step definition.
    ///
    /// [Then]: https://cucumber.io/docs/gherkin/reference#then
    #[track_caller]
    pub fn then<Args, H: Handler<W, Args>>(
        &mut self,
        pattern: impl Into<String>,
        handler: H,
    ) -> &mut Self {
        self.step(&[StepType::Then], pattern, handler)
    }

    /// Registers a step definition under several keyword categories at once.
    #[track_caller]
    pub fn step<Args, H: Handler<W, Args>>(
        &mut self,
        keywords: &[StepType],
        pattern: impl Into<String>,
        handler: H,
    ) -> &mut Self {
        self.patterns(keywords, [pattern], handler)
    }

    /// Registers the same handler under several patterns, one [`Binding`]
    /// each.
    #[track_caller]
    pub fn patterns<Args, H, P>(
        &mut self,
        keywords: &[StepType],
        patterns: impl IntoIterator<Item = P>,
        handler: H,
    ) -> &mut Self
    where
        H: Handler<W, Args>,
        P: Into<String>,
    {
        let location = Location::caller();
        let handler = Arc::new(handler);
        let bind: BindFn = Arc::new(
            move |args: &mut Arguments<'_>| -> Result<ErasedStep, ConversionFailure> {
                let step = Arc::clone(&handler).bind(args)?;
                Ok(Box::new(
                    move |set: &mut InstanceSet| -> Result<(), HandlerFailure> {
                        step(set.get_mut::<W>()?)
                    },
                ))
            },
        );
        for pattern in patterns {
            self.declared.push(Declared {
                pattern: pattern.into(),
                keywords: keywords.to_vec(),
                signature: H::signature(),
                location,
                bind: Arc::clone(&bind),
            });
        }
        self
    }
}

/// Read-only registry of all the step definitions.
///
/// Built once by a [`RegistryBuilder`] and safe to share between threads.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    bindings: Vec<Binding>,
}

impl Registry {
    /// Starts building a new [`Registry`].
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Number of [`Binding`]s.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Indicates whether no step definitions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterates over the [`Binding`]s in registration order.
    pub fn bindings(&self) -> impl ExactSizeIterator<Item = &Binding> + '_ {
        self.bindings.iter()
    }

    /// Finds the single [`Binding`] whose pattern matches the whole `text`.
    ///
    /// With a `strict` [`StepType`] only [`Binding`]s declared with it are
    /// considered.
    ///
    /// # Errors
    ///
    /// If the `text` matches more than one [`Binding`].
    pub fn find(
        &self,
        text: &str,
        strict: Option<StepType>,
    ) -> Result<Option<Match<'_>>, AmbiguousMatchError> {
        let mut matches = self
            .bindings
            .iter()
            .filter(|b| strict.map_or(true, |ty| b.keywords.contains(&ty)))
            .filter_map(|b| {
                b.pattern.captures(text).map(|captures| Match {
                    binding: b,
                    captures,
                })
            })
            .collect::<Vec<_>>();

        if matches.len() > 1 {
            return Err(AmbiguousMatchError::new(
                matches
                    .iter()
                    .map(|m| (m.binding.pattern.clone(), m.binding.location))
                    .collect(),
            ));
        }
        Ok(matches.pop())
    }
}

/// Builder of a [`Registry`] out of [`World`] types.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    declared: Vec<(Owner, Vec<Declared>)>,
    worlds: HashSet<TypeId>,
}

impl fmt::Debug for Declared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --> {}", self.pattern, self.location)
    }
}

impl RegistryBuilder {
    /// Collects the step definitions of the given [`World`] type.
    ///
    /// Adding the same type twice has no effect.
    #[must_use]
    pub fn world<W: World>(mut self) -> Self {
        if !self.worlds.insert(TypeId::of::<W>()) {
            tracing::debug!(
                world = std::any::type_name::<W>(),
                "step definitions already collected",
            );
            return self;
        }
        let mut steps = Steps::<W>::new();
        W::steps(&mut steps);
        self.declared.push((Owner::of::<W>(), steps.declared));
        self
    }

    /// Validates all the collected step definitions and builds a
    /// [`Registry`].
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidPattern`] if a pattern isn't a valid regex;
    /// - [`RegistryError::DuplicateBinding`] if two step definitions share
    ///   byte-identical pattern text;
    /// - [`RegistryError::TableNotLast`] if a table parameter isn't last;
    /// - [`RegistryError::ArityMismatch`] if the number of capture groups
    ///   differs from the number of captured parameters.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let mut seen = HashMap::<String, Location>::new();
        let mut bindings = Vec::new();

        for (owner, declared) in self.declared {
            for d in declared {
                if let Some(&first) = seen.get(&d.pattern) {
                    return Err(RegistryError::DuplicateBinding {
                        pattern: d.pattern,
                        first,
                        second: d.location,
                    });
                }
                _ = seen.insert(d.pattern.clone(), d.location);

                let pattern = Pattern::new(d.pattern.as_str()).map_err(
                    |source| RegistryError::InvalidPattern {
                        pattern: d.pattern.clone(),
                        location: d.location,
                        source,
                    },
                )?;

                let last = d.signature.len().saturating_sub(1);
                if let Some(position) = d
                    .signature
                    .iter()
                    .position(|k| !k.is_capture())
                    .filter(|&p| p != last)
                {
                    return Err(RegistryError::TableNotLast {
                        pattern: d.pattern,
                        location: d.location,
                        position,
                    });
                }

                let params =
                    d.signature.iter().filter(|k| k.is_capture()).count();
                if pattern.captures_count() != params {
                    return Err(RegistryError::ArityMismatch {
                        captures: pattern.captures_count(),
                        pattern: d.pattern,
                        location: d.location,
                        params,
                    });
                }

                tracing::trace!(
                    pattern = pattern.as_str(),
                    world = owner.name(),
                    location = %d.location,
                    "registered step definition",
                );
                bindings.push(Binding {
                    pattern,
                    keywords: d.keywords,
                    owner,
                    signature: d.signature,
                    location: d.location,
                    bind: d.bind,
                });
            }
        }

        tracing::debug!(bindings = bindings.len(), "step registry built");
        Ok(Registry { bindings })
    }
}
