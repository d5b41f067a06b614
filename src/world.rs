// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Step-definition types and the per-scenario set of their instances.

use std::{
    any::{self, Any, TypeId},
    fmt::{self, Display},
    panic,
};

use linked_hash_map::LinkedHashMap;

use crate::{
    error::{HandlerFailure, PanicPayloadExt as _},
    step::Steps,
};

/// Step-definition type: state shared by the steps of a single scenario,
/// along with the step definitions operating on it.
///
/// A fresh instance is created for every scenario execution and dropped once
/// the scenario completes, so no state leaks between scenarios. If a workflow
/// needs state shared across scenarios (a connection pool, for example), keep
/// it in a [`std::sync::OnceLock`] or similar.
///
/// # Example
///
/// ```rust
/// use std::convert::Infallible;
///
/// use stepbind::{Steps, World};
///
/// #[derive(Default)]
/// struct Stock {
///     black_jumpers: u32,
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
///         steps
///             .given("I have (\\d+) black jumpers? left in stock", Stock::has)
///             .when("he returns the jumper for a refund", |s: &mut Stock| {
///                 s.black_jumpers += 1;
///             });
///     }
/// }
///
/// impl Stock {
///     fn has(&mut self, n: u32) {
///         self.black_jumpers = n;
///     }
/// }
/// ```
pub trait World: Sized + 'static {
    /// Error of creating a new [`World`] instance.
    type Error: Display;

    /// Creates a new [`World`] instance.
    ///
    /// # Errors
    ///
    /// If the instance cannot be created, failing the scenario before its
    /// first step runs.
    fn new() -> Result<Self, Self::Error>;

    /// Registers the step definitions of this [`World`].
    fn steps(steps: &mut Steps<Self>);
}

/// Type-erased handle to a [`World`] type, able to construct its instances.
#[derive(Clone, Copy)]
pub struct Owner {
    type_id: TypeId,
    name: &'static str,
    construct: fn() -> Result<Box<dyn Any>, String>,
}

impl Owner {
    /// Creates an [`Owner`] of the given [`World`] type.
    #[must_use]
    pub fn of<W: World>() -> Self {
        Self {
            type_id: TypeId::of::<W>(),
            name: any::type_name::<W>(),
            construct: || {
                panic::catch_unwind(W::new)
                    .map_err(|payload| payload.describe())?
                    .map(|w| -> Box<dyn Any> { Box::new(w) })
                    .map_err(|e| e.to_string())
            },
        }
    }

    /// Full type name of the [`World`].
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// [`TypeId`] of the [`World`].
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }
}

impl fmt::Debug for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Owner").field(&self.name).finish()
    }
}

impl PartialEq for Owner {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for Owner {}

/// Instances of [`World`]s used by a single scenario execution.
///
/// Holds exactly one instance per distinct [`World`] type referenced by the
/// scenario steps, in the order of first reference.
pub struct InstanceSet {
    instances: LinkedHashMap<TypeId, (&'static str, Box<dyn Any>)>,
}

impl InstanceSet {
    /// Constructs one instance of every distinct [`Owner`].
    ///
    /// # Errors
    ///
    /// With [`HandlerFailure::WorldInit`] if any [`World::new()`] fails.
    pub fn new<'o>(
        owners: impl IntoIterator<Item = &'o Owner>,
    ) -> Result<Self, HandlerFailure> {
        let mut instances = LinkedHashMap::new();
        for owner in owners {
            if instances.contains_key(&owner.type_id) {
                continue;
            }
            let instance = (owner.construct)().map_err(|reason| {
                HandlerFailure::WorldInit {
                    world: owner.name,
                    reason,
                }
            })?;
            tracing::trace!(world = owner.name, "instantiated");
            _ = instances.insert(owner.type_id, (owner.name, instance));
        }
        Ok(Self { instances })
    }

    /// Returns the instance of the given [`World`] type.
    ///
    /// # Errors
    ///
    /// With [`HandlerFailure::NotInstantiated`] if this set wasn't built with
    /// an [`Owner`] of `W`.
    pub fn get_mut<W: World>(&mut self) -> Result<&mut W, HandlerFailure> {
        self.instances
            .get_mut(&TypeId::of::<W>())
            .and_then(|(_, w)| w.downcast_mut())
            .ok_or(HandlerFailure::NotInstantiated {
                world: any::type_name::<W>(),
            })
    }

    /// Number of instances in this set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Indicates whether this set holds no instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Iterates over the type names of the held instances, in construction
    /// order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.instances.values().map(|(name, _)| *name)
    }
}

impl fmt::Debug for InstanceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
