// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Step definitions: their [`Registry`], typed parameters and matching of
//! step text.
//!
//! - [`collection`]: [`Registry`] building and lookup;
//! - [`handler`]: functions usable as step definitions;
//! - [`param`]: conversion of captured text into typed arguments;
//! - [`matcher`]: binding a parsed step to a step definition.

pub mod collection;
pub mod error;
pub mod handler;
pub mod location;
pub mod matcher;
pub mod param;
pub mod regex;

pub use self::{
    collection::{Binding, ErasedStep, Match, Registry, RegistryBuilder, Steps},
    error::AmbiguousMatchError,
    handler::{Handler, StepOutput},
    location::Location,
    matcher::{resolve, BoundStep},
    param::{Arguments, ConversionFailure, Param, ParamKind},
    regex::Pattern,
};
