// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Binding of step definitions to Gherkin-style feature text, and execution
//! of the resulting scenarios.
//!
//! 1. Step definitions are methods (or closures) on [`World`] types,
//!    registered with a pattern through [`Steps`] and collected into a
//!    [`Registry`].
//! 2. A feature text is parsed into a [`Feature`] of [`Scenario`]s, every
//!    step of which is bound to exactly one step definition, with captured
//!    values converted into the declared [`Param`]eter types.
//! 3. Every compiled [`Scenario`] runs its steps in order against a fresh
//!    [`InstanceSet`] holding one instance per [`World`] type it touches.
//!
//! [`Engine`] ties these together.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    trivial_casts,
    trivial_numeric_casts
)]
#![forbid(non_ascii_idents, unsafe_code)]
#![warn(
    clippy::as_conversions,
    clippy::branches_sharing_code,
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::empty_line_after_outer_attr,
    clippy::exit,
    clippy::expect_used,
    clippy::fallible_impl_from,
    clippy::get_unwrap,
    clippy::if_then_some_else_none,
    clippy::missing_const_for_fn,
    clippy::missing_docs_in_private_items,
    clippy::needless_pass_by_ref_mut,
    clippy::unwrap_used,
    missing_debug_implementations,
    missing_docs,
    unused_import_braces,
    unused_labels,
    unused_qualifications,
    unused_results
)]

pub mod cli;
pub mod compiler;
pub mod config;
pub mod data_table;
pub mod engine;
pub mod error;
pub mod event;
pub mod feature;
pub mod parser;
pub mod runner;
pub mod step;
pub mod tag;
pub mod world;
pub mod writer;

#[doc(inline)]
pub use self::{
    compiler::Action,
    config::Config,
    data_table::{Row, Table},
    engine::Engine,
    error::{Error, HandlerFailure},
    event::{Event, FeatureReport, Outcome, ScenarioReport, Summary},
    feature::{Feature, Scenario, Step, StepType},
    parser::Parser,
    step::{Param, ParamKind, Registry, RegistryBuilder, Steps},
    world::{InstanceSet, World},
    writer::Writer,
};
