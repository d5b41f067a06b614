// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for outputting [`Event`]s.

pub mod basic;
pub mod out;

use crate::event::Event;

#[doc(inline)]
pub use self::{
    basic::Basic,
    out::{Coloring, Styles, WritableString, WriteStrExt},
};

/// Writer of [`Event`]s to some output.
pub trait Writer {
    /// Handles the given [`Event`].
    fn handle_event(&mut self, event: &Event<'_>);
}

impl<W: Writer + ?Sized> Writer for &mut W {
    fn handle_event(&mut self, event: &Event<'_>) {
        (**self).handle_event(event);
    }
}

/// [`Writer`] ignoring every [`Event`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Discard;

impl Writer for Discard {
    fn handle_event(&mut self, _: &Event<'_>) {}
}
