/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Types and traits related to objects.
//!
//! The most important symbols in this module are:
//! * [`GodotClass`], which is implemented for every engine class declared by this crate.
//! * [`Gd`], a smart pointer that manages instances of engine classes.

mod gd;
mod instance_id;
mod macros;
mod traits;

pub(crate) mod raw;

pub use gd::Gd;
pub use instance_id::InstanceId;
pub use raw::ObjectHandle;
pub use traits::*;

pub(crate) use gd::ClassHandle;
pub(crate) use macros::engine_class;
