/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Internal crate of [**gdbridge**](https://docs.rs/gdbridge).
//!
//! Contains the ownership bridge between engine handles and Rust values, object handles, out-call marshaling,
//! the core engine classes and the extension entry point. Use the `gdbridge` crate instead of depending on this
//! one directly.

pub mod builtin;
pub mod classes;
pub mod global;
pub mod init;
pub mod meta;
pub mod obj;
pub mod ownership;
pub mod registry;

#[doc(hidden)]
pub mod private;

pub use gdbridge_ffi as sys;
#[doc(hidden)]
pub use gdbridge_ffi::out;
