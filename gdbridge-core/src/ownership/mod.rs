/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Ownership bridge between engine handles and Rust values.
//!
//! Rules for handles crossing the boundary:
//!
//! - **Returned by the engine** (ptrcall return): Rust adopts the reference the engine handed out, without an
//!   additional increment.
//! - **Passed as `&Gd<T>`**: the engine borrows; Rust keeps its reference.
//! - **Passed as `Gd<T>`**: ownership moves to the engine. Rust's reference ends once the call returns. For RefCounted
//!   objects, this drops one reference after the engine took its own; manually managed objects are no longer tracked
//!   and never freed by Rust.
//! - **Constructed** (`Gd::new()`): Rust holds exactly one reference.
//! - **Looked up by instance ID**: Rust takes a new strong reference.

mod lifetime;
mod pointers;

pub use lifetime::Lifetime;
pub use pointers::{
    forget_all, stats, sweep, Handle, Ownership, Pointer, PointerStats, SweepReport,
};
