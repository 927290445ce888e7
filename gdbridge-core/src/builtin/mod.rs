/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Built-in types like `Vector2`, `GString`, `Array` and `Variant`.
//!
//! Strings, containers and variants are engine-owned values. Each Rust value holds a registered handle (see [`ownership`][crate::ownership])
//! and destroys the engine value when dropped. Vectors are plain `repr(C)` structs with the engine's memory layout, so
//! they cross the boundary by copy. Their math is delegated to `glam`.

mod collections;
mod string;
mod string_name;
mod variant;
mod vectors;

pub use crate::sys::VariantType;
pub use collections::{Array, ArrayHandle, Dictionary, DictionaryHandle};
pub use string::{GString, StringHandle};
pub use string_name::{StringName, StringNameHandle};
pub use variant::{FromVariant, ToVariant, Variant, VariantHandle};
pub use vectors::{Vector2, Vector2i, Vector3};
