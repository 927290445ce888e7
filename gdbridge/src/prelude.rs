/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

pub use super::builtin::{
    Array, Dictionary, FromVariant, GString, StringName, ToVariant, Variant, VariantType, Vector2,
    Vector2i, Vector3,
};
pub use super::classes::{ClassDb, ConfigFile, Node, Node2D, Object, RefCounted, Resource};
pub use super::global::Error;
pub use super::init::{ExtensionLibrary, InitLevel, LeakPolicy};
pub use super::meta::error::{CallError, ConvertError};
pub use super::obj::{Gd, GodotClass, Inherits, InstanceId};
pub use super::ownership::Lifetime;

// Re-export macros.
pub use super::{gdextension_entry, godot_error, godot_script_error, godot_warn};

// Make trait methods available.
pub use super::obj::Singleton as _; // singleton()
