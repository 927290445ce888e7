/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The **gdbridge** library lets Rust code call into a Godot engine through GDExtension, the engine's C API.
//!
//! # Type categories
//!
//! 1. **Value types**: `i64`, `f64`, `bool` and the vector types
//!    [`Vector2`][crate::builtin::Vector2], [`Vector2i`][crate::builtin::Vector2i] and
//!    [`Vector3`][crate::builtin::Vector3]. They are `Copy` and have the engine's memory layout. <br><br>
//!
//! 2. **Engine-owned values**: [`GString`][crate::builtin::GString], [`StringName`][crate::builtin::StringName]
//!    and [`Variant`][crate::builtin::Variant]. Their storage lives in the engine. `Clone` makes an engine-side copy,
//!    dropping destroys it. The containers [`Array`][crate::builtin::Array] and
//!    [`Dictionary`][crate::builtin::Dictionary] are engine-owned too, but `Clone` shares the storage. <br><br>
//!
//! 3. **Reference-counted objects**: [`Gd<T>`][crate::obj::Gd] where `T` inherits from
//!    [`RefCounted`][crate::classes::RefCounted]. Every `Gd` holds one reference; the object dies with the last one,
//!    whichever side of the boundary holds it. <br><br>
//!
//! 4. **Manually managed objects**: [`Gd<T>`][crate::obj::Gd] where `T` inherits from
//!    [`Object`][crate::classes::Object] but not from `RefCounted`, most notably [`Node`][crate::classes::Node].
//!    They must be handed over to the engine (e.g. as a child node) or freed with
//!    [`Gd::free()`][crate::obj::Gd::free]. <br><br>
//!
//! # Ownership across the boundary
//!
//! All handles Rust holds are tracked in a registry (see [`ownership`]). When the extension unloads, whatever is still
//! registered gets released according to [`ExtensionLibrary::leak_policy()`][crate::init::ExtensionLibrary::leak_policy],
//! so no engine resource outlives the library by accident.
//!
//! # Ergonomics and panics
//!
//! Operations that can only fail through a programming error (using a freed object, a missing method-bind, a
//! conversion on the wrong type) panic with a descriptive message. Fallible counterparts such as
//! [`Variant::try_to()`][crate::builtin::Variant::try_to] or [`Object::try_call()`][crate::classes::Object::try_call]
//! return `Result` instead. Panics at the entry point are caught and reported through the engine log.
//!
//! # Cargo features
//!
//! * **`experimental-threads`**
//!
//!   Allows engine access from threads other than the one that loaded the library. Without it, debug builds panic on
//!   access from other threads.

#[doc(inline)]
pub use gdbridge_core::{builtin, classes, global, meta, obj, ownership, registry};

#[doc(hidden)]
pub use gdbridge_core::sys;

/// Entry point and init levels.
pub mod init {
    pub use gdbridge_core::init::*;

    // Re-exports
    pub use gdbridge_core::gdextension_entry;
}

#[doc(hidden)]
pub use gdbridge_core::private;

pub use gdbridge_core::{gdextension_entry, godot_error, godot_script_error, godot_warn};

/// Often-imported symbols.
pub mod prelude;
