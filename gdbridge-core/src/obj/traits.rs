/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::obj::Gd;

/// Makes `T` eligible to be stored in [`Gd<T>`] pointers.
///
/// Implemented by the class structs that `engine_class!` declares.
///
/// # Safety
/// Implementors other than [`NoBase`] must be `repr(transparent)` over the crate's object handle, so that `Gd<Self>`
/// can dereference to `Self`.
#[diagnostic::on_unimplemented(
    message = "only engine classes are allowed in this context",
    note = "engine classes are declared with `engine_class!`"
)]
pub unsafe trait GodotClass: 'static
where
    Self: Sized,
{
    /// The immediate superclass of `T`.
    type Base: GodotClass;

    /// Name under which the engine's ClassDB knows the class.
    const CLASS_NAME: &'static str;

    /// Returns whether `Self` inherits from `Base`.
    ///
    /// This is reflexive, i.e `Self` inherits from itself.
    fn inherits<Base: GodotClass>() -> bool {
        if Self::CLASS_NAME == Base::CLASS_NAME {
            true
        } else if Self::Base::CLASS_NAME == NoBase::CLASS_NAME {
            false
        } else {
            Self::Base::inherits::<Base>()
        }
    }
}

/// Type representing the absence of a base class, at the root of the hierarchy.
///
/// `NoBase` is the base class of exactly one class: [`Object`][crate::classes::Object].
pub enum NoBase {}

// SAFETY: never dereferenced, no `Gd<NoBase>` can be obtained.
unsafe impl GodotClass for NoBase {
    type Base = NoBase;

    const CLASS_NAME: &'static str = "";
}

/// Marker trait: `Self` is `Base` or derives from it.
///
/// Enables upcasts with [`Gd::upcast()`] and restricts downcasts to meaningful targets.
///
/// # Safety
/// Only implement for types whose engine class really inherits from `Base`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not inherit from `{Base}`",
    note = "upcasts are only possible along the class hierarchy"
)]
pub unsafe trait Inherits<Base: GodotClass>: GodotClass {}

// SAFETY: every class inherits from itself.
unsafe impl<T: GodotClass> Inherits<T> for T {}

/// Classes that can be constructed with [`Gd::new()`].
pub trait Instantiable: GodotClass {}

/// Classes with exactly one engine-owned instance.
pub trait Singleton: GodotClass {
    /// Borrowed handle to the instance. Rust never frees it.
    fn singleton() -> Gd<Self>;
}
