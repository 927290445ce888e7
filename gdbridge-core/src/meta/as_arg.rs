/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::{Array, Dictionary, GString, StringName, Variant, Vector2, Vector2i, Vector3};
use crate::obj::{GodotClass, Gd};
use crate::sys;
use sys::{CallFrame, GodotFfi};

/// Value that can be passed as an argument to a ptrcall.
///
/// Pushing only copies the native representation; the pushed value must stay alive until the call returns. Ownership
/// transfer happens through the Rust value: a `Gd<T>` passed by value is dropped by the trampoline after the call,
/// after the engine took its own reference.
pub trait AsArg {
    fn push_arg(&self, frame: &mut CallFrame);
}

/// Value that can be decoded from the return slot of a ptrcall.
pub trait FromPtrcall: Sized {
    /// Representation the engine writes.
    type Raw: Copy + 'static;

    /// Content of the return slot before the call.
    fn null_raw() -> Self::Raw;

    /// Takes ownership of what the engine wrote.
    ///
    /// # Safety
    /// `raw` must have been written by the engine for this type, or be [`null_raw()`](Self::null_raw).
    unsafe fn from_ptrcall(raw: Self::Raw) -> Self;
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Primitives

macro_rules! impl_ffi_marshal {
    ($($T:ty),* $(,)?) => {
        $(
            impl AsArg for $T {
                fn push_arg(&self, frame: &mut CallFrame) {
                    frame.push_arg(self);
                }
            }

            impl FromPtrcall for $T {
                type Raw = <$T as GodotFfi>::Raw;

                fn null_raw() -> Self::Raw {
                    <$T as GodotFfi>::null_raw()
                }

                unsafe fn from_ptrcall(raw: Self::Raw) -> Self {
                    <$T as GodotFfi>::from_raw(raw)
                }
            }
        )*
    };
}

impl_ffi_marshal!(bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, ());

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Builtins with engine-side resources: the slot holds a bit copy, the Rust value keeps ownership.

macro_rules! impl_opaque_marshal {
    ($($T:ident => $Opaque:ty),* $(,)?) => {
        $(
            impl AsArg for $T {
                fn push_arg(&self, frame: &mut CallFrame) {
                    frame.push_raw(self.opaque());
                }
            }

            impl FromPtrcall for $T {
                type Raw = $Opaque;

                fn null_raw() -> Self::Raw {
                    <$Opaque>::zeroed()
                }

                unsafe fn from_ptrcall(raw: Self::Raw) -> Self {
                    $T::from_opaque(raw)
                }
            }
        )*
    };
}

impl_opaque_marshal!(
    GString => sys::OpaqueString,
    StringName => sys::OpaqueStringName,
    Variant => sys::OpaqueVariant,
    Array => sys::OpaqueArray,
    Dictionary => sys::OpaqueDictionary,
);

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Plain-data builtins

macro_rules! impl_pod_marshal {
    ($($T:ty),* $(,)?) => {
        $(
            impl AsArg for $T {
                fn push_arg(&self, frame: &mut CallFrame) {
                    frame.push_raw(*self);
                }
            }

            impl FromPtrcall for $T {
                type Raw = Self;

                fn null_raw() -> Self {
                    Self::default()
                }

                unsafe fn from_ptrcall(raw: Self) -> Self {
                    raw
                }
            }
        )*
    };
}

impl_pod_marshal!(Vector2, Vector2i, Vector3);

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Objects

impl<T: GodotClass> AsArg for Gd<T> {
    fn push_arg(&self, frame: &mut CallFrame) {
        frame.push_raw(self.obj_sys());
    }
}

/// `None` is passed as a null object.
impl<T: GodotClass> AsArg for Option<&Gd<T>> {
    fn push_arg(&self, frame: &mut CallFrame) {
        let ptr = self.map_or(std::ptr::null_mut(), Gd::obj_sys);
        frame.push_raw(ptr);
    }
}

/// Adopts the reference handed out by the engine; a null return is `None`.
impl<T: GodotClass> FromPtrcall for Option<Gd<T>> {
    type Raw = sys::GDExtensionObjectPtr;

    fn null_raw() -> Self::Raw {
        std::ptr::null_mut()
    }

    unsafe fn from_ptrcall(raw: Self::Raw) -> Self {
        Gd::from_obj_sys(raw)
    }
}

impl<T: AsArg + ?Sized> AsArg for &T {
    fn push_arg(&self, frame: &mut CallFrame) {
        (**self).push_arg(frame);
    }
}
