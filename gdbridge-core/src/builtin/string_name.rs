/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ffi::c_char;
use std::fmt;

use crate::builtin::GString;
use crate::ownership::{Handle, Pointer};
use crate::sys;
use sys::{interface_fn, OpaqueStringName};

/// Registry kind for engine `StringName` values.
pub enum StringNameHandle {}

// SAFETY: every owned string name is destroyed exactly once, by the registry.
unsafe impl Handle for StringNameHandle {
    type Raw = OpaqueStringName;
    const KIND: &'static str = "StringName";

    unsafe fn release(mut raw: OpaqueStringName) {
        if sys::is_initialized() {
            (sys::builtin_lifecycle_api().string_name_destroy)(raw.as_mut_ptr());
        }
    }
}

/// Interned string, used by the engine for class, method and property names.
///
/// For names known at compile time, the method-bind table keeps its own cache of engine string names; this type is
/// for names only known at runtime.
pub struct StringName {
    handle: Pointer<StringNameHandle>,
}

impl StringName {
    pub(crate) fn from_opaque(opaque: OpaqueStringName) -> Self {
        Self {
            handle: Pointer::new(opaque),
        }
    }

    pub(crate) fn opaque(&self) -> OpaqueStringName {
        self.handle.get()
    }

    /// # Safety
    /// `init_fn` must initialize the string name behind the pointer.
    pub(crate) unsafe fn new_with_uninit(
        init_fn: impl FnOnce(sys::GDExtensionUninitializedStringNamePtr),
    ) -> Self {
        let mut raw = OpaqueStringName::zeroed();
        init_fn(raw.as_mut_ptr());
        Self::from_opaque(raw)
    }

    /// Number of characters.
    pub fn len(&self) -> usize {
        GString::from(self).len()
    }

    pub fn is_empty(&self) -> bool {
        self.opaque().is_zeroed() || self.len() == 0
    }
}

impl Default for StringName {
    fn default() -> Self {
        // All-zero bytes are the engine's empty name.
        Self::from_opaque(OpaqueStringName::zeroed())
    }
}

impl Clone for StringName {
    fn clone(&self) -> Self {
        let source = self.opaque();
        let args = [source.as_ptr()];

        // SAFETY: copy constructor writes a new name into the uninitialized slot.
        unsafe {
            Self::new_with_uninit(|dst| {
                (sys::builtin_lifecycle_api().string_name_from_string_name)(dst, args.as_ptr());
            })
        }
    }
}

impl Drop for StringName {
    fn drop(&mut self) {
        self.handle.release();
    }
}

impl From<&str> for StringName {
    fn from(s: &str) -> Self {
        let bytes = s.as_bytes();

        // SAFETY: the engine copies `len` bytes of UTF-8 into the new name.
        unsafe {
            Self::new_with_uninit(|dst| {
                interface_fn!(string_name_new_with_utf8_chars_and_len)(
                    dst,
                    bytes.as_ptr() as *const c_char,
                    bytes.len() as sys::GDExtensionInt,
                );
            })
        }
    }
}

impl From<&GString> for StringName {
    fn from(string: &GString) -> Self {
        let source = string.opaque();
        let args = [source.as_ptr()];

        // SAFETY: conversion constructor writes a new name into the uninitialized slot.
        unsafe {
            Self::new_with_uninit(|dst| {
                (sys::builtin_lifecycle_api().string_name_from_string)(dst, args.as_ptr());
            })
        }
    }
}

impl fmt::Display for StringName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&GString::from(self), f)
    }
}

impl fmt::Debug for StringName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "&{:?}", String::from(&GString::from(self)))
    }
}

impl PartialEq for StringName {
    fn eq(&self, other: &Self) -> bool {
        GString::from(self) == GString::from(other)
    }
}

impl Eq for StringName {}

impl PartialEq<&str> for StringName {
    fn eq(&self, other: &&str) -> bool {
        GString::from(self) == *other
    }
}
