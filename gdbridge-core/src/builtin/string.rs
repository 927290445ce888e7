/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ffi::c_char;
use std::fmt;

use crate::builtin::StringName;
use crate::ownership::{Handle, Pointer};
use crate::sys;
use sys::{interface_fn, OpaqueString};

/// Registry kind for engine `String` values.
pub enum StringHandle {}

// SAFETY: every owned string is destroyed exactly once, by the registry.
unsafe impl Handle for StringHandle {
    type Raw = OpaqueString;
    const KIND: &'static str = "String";

    unsafe fn release(mut raw: OpaqueString) {
        // After the engine unloaded, its allocations are gone as well.
        if sys::is_initialized() {
            (sys::builtin_lifecycle_api().string_destroy)(raw.as_mut_ptr());
        }
    }
}

/// Engine's reference-counted string type.
///
/// The engine owns the character data. Rust holds a registered handle, which is destroyed when the `GString` is
/// dropped, or at the latest when the extension unloads.
pub struct GString {
    handle: Pointer<StringHandle>,
}

impl GString {
    /// Empty string. Does not call into the engine.
    pub fn new() -> Self {
        // All-zero bytes are the engine's empty string.
        Self::from_opaque(OpaqueString::zeroed())
    }

    /// Adopts an engine string, taking over the responsibility to destroy it.
    pub(crate) fn from_opaque(opaque: OpaqueString) -> Self {
        Self {
            handle: Pointer::new(opaque),
        }
    }

    /// Bit copy of the engine representation, valid as long as `self`.
    pub(crate) fn opaque(&self) -> OpaqueString {
        self.handle.get()
    }

    /// Constructs a string in place through `init_fn`.
    ///
    /// # Safety
    /// `init_fn` must initialize the string behind the pointer.
    pub(crate) unsafe fn new_with_uninit(init_fn: impl FnOnce(sys::GDExtensionUninitializedStringPtr)) -> Self {
        let mut raw = OpaqueString::zeroed();
        init_fn(raw.as_mut_ptr());
        Self::from_opaque(raw)
    }

    /// Number of characters (Unicode scalar values).
    pub fn len(&self) -> usize {
        self.to_rust_string().chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.opaque().is_zeroed() || self.len() == 0
    }

    fn to_rust_string(&self) -> String {
        let opaque = self.opaque();
        if opaque.is_zeroed() {
            return String::new();
        }

        // SAFETY: `opaque` is a live string for the duration of both calls.
        unsafe {
            let string_to_utf8_chars = interface_fn!(string_to_utf8_chars);

            let len = string_to_utf8_chars(opaque.as_ptr(), std::ptr::null_mut(), 0);
            let mut buf = vec![0u8; len.max(0) as usize];
            string_to_utf8_chars(opaque.as_ptr(), buf.as_mut_ptr() as *mut c_char, len);

            String::from_utf8(buf)
                .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

impl Default for GString {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for GString {
    fn clone(&self) -> Self {
        let source = self.opaque();
        let args = [source.as_ptr()];

        // SAFETY: copy constructor writes a new string into the uninitialized slot.
        unsafe {
            Self::new_with_uninit(|dst| {
                (sys::builtin_lifecycle_api().string_from_string)(dst, args.as_ptr());
            })
        }
    }
}

impl Drop for GString {
    fn drop(&mut self) {
        self.handle.release();
    }
}

impl From<&str> for GString {
    fn from(s: &str) -> Self {
        let bytes = s.as_bytes();

        // SAFETY: the engine copies `len` bytes of UTF-8 into the new string.
        unsafe {
            Self::new_with_uninit(|dst| {
                interface_fn!(string_new_with_utf8_chars_and_len)(
                    dst,
                    bytes.as_ptr() as *const c_char,
                    bytes.len() as sys::GDExtensionInt,
                );
            })
        }
    }
}

impl From<String> for GString {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<&String> for GString {
    fn from(s: &String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<&StringName> for GString {
    fn from(name: &StringName) -> Self {
        let source = name.opaque();
        let args = [source.as_ptr()];

        // SAFETY: conversion constructor writes a new string into the uninitialized slot.
        unsafe {
            Self::new_with_uninit(|dst| {
                (sys::builtin_lifecycle_api().string_from_string_name)(dst, args.as_ptr());
            })
        }
    }
}

impl From<&GString> for String {
    fn from(string: &GString) -> Self {
        string.to_rust_string()
    }
}

impl fmt::Display for GString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rust_string())
    }
}

impl fmt::Debug for GString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GString({:?})", self.to_rust_string())
    }
}

impl PartialEq for GString {
    fn eq(&self, other: &Self) -> bool {
        self.to_rust_string() == other.to_rust_string()
    }
}

impl Eq for GString {}

impl PartialEq<&str> for GString {
    fn eq(&self, other: &&str) -> bool {
        self.to_rust_string() == *other
    }
}
