/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! `String` and `StringName` storage.
//!
//! Both use the same 8-byte representation: a pointer to a heap `String`, where null means empty.

use std::ffi::c_char;
use std::ptr;
use std::sync::atomic::{AtomicIsize, Ordering};

use gdbridge_ffi as sys;

static LIVE_STRINGS: AtomicIsize = AtomicIsize::new(0);

pub fn live_strings() -> isize {
    LIVE_STRINGS.load(Ordering::SeqCst)
}

pub(crate) type StringRepr = *mut String;

pub(crate) fn alloc(s: String) -> StringRepr {
    if s.is_empty() {
        return ptr::null_mut();
    }

    LIVE_STRINGS.fetch_add(1, Ordering::SeqCst);
    Box::into_raw(Box::new(s))
}

pub(crate) unsafe fn free(repr: StringRepr) {
    if !repr.is_null() {
        LIVE_STRINGS.fetch_sub(1, Ordering::SeqCst);
        drop(Box::from_raw(repr));
    }
}

/// Reads the string stored in an 8-byte slot.
pub(crate) unsafe fn read(slot: *const std::ffi::c_void) -> String {
    let repr = *(slot as *const StringRepr);
    if repr.is_null() {
        String::new()
    } else {
        (*repr).clone()
    }
}

/// Writes a new string into an uninitialized 8-byte slot.
pub(crate) unsafe fn write(slot: *mut std::ffi::c_void, s: String) {
    *(slot as *mut StringRepr) = alloc(s);
}

/// Replaces the string in an initialized slot, releasing the previous one.
pub(crate) unsafe fn assign(slot: *mut std::ffi::c_void, s: String) {
    free(*(slot as *mut StringRepr));
    write(slot, s);
}

unsafe fn from_utf8_raw(contents: *const c_char, len: sys::GDExtensionInt) -> String {
    if contents.is_null() || len <= 0 {
        return String::new();
    }

    let bytes = std::slice::from_raw_parts(contents as *const u8, len as usize);
    String::from_utf8_lossy(bytes).into_owned()
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Interface functions

pub(crate) unsafe extern "C" fn string_new_with_utf8_chars_and_len(
    dest: sys::GDExtensionUninitializedStringPtr,
    contents: *const c_char,
    len: sys::GDExtensionInt,
) {
    write(dest, from_utf8_raw(contents, len));
}

pub(crate) unsafe extern "C" fn string_name_new_with_utf8_chars_and_len(
    dest: sys::GDExtensionUninitializedStringNamePtr,
    contents: *const c_char,
    len: sys::GDExtensionInt,
) {
    write(dest, from_utf8_raw(contents, len));
}

pub(crate) unsafe extern "C" fn string_to_utf8_chars(
    this: sys::GDExtensionConstStringPtr,
    text: *mut c_char,
    max_write_length: sys::GDExtensionInt,
) -> sys::GDExtensionInt {
    let s = read(this);
    let len = s.len();

    if !text.is_null() {
        let n = len.min(max_write_length.max(0) as usize);
        ptr::copy_nonoverlapping(s.as_ptr(), text as *mut u8, n);
    }

    len as sys::GDExtensionInt
}

// Pointer constructors: #0 default, #1 copy, #2 conversion from the other string type.
// Both types share the representation, so copy and conversion are the same operation.

unsafe extern "C" fn construct_default(
    base: sys::GDExtensionUninitializedTypePtr,
    _args: *const sys::GDExtensionConstTypePtr,
) {
    write(base, String::new());
}

unsafe extern "C" fn construct_copy(
    base: sys::GDExtensionUninitializedTypePtr,
    args: *const sys::GDExtensionConstTypePtr,
) {
    write(base, read(*args));
}

pub(crate) unsafe extern "C" fn destroy(base: sys::GDExtensionTypePtr) {
    free(*(base as *mut StringRepr));
    *(base as *mut StringRepr) = ptr::null_mut();
}

pub(crate) fn constructor(index: i32) -> sys::GDExtensionPtrConstructor {
    match index {
        0 => Some(construct_default),
        1 | 2 => Some(construct_copy),
        _ => None,
    }
}
