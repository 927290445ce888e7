/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Small helpers around raw pointers, C strings and compile-time checks.

use std::ffi::c_char;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Macros

/// Verifies a condition at compile time.
#[macro_export]
macro_rules! static_assert {
    ($cond:expr) => {
        const _: () = assert!($cond);
    };
    ($cond:expr, $msg:literal) => {
        const _: () = assert!($cond, $msg);
    };
}

/// Debug trace output, enabled with the `debug-log` feature.
#[cfg(feature = "debug-log")]
#[macro_export]
macro_rules! out {
    ()                          => (eprintln!());
    ($fmt:literal)              => (eprintln!($fmt));
    ($fmt:literal, $($arg:tt)*) => (eprintln!($fmt, $($arg)*));
}

/// Debug trace output, enabled with the `debug-log` feature.
#[cfg(not(feature = "debug-log"))]
#[macro_export]
macro_rules! out {
    ()                          => ({});
    ($fmt:literal)              => ({ if false { eprintln!($fmt); } });
    ($fmt:literal, $($arg:tt)*) => ({ if false { eprintln!($fmt, $($arg)*); } });
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Utility functions

/// Returns a C `const char*` for a null-terminated byte string.
#[inline]
pub fn c_str(s: &[u8]) -> *const c_char {
    debug_assert!(!s.is_empty() && s[s.len() - 1] == 0);

    s.as_ptr() as *const c_char
}

/// Explicitly cast away `const` from a pointer, similar to C++ `const_cast`.
pub fn force_mut_ptr<T>(ptr: *const T) -> *mut T {
    ptr as *mut T
}

/// If `ptr` is not null, returns `Some(mapper(ptr))`; otherwise `None`.
#[inline]
pub fn ptr_then<T, R, F>(ptr: *mut T, mapper: F) -> Option<R>
where
    F: FnOnce(*mut T) -> R,
{
    if ptr.is_null() {
        None
    } else {
        Some(mapper(ptr))
    }
}

/// Null-terminated copy of `s`, with interior null bytes replaced.
///
/// Used for messages forwarded to the engine's print functions.
pub fn to_c_string(s: &str) -> std::ffi::CString {
    match std::ffi::CString::new(s) {
        Ok(c) => c,
        Err(_) => {
            let sanitized = s.replace('\0', "\\0");
            std::ffi::CString::new(sanitized).unwrap_or_default()
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ptr_then_maps_non_null() {
        let mut value = 5;
        let some = ptr_then(&mut value as *mut i32, |p| unsafe { *p * 2 });
        assert_eq!(some, Some(10));

        let none = ptr_then(std::ptr::null_mut::<i32>(), |_| 1);
        assert_eq!(none, None);
    }

    #[test]
    fn c_string_sanitizes_interior_nul() {
        let c = to_c_string("ab\0cd");
        assert_eq!(c.to_str(), Ok("ab\\0cd"));

        let plain = to_c_string("message");
        assert_eq!(plain.as_bytes(), b"message");
    }
}
