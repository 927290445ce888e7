/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Lazily populated table of builtin-type methods (`Array::size`, `Dictionary::keys`, ...).
//!
//! Builtin methods are plain function pointers taking the receiver as first argument. Like class methods, they are
//! keyed by name and signature hash.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate as sys;
use crate::VariantType;

/// Non-null builtin method pointer.
pub type BuiltinMethodBind = unsafe extern "C" fn(
    p_base: sys::GDExtensionTypePtr,
    p_args: *const sys::GDExtensionConstTypePtr,
    r_return: sys::GDExtensionTypePtr,
    p_argument_count: i32,
);

/// Static identity of a method on a builtin type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BuiltinMethodKey {
    pub variant_type: VariantType,
    pub method_name: &'static str,
    pub hash: i64,
}

impl BuiltinMethodKey {
    pub const fn new(variant_type: VariantType, method_name: &'static str, hash: i64) -> Self {
        Self {
            variant_type,
            method_name,
            hash,
        }
    }
}

impl fmt::Display for BuiltinMethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{} (hash {})", self.variant_type, self.method_name, self.hash)
    }
}

/// The engine has no builtin method for a key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltinMethodError {
    pub key: BuiltinMethodKey,
}

impl fmt::Display for BuiltinMethodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to load builtin method {}.\n\
            Make sure the engine provides this method with the same signature.",
            self.key
        )
    }
}

impl std::error::Error for BuiltinMethodError {}

/// Cache of resolved builtin methods. Shares the locking and caching rules of [`MethodTable`](crate::MethodTable).
#[derive(Default)]
pub struct BuiltinMethodTable {
    methods: Mutex<HashMap<BuiltinMethodKey, BuiltinMethodBind>>,
    engine_lookups: AtomicUsize,
}

impl BuiltinMethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached method for `key`, or resolves it through `resolve`. Failures are not cached.
    pub fn get_or_resolve<F>(
        &self,
        key: &BuiltinMethodKey,
        resolve: F,
    ) -> Result<BuiltinMethodBind, BuiltinMethodError>
    where
        F: FnOnce(&BuiltinMethodKey) -> sys::GDExtensionPtrBuiltInMethod,
    {
        if let Some(method) = self.lock().get(key) {
            return Ok(*method);
        }

        self.engine_lookups.fetch_add(1, Ordering::Relaxed);
        let method = resolve(key).ok_or(BuiltinMethodError { key: *key })?;

        crate::out!("resolved builtin method {key}");
        self.lock().insert(*key, method);
        Ok(method)
    }

    pub fn contains(&self, key: &BuiltinMethodKey) -> bool {
        self.lock().contains_key(key)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of cached methods and engine lookups so far.
    pub fn stats(&self) -> (usize, usize) {
        (self.lock().len(), self.engine_lookups.load(Ordering::Relaxed))
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<BuiltinMethodKey, BuiltinMethodBind>> {
        self.methods.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    const ARRAY_SIZE: BuiltinMethodKey = BuiltinMethodKey::new(VariantType::Array, "size", 3173160232);

    unsafe extern "C" fn fake_size(
        _base: sys::GDExtensionTypePtr,
        _args: *const sys::GDExtensionConstTypePtr,
        ret: sys::GDExtensionTypePtr,
        _argc: i32,
    ) {
        *(ret as *mut i64) = 3;
    }

    #[test]
    fn resolves_once_then_caches() {
        let table = BuiltinMethodTable::new();
        let mut calls = 0;

        for _ in 0..2 {
            let method = table
                .get_or_resolve(&ARRAY_SIZE, |_| {
                    calls += 1;
                    Some(fake_size)
                })
                .expect("method resolves");

            let mut len = 0i64;
            unsafe {
                method(
                    std::ptr::null_mut(),
                    std::ptr::null(),
                    &mut len as *mut i64 as sys::GDExtensionTypePtr,
                    0,
                )
            };
            assert_eq!(len, 3);
        }

        assert_eq!(calls, 1);
        assert_eq!(table.stats(), (1, 1));
        assert!(table.contains(&ARRAY_SIZE));

        table.clear();
        assert!(!table.contains(&ARRAY_SIZE));
    }

    #[test]
    fn missing_method_is_error_and_not_cached() {
        let table = BuiltinMethodTable::new();

        let err = table
            .get_or_resolve(&ARRAY_SIZE, |_| None)
            .expect_err("no such method");
        assert!(err.to_string().contains("Array::size (hash 3173160232)"));

        let _ = table.get_or_resolve(&ARRAY_SIZE, |_| None);
        assert_eq!(table.stats(), (0, 2));
    }
}
