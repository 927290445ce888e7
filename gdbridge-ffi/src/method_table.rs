/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Lazily populated table of class method-binds.
//!
//! A method-bind is identified by declaring class, method name and the hash the engine publishes for the method's
//! signature in `extension_api.json`. A changed signature gets a new hash, so a stale key fails to resolve instead of
//! calling a function with the wrong layout.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate as sys;

/// Static identity of an engine class method.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodKey {
    pub class_name: &'static str,
    pub method_name: &'static str,
    pub hash: i64,
}

impl MethodKey {
    pub const fn new(class_name: &'static str, method_name: &'static str, hash: i64) -> Self {
        Self {
            class_name,
            method_name,
            hash,
        }
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{} (hash {})", self.class_name, self.method_name, self.hash)
    }
}

/// Resolved method-bind pointer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ClassMethodBind(pub sys::GDExtensionMethodBindPtr);

// SAFETY: method-binds are immutable engine-side descriptors; the pointer itself may be shared between threads.
// Calling through it is subject to the usual threading rules of the engine.
unsafe impl Send for ClassMethodBind {}
// SAFETY: see `Send`.
unsafe impl Sync for ClassMethodBind {}

/// The engine has no method-bind for a key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodBindError {
    pub key: MethodKey,
}

impl fmt::Display for MethodBindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let MethodKey {
            class_name,
            method_name,
            hash,
        } = self.key;

        write!(
            f,
            "failed to load class method {class_name}::{method_name} (hash {hash}).\n\
            Make sure the engine provides this method with the same signature; \
            a hash mismatch means the bindings target a different engine API version."
        )
    }
}

impl std::error::Error for MethodBindError {}

/// Counters for diagnostics.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MethodTableStats {
    /// Binds currently cached.
    pub cached: usize,

    /// Calls to `classdb_get_method_bind` since startup, successful or not.
    pub engine_lookups: usize,
}

/// Cache of resolved method-binds.
///
/// The engine is never called while the internal lock is held.
#[derive(Default)]
pub struct MethodTable {
    binds: Mutex<HashMap<MethodKey, ClassMethodBind>>,
    engine_lookups: AtomicUsize,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached bind for `key`, or resolves it through `resolve`.
    ///
    /// `resolve` returns a null pointer if the engine does not know the method. Failed lookups are not cached, so a
    /// later call asks the engine again.
    pub fn get_or_resolve<F>(
        &self,
        key: &MethodKey,
        resolve: F,
    ) -> Result<ClassMethodBind, MethodBindError>
    where
        F: FnOnce(&MethodKey) -> sys::GDExtensionMethodBindPtr,
    {
        if let Some(bind) = self.lock().get(key) {
            return Ok(*bind);
        }

        self.engine_lookups.fetch_add(1, Ordering::Relaxed);
        let ptr = resolve(key);
        if ptr.is_null() {
            return Err(MethodBindError { key: *key });
        }

        crate::out!("resolved method-bind {key} -> {ptr:?}");

        let bind = ClassMethodBind(ptr);
        self.lock().insert(*key, bind);
        Ok(bind)
    }

    /// Resolves all `keys`, returning every one the engine does not provide.
    pub fn preload<F>(&self, keys: &[MethodKey], mut resolve: F) -> Vec<MethodBindError>
    where
        F: FnMut(&MethodKey) -> sys::GDExtensionMethodBindPtr,
    {
        keys.iter()
            .filter_map(|key| self.get_or_resolve(key, &mut resolve).err())
            .collect()
    }

    pub fn contains(&self, key: &MethodKey) -> bool {
        self.lock().contains_key(key)
    }

    /// Forgets all binds. Needed when the engine unloads, since binds do not survive it.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn stats(&self) -> MethodTableStats {
        MethodTableStats {
            cached: self.lock().len(),
            engine_lookups: self.engine_lookups.load(Ordering::Relaxed),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<MethodKey, ClassMethodBind>> {
        self.binds.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::c_void;

    const GET_CLASS: MethodKey = MethodKey::new("Object", "get_class", 201670096);
    const MISSING: MethodKey = MethodKey::new("Object", "does_not_exist", 1);

    fn fake_ptr(value: usize) -> sys::GDExtensionMethodBindPtr {
        value as *const c_void
    }

    #[test]
    fn resolves_once_then_caches() {
        let table = MethodTable::new();
        let mut calls = 0;

        for _ in 0..3 {
            let bind = table
                .get_or_resolve(&GET_CLASS, |_| {
                    calls += 1;
                    fake_ptr(0x1000)
                })
                .expect("bind resolves");
            assert_eq!(bind, ClassMethodBind(fake_ptr(0x1000)));
        }

        assert_eq!(calls, 1);
        assert_eq!(
            table.stats(),
            MethodTableStats {
                cached: 1,
                engine_lookups: 1
            }
        );
    }

    #[test]
    fn null_bind_is_error_and_not_cached() {
        let table = MethodTable::new();

        let err = table
            .get_or_resolve(&MISSING, |_| std::ptr::null())
            .expect_err("null bind");
        assert_eq!(err.key, MISSING);
        assert!(err.to_string().contains("Object::does_not_exist (hash 1)"));
        assert!(!table.contains(&MISSING));

        // A later lookup asks the engine again.
        let _ = table.get_or_resolve(&MISSING, |_| std::ptr::null());
        assert_eq!(table.stats().engine_lookups, 2);
    }

    #[test]
    fn preload_reports_all_missing() {
        let table = MethodTable::new();
        let other_missing = MethodKey::new("Node", "nope", 2);

        let missing = table.preload(&[GET_CLASS, MISSING, other_missing], |key| {
            if key.method_name == "get_class" {
                fake_ptr(0x2000)
            } else {
                std::ptr::null()
            }
        });

        let missing_keys: Vec<_> = missing.iter().map(|e| e.key).collect();
        assert_eq!(missing_keys, [MISSING, other_missing]);
        assert!(table.contains(&GET_CLASS));

        table.clear();
        assert_eq!(table.stats().cached, 0);
    }

    #[test]
    fn display_names_class_method_and_hash() {
        assert_eq!(
            GET_CLASS.to_string(),
            "Object::get_class (hash 201670096)"
        );
    }
}
