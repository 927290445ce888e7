/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::HashMap;
use std::ffi::c_char;

use crate as sys;
use crate::opaque::OpaqueStringName;

type StringNameNew = unsafe extern "C" fn(
    sys::GDExtensionUninitializedStringNamePtr,
    *const c_char,
    sys::GDExtensionInt,
);
type StringNameDestroy = unsafe extern "C" fn(sys::GDExtensionTypePtr);

/// Interns class and method names as engine `StringName`s.
///
/// Pointers handed out stay valid until [`clear()`](Self::clear) or drop, since every entry is boxed.
pub struct StringCache {
    instances_by_str: HashMap<&'static str, Box<OpaqueStringName>>,
    string_name_new: StringNameNew,
    string_name_destroy: StringNameDestroy,
}

impl StringCache {
    pub fn new(string_name_new: StringNameNew, string_name_destroy: StringNameDestroy) -> Self {
        Self {
            instances_by_str: HashMap::new(),
            string_name_new,
            string_name_destroy,
        }
    }

    /// Pointer to the `StringName` for `key`, constructing it on first use.
    pub fn fetch(&mut self, key: &'static str) -> sys::GDExtensionConstStringNamePtr {
        assert!(key.is_ascii(), "string is not ASCII: {key}");

        if let Some(existing) = self.instances_by_str.get(key) {
            return existing.as_ptr();
        }

        let mut opaque = Box::new(OpaqueStringName::zeroed());

        // SAFETY: the slot is properly sized; the engine initializes it.
        unsafe {
            (self.string_name_new)(
                opaque.as_mut_ptr(),
                key.as_ptr() as *const c_char,
                key.len() as sys::GDExtensionInt,
            );
        }

        let ptr = opaque.as_ptr();
        self.instances_by_str.insert(key, opaque);
        ptr
    }

    pub fn len(&self) -> usize {
        self.instances_by_str.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances_by_str.is_empty()
    }

    /// Destroys all cached names. Previously returned pointers become dangling.
    pub fn clear(&mut self) {
        for (_, mut opaque) in self.instances_by_str.drain() {
            // SAFETY: constructed by the engine in `fetch()`, destroyed exactly once here.
            unsafe { (self.string_name_destroy)(opaque.as_mut_ptr()) };
        }
    }
}

impl Drop for StringCache {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static CREATED: AtomicUsize = AtomicUsize::new(0);
    static DESTROYED: AtomicUsize = AtomicUsize::new(0);

    unsafe extern "C" fn fake_new(
        dest: sys::GDExtensionUninitializedStringNamePtr,
        _contents: *const c_char,
        len: sys::GDExtensionInt,
    ) {
        CREATED.fetch_add(1, Ordering::SeqCst);
        *(dest as *mut u64) = len as u64 + 1;
    }

    unsafe extern "C" fn fake_destroy(ptr: sys::GDExtensionTypePtr) {
        assert_ne!(*(ptr as *const u64), 0);
        DESTROYED.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn names_are_interned_and_destroyed() {
        let mut cache = StringCache::new(fake_new, fake_destroy);

        let node = cache.fetch("Node");
        let node_again = cache.fetch("Node");
        let object = cache.fetch("Object");

        assert_eq!(node, node_again);
        assert_ne!(node, object);
        assert_eq!(cache.len(), 2);
        assert_eq!(CREATED.load(Ordering::SeqCst), 2);
        assert_eq!(unsafe { *(node as *const u64) }, 5);

        drop(cache);
        assert_eq!(DESTROYED.load(Ordering::SeqCst), 2);
    }
}
