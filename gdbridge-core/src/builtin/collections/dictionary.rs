/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::builtin::{Array, ToVariant, Variant, VariantType};
use crate::meta::{AsArg, FromPtrcall, Signature};
use crate::ownership::{Handle, Pointer};
use crate::sys;
use sys::{interface_fn, BuiltinMethodKey, CallFrame, OpaqueDictionary};

/// Registry kind for engine `Dictionary` values.
pub enum DictionaryHandle {}

// SAFETY: every owned dictionary reference is destroyed exactly once, by the registry.
unsafe impl Handle for DictionaryHandle {
    type Raw = OpaqueDictionary;
    const KIND: &'static str = "Dictionary";

    unsafe fn release(mut raw: OpaqueDictionary) {
        if sys::is_initialized() && !raw.is_zeroed() {
            (sys::builtin_lifecycle_api().dictionary_destroy)(raw.as_mut_ptr());
        }
    }
}

mod method_keys {
    use super::*;

    const fn key(name: &'static str, hash: i64) -> BuiltinMethodKey {
        BuiltinMethodKey::new(VariantType::Dictionary, name, hash)
    }

    pub const SIZE: BuiltinMethodKey = key("size", 3173160232);
    pub const IS_EMPTY: BuiltinMethodKey = key("is_empty", 3918633141);
    pub const CLEAR: BuiltinMethodKey = key("clear", 3218959716);
    pub const HAS: BuiltinMethodKey = key("has", 3680194679);
    pub const GET: BuiltinMethodKey = key("get", 2205440559);
    pub const ERASE: BuiltinMethodKey = key("erase", 1776646889);
    pub const KEYS: BuiltinMethodKey = key("keys", 4144163970);
    pub const VALUES: BuiltinMethodKey = key("values", 4144163970);
    pub const IS_READ_ONLY: BuiltinMethodKey = key("is_read_only", 3918633141);
    pub const MAKE_READ_ONLY: BuiltinMethodKey = key("make_read_only", 3218959716);
}

/// Engine dictionary, mapping variant keys to variant values in insertion order.
///
/// Like [`Array`], the storage is engine-side and shared between clones. Each `Dictionary` value holds one registered
/// reference.
pub struct Dictionary {
    handle: Pointer<DictionaryHandle>,
}

impl Dictionary {
    /// Constructs an empty dictionary.
    pub fn new() -> Self {
        let mut raw = OpaqueDictionary::zeroed();

        // SAFETY: the default constructor initializes the slot and takes no arguments.
        unsafe {
            (sys::builtin_lifecycle_api().dictionary_construct_default)(raw.as_mut_ptr(), std::ptr::null())
        };
        Self::from_opaque(raw)
    }

    pub(crate) fn from_opaque(opaque: OpaqueDictionary) -> Self {
        Self {
            handle: Pointer::new(opaque),
        }
    }

    pub(crate) fn opaque(&self) -> OpaqueDictionary {
        self.handle.get()
    }

    pub fn len(&self) -> usize {
        let len: i64 = self.call(&method_keys::SIZE, CallFrame::new());
        len.max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.call(&method_keys::IS_EMPTY, CallFrame::new())
    }

    pub fn contains_key(&self, key: impl ToVariant) -> bool {
        let key = key.to_variant();

        let mut frame = CallFrame::new();
        key.push_arg(&mut frame);
        self.call(&method_keys::HAS, frame)
    }

    /// Value stored under `key`, or `None` if there is none. A stored nil is `Some(Variant::nil())`.
    pub fn get(&self, key: impl ToVariant) -> Option<Variant> {
        let key = key.to_variant();
        if !self.contains_key(&key) {
            return None;
        }

        Some(self.get_or_nil(&key))
    }

    /// Value stored under `key`, or nil.
    pub fn get_or_nil(&self, key: impl ToVariant) -> Variant {
        let key = key.to_variant();
        let default = Variant::nil();

        let mut frame = CallFrame::new();
        key.push_arg(&mut frame);
        default.push_arg(&mut frame);
        self.call(&method_keys::GET, frame)
    }

    /// Stores `value` under `key`, replacing a previous value.
    pub fn set(&mut self, key: impl ToVariant, value: impl ToVariant) {
        let key = key.to_variant();
        let value = value.to_variant();
        let mut opaque = self.opaque();

        // SAFETY: `opaque` is a live dictionary. The engine inserts a nil value for new keys and returns a pointer to
        // the value slot, or null if it refuses the write (read-only).
        unsafe {
            let slot = interface_fn!(dictionary_operator_index)(opaque.as_mut_ptr(), key.opaque().as_ptr());
            if !slot.is_null() {
                interface_fn!(variant_destroy)(slot);
                interface_fn!(variant_new_copy)(slot, value.opaque().as_ptr());
            }
        }
    }

    /// Removes `key`, returning its value if it was present.
    pub fn remove(&mut self, key: impl ToVariant) -> Option<Variant> {
        let key = key.to_variant();
        let old = self.get(&key)?;

        let mut frame = CallFrame::new();
        key.push_arg(&mut frame);
        let erased: bool = self.call(&method_keys::ERASE, frame);

        erased.then_some(old)
    }

    pub fn clear(&mut self) {
        self.call::<()>(&method_keys::CLEAR, CallFrame::new());
    }

    /// New array with all keys, in insertion order.
    pub fn keys_array(&self) -> Array {
        self.call(&method_keys::KEYS, CallFrame::new())
    }

    /// New array with all values, in insertion order.
    pub fn values_array(&self) -> Array {
        self.call(&method_keys::VALUES, CallFrame::new())
    }

    pub fn is_read_only(&self) -> bool {
        self.call(&method_keys::IS_READ_ONLY, CallFrame::new())
    }

    /// Makes the dictionary read-only, for all references sharing it. Cannot be undone.
    pub fn make_read_only(&mut self) {
        self.call::<()>(&method_keys::MAKE_READ_ONLY, CallFrame::new());
    }

    /// Copies of all key-value pairs, in insertion order.
    pub fn iter_shared(&self) -> impl Iterator<Item = (Variant, Variant)> + '_ {
        let keys: Vec<Variant> = self.keys_array().iter_shared().collect();

        keys.into_iter().map(move |key| {
            let value = self.get_or_nil(&key);
            (key, value)
        })
    }

    fn call<R: FromPtrcall>(&self, key: &BuiltinMethodKey, frame: CallFrame) -> R {
        let mut opaque = self.opaque();

        // SAFETY: `opaque` is a live dictionary; the keys above declare each method's signature.
        unsafe { Signature::out_builtin_ptrcall(key, opaque.as_mut_ptr(), frame) }
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Dictionary {
    /// Another reference to the same dictionary.
    fn clone(&self) -> Self {
        let source = self.opaque();
        let args = [source.as_ptr()];

        let mut raw = OpaqueDictionary::zeroed();
        // SAFETY: the copy constructor takes one dictionary argument and initializes the slot.
        unsafe {
            (sys::builtin_lifecycle_api().dictionary_construct_copy)(raw.as_mut_ptr(), args.as_ptr())
        };
        Self::from_opaque(raw)
    }
}

impl Drop for Dictionary {
    fn drop(&mut self) {
        self.handle.release();
    }
}

impl<K: ToVariant, V: ToVariant> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Dictionary::new();
        for (key, value) in iter {
            dict.set(key, value);
        }
        dict
    }
}

impl fmt::Display for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_variant(), f)
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter_shared()).finish()
    }
}
