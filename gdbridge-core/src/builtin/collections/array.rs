/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::builtin::{ToVariant, Variant, VariantType};
use crate::global::Error;
use crate::meta::{AsArg, FromPtrcall, Signature};
use crate::ownership::{Handle, Pointer};
use crate::sys;
use sys::{interface_fn, BuiltinMethodKey, CallFrame, OpaqueArray};

/// Registry kind for engine `Array` values.
pub enum ArrayHandle {}

// SAFETY: every owned array reference is destroyed exactly once, by the registry.
unsafe impl Handle for ArrayHandle {
    type Raw = OpaqueArray;
    const KIND: &'static str = "Array";

    unsafe fn release(mut raw: OpaqueArray) {
        if sys::is_initialized() && !raw.is_zeroed() {
            (sys::builtin_lifecycle_api().array_destroy)(raw.as_mut_ptr());
        }
    }
}

mod method_keys {
    use super::*;

    const fn key(name: &'static str, hash: i64) -> BuiltinMethodKey {
        BuiltinMethodKey::new(VariantType::Array, name, hash)
    }

    pub const SIZE: BuiltinMethodKey = key("size", 3173160232);
    pub const IS_EMPTY: BuiltinMethodKey = key("is_empty", 3918633141);
    pub const CLEAR: BuiltinMethodKey = key("clear", 3218959716);
    pub const RESIZE: BuiltinMethodKey = key("resize", 848867239);
    pub const PUSH_BACK: BuiltinMethodKey = key("push_back", 3316032543);
    pub const HAS: BuiltinMethodKey = key("has", 3680194679);
    pub const IS_READ_ONLY: BuiltinMethodKey = key("is_read_only", 3918633141);
    pub const MAKE_READ_ONLY: BuiltinMethodKey = key("make_read_only", 3218959716);
}

/// Engine array of variants.
///
/// The element storage is engine-side and reference-counted: clones share it, like arrays in GDScript. Each `Array`
/// value holds one registered reference, released on drop or at the latest when the extension unloads.
///
/// Mutating a read-only array is reported by the engine and has no effect.
pub struct Array {
    handle: Pointer<ArrayHandle>,
}

impl Array {
    /// Constructs an empty array.
    pub fn new() -> Self {
        let mut raw = OpaqueArray::zeroed();

        // SAFETY: the default constructor initializes the slot and takes no arguments.
        unsafe { (sys::builtin_lifecycle_api().array_construct_default)(raw.as_mut_ptr(), std::ptr::null()) };
        Self::from_opaque(raw)
    }

    pub(crate) fn from_opaque(opaque: OpaqueArray) -> Self {
        Self {
            handle: Pointer::new(opaque),
        }
    }

    pub(crate) fn opaque(&self) -> OpaqueArray {
        self.handle.get()
    }

    pub fn len(&self) -> usize {
        let len: i64 = self.call(&method_keys::SIZE, CallFrame::new());
        len.max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.call(&method_keys::IS_EMPTY, CallFrame::new())
    }

    /// Element at `index`, or `None` if out of bounds.
    pub fn get(&self, index: usize) -> Option<Variant> {
        let ptr = self.element_ptr(index)?;

        // SAFETY: `ptr` points to a live element variant; the copy takes its own share.
        let copy = unsafe {
            let mut opaque = sys::OpaqueVariant::zeroed();
            interface_fn!(variant_new_copy)(opaque.as_mut_ptr(), ptr);
            opaque
        };
        Some(Variant::from_opaque(copy))
    }

    /// ⚠️ Element at `index`.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    #[track_caller]
    pub fn at(&self, index: usize) -> Variant {
        self.get(index).unwrap_or_else(|| self.panic_out_of_bounds(index))
    }

    /// ⚠️ Replaces the element at `index`.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    #[track_caller]
    pub fn set(&mut self, index: usize, value: impl ToVariant) {
        if index >= self.len() {
            self.panic_out_of_bounds(index);
        }

        let value = value.to_variant();

        let mut opaque = self.opaque();
        // SAFETY: `opaque` is a live array and `index` is in bounds.
        let ptr = unsafe { interface_fn!(array_operator_index)(opaque.as_mut_ptr(), index as sys::GDExtensionInt) };

        // Null if the engine refuses the write, e.g. for read-only arrays.
        if !ptr.is_null() {
            // SAFETY: `ptr` is a live element; it is destroyed before the copy is written in its place.
            unsafe {
                interface_fn!(variant_destroy)(ptr);
                interface_fn!(variant_new_copy)(ptr, value.opaque().as_ptr());
            }
        }
    }

    /// Appends `value` at the end.
    pub fn push(&mut self, value: impl ToVariant) {
        let value = value.to_variant();

        let mut frame = CallFrame::new();
        value.push_arg(&mut frame);
        self.call::<()>(&method_keys::PUSH_BACK, frame);
    }

    /// Whether an element equal to `value` exists.
    pub fn contains(&self, value: impl ToVariant) -> bool {
        let value = value.to_variant();

        let mut frame = CallFrame::new();
        value.push_arg(&mut frame);
        self.call(&method_keys::HAS, frame)
    }

    /// Grows (with nil elements) or shrinks the array to `new_size`.
    pub fn resize(&mut self, new_size: usize) -> Result<(), Error> {
        let mut frame = CallFrame::new();
        frame.push_arg(&(new_size as i64));
        self.call::<Error>(&method_keys::RESIZE, frame).to_result()
    }

    pub fn clear(&mut self) {
        self.call::<()>(&method_keys::CLEAR, CallFrame::new());
    }

    pub fn is_read_only(&self) -> bool {
        self.call(&method_keys::IS_READ_ONLY, CallFrame::new())
    }

    /// Makes the array read-only, for all references sharing it. Cannot be undone.
    pub fn make_read_only(&mut self) {
        self.call::<()>(&method_keys::MAKE_READ_ONLY, CallFrame::new());
    }

    /// Copies of all elements, in order.
    ///
    /// "Shared" because other references to the same array may modify it while iterating; elements are read one by
    /// one and iteration stops at the current end.
    pub fn iter_shared(&self) -> impl Iterator<Item = Variant> + '_ {
        (0..).map_while(move |index| self.get(index))
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // Internals

    fn call<R: FromPtrcall>(&self, key: &BuiltinMethodKey, frame: CallFrame) -> R {
        let mut opaque = self.opaque();

        // SAFETY: `opaque` is a live array; the keys above declare each method's signature.
        unsafe { Signature::out_builtin_ptrcall(key, opaque.as_mut_ptr(), frame) }
    }

    /// Engine pointer to the element variant for reading, or `None` if out of bounds.
    fn element_ptr(&self, index: usize) -> Option<sys::GDExtensionVariantPtr> {
        let index = sys::GDExtensionInt::try_from(index).ok()?;
        let opaque = self.opaque();

        // SAFETY: `opaque` is a live array. The engine checks bounds and returns null outside of them.
        let ptr = unsafe { interface_fn!(array_operator_index_const)(opaque.as_ptr(), index) };
        (!ptr.is_null()).then_some(ptr)
    }

    #[track_caller]
    fn panic_out_of_bounds(&self, index: usize) -> ! {
        panic!(
            "Array index {index} is out of bounds: length is {}",
            self.len()
        )
    }
}

impl Default for Array {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Array {
    /// Another reference to the same array.
    fn clone(&self) -> Self {
        let source = self.opaque();
        let args = [source.as_ptr()];

        let mut raw = OpaqueArray::zeroed();
        // SAFETY: the copy constructor takes one array argument and initializes the slot.
        unsafe { (sys::builtin_lifecycle_api().array_construct_copy)(raw.as_mut_ptr(), args.as_ptr()) };
        Self::from_opaque(raw)
    }
}

impl Drop for Array {
    fn drop(&mut self) {
        self.handle.release();
    }
}

impl<T: ToVariant> FromIterator<T> for Array {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Array::new();
        for value in iter {
            array.push(value);
        }
        array
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_variant(), f)
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter_shared()).finish()
    }
}
