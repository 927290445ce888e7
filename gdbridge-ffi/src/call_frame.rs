/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Fixed-layout argument buffer for ptrcalls.
//!
//! A ptrcall receives `const GDExtensionConstTypePtr *p_args`: an array of pointers, each pointing to one argument in
//! its native representation. The return value is written by the engine into `r_ret`. [`CallFrame`] owns the storage
//! behind all those pointers for the duration of exactly one call.

use std::ptr;

use crate as sys;
use crate::GodotFfi;

/// Maximum number of arguments a single ptrcall can carry.
pub const MAX_FRAME_ARGS: usize = 16;

/// Size of one argument slot. Large enough for the biggest builtin passed by value (`Projection`, 64 bytes).
pub const FRAME_SLOT_SIZE: usize = 64;

const FRAME_SLOT_ALIGN: usize = 16;

#[repr(C, align(16))]
#[derive(Copy, Clone)]
struct Slot([u8; FRAME_SLOT_SIZE]);

impl Slot {
    const EMPTY: Slot = Slot([0; FRAME_SLOT_SIZE]);

    /// # Safety
    /// `R` must fit the slot, see [`check_fits`].
    unsafe fn write<R: Copy>(&mut self, raw: R) {
        ptr::write(self.0.as_mut_ptr() as *mut R, raw);
    }

    /// # Safety
    /// The slot must contain a valid `R`.
    unsafe fn read<R: Copy>(&self) -> R {
        ptr::read(self.0.as_ptr() as *const R)
    }
}

const fn check_fits<R>() {
    assert!(
        std::mem::size_of::<R>() <= FRAME_SLOT_SIZE,
        "value too large for a call-frame slot"
    );
    assert!(
        std::mem::align_of::<R>() <= FRAME_SLOT_ALIGN,
        "value alignment exceeds call-frame slot alignment"
    );
}

/// Argument and return storage for one ptrcall.
///
/// Arguments are pushed in declaration order. The frame is consumed by [`invoke()`](Self::invoke), so no slot
/// outlives the call it was built for.
///
/// Pushing copies the raw representation bit-by-bit. This is a borrow: for builtins with engine-side resources
/// (strings, variants), the caller keeps ownership and must keep the original alive until the call returns.
pub struct CallFrame {
    args: [Slot; MAX_FRAME_ARGS],
    len: usize,
    ret: Slot,
}

impl CallFrame {
    pub fn new() -> Self {
        Self {
            args: [Slot::EMPTY; MAX_FRAME_ARGS],
            len: 0,
            ret: Slot::EMPTY,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copies `raw` into the next argument slot.
    ///
    /// # Panics
    /// If all [`MAX_FRAME_ARGS`] slots are taken.
    pub fn push_raw<R: Copy + 'static>(&mut self, raw: R) {
        const { check_fits::<R>() };
        assert!(
            self.len < MAX_FRAME_ARGS,
            "call-frame overflow: a ptrcall takes at most {MAX_FRAME_ARGS} arguments"
        );

        // SAFETY: size and alignment are checked at compile time above.
        unsafe { self.args[self.len].write(raw) };
        self.len += 1;
    }

    /// Encodes `arg` and pushes it. Ownership stays with the caller.
    pub fn push_arg<T: GodotFfi>(&mut self, arg: &T) {
        self.push_raw(arg.to_raw());
    }

    /// Performs the call and returns the raw content of the return slot.
    ///
    /// The return slot is initialized with `initial` before the call. `call` receives the argument pointer array and
    /// the return pointer.
    ///
    /// # Safety
    /// `call` must leave a valid `R` in the return slot (or leave `initial` untouched).
    pub unsafe fn invoke_raw<R, F>(mut self, initial: R, call: F) -> R
    where
        R: Copy + 'static,
        F: FnOnce(*const sys::GDExtensionConstTypePtr, sys::GDExtensionTypePtr),
    {
        const { check_fits::<R>() };
        self.ret.write(initial);

        let mut arg_ptrs: [sys::GDExtensionConstTypePtr; MAX_FRAME_ARGS] =
            [ptr::null(); MAX_FRAME_ARGS];
        for (ptr, slot) in arg_ptrs.iter_mut().zip(&self.args[..self.len]) {
            *ptr = slot.0.as_ptr() as sys::GDExtensionConstTypePtr;
        }

        let ret_ptr = self.ret.0.as_mut_ptr() as sys::GDExtensionTypePtr;
        call(arg_ptrs.as_ptr(), ret_ptr);

        self.ret.read::<R>()
    }

    /// Performs the call and decodes the return slot, taking ownership of the returned value.
    ///
    /// # Safety
    /// See [`invoke_raw()`](Self::invoke_raw).
    pub unsafe fn invoke<R, F>(self, call: F) -> R
    where
        R: GodotFfi,
        F: FnOnce(*const sys::GDExtensionConstTypePtr, sys::GDExtensionTypePtr),
    {
        let raw = self.invoke_raw(R::null_raw(), call);
        R::from_raw(raw)
    }
}

impl Default for CallFrame {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    unsafe fn read_arg<T: Copy>(args: *const sys::GDExtensionConstTypePtr, index: usize) -> T {
        *(*args.add(index) as *const T)
    }

    #[test]
    fn args_arrive_in_order() {
        let mut frame = CallFrame::new();
        frame.push_arg(&7i32);
        frame.push_arg(&true);
        frame.push_arg(&2.5f32);
        assert_eq!(frame.len(), 3);

        let sum: i64 = unsafe {
            frame.invoke(|args, ret| {
                let a: i64 = read_arg(args, 0);
                let b: u8 = read_arg(args, 1);
                let c: f64 = read_arg(args, 2);
                *(ret as *mut i64) = a + b as i64 + c as i64;
            })
        };

        assert_eq!(sum, 10);
    }

    #[test]
    fn untouched_return_slot_yields_null_raw() {
        let frame = CallFrame::new();
        assert!(frame.is_empty());

        let value: bool = unsafe { frame.invoke(|_, _| {}) };
        assert!(!value);
    }

    #[test]
    fn raw_slots_hold_large_values() {
        #[derive(Copy, Clone, PartialEq, Debug)]
        struct Big([u64; 8]);

        let mut frame = CallFrame::new();
        frame.push_raw(Big([3; 8]));

        let out = unsafe {
            frame.invoke_raw(Big([0; 8]), |args, ret| {
                let input: Big = read_arg(args, 0);
                let mut doubled = input;
                doubled.0.iter_mut().for_each(|v| *v *= 2);
                *(ret as *mut Big) = doubled;
            })
        };

        assert_eq!(out, Big([6; 8]));
    }

    #[test]
    fn slot_pointers_are_aligned() {
        let mut frame = CallFrame::new();
        frame.push_arg(&1i64);
        frame.push_arg(&2i64);

        unsafe {
            frame.invoke_raw((), |args, ret| {
                for i in 0..2 {
                    assert_eq!(*args.add(i) as usize % FRAME_SLOT_ALIGN, 0);
                }
                assert_eq!(ret as usize % FRAME_SLOT_ALIGN, 0);
            })
        };
    }

    #[test]
    #[should_panic(expected = "call-frame overflow")]
    fn overflow_panics() {
        let mut frame = CallFrame::new();
        for i in 0..=MAX_FRAME_ARGS {
            frame.push_arg(&(i as i64));
        }
    }
}
