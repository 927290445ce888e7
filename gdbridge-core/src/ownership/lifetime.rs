/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::any::Any;
use std::cell::RefCell;
use std::fmt;

/// Arena that drops everything it holds when it ends.
///
/// Useful to group engine handles created during one operation and release them together, in reverse order of
/// adoption. References returned by [`keep()`](Self::keep) borrow the arena, so they cannot outlive it.
///
/// ```no_run
/// use gdbridge_core::builtin::GString;
/// use gdbridge_core::ownership::Lifetime;
///
/// let total = Lifetime::scope(|lt| {
///     let a = lt.keep(GString::from("left"));
///     let b = lt.keep(GString::from("right"));
///     a.len() + b.len()
/// });
/// assert_eq!(total, 9);
/// ```
#[derive(Default)]
pub struct Lifetime {
    values: RefCell<Vec<Box<dyn Any>>>,
}

impl Lifetime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with a fresh lifetime, which ends when `f` returns.
    pub fn scope<R>(f: impl FnOnce(&Lifetime) -> R) -> R {
        let lifetime = Lifetime::new();
        let result = f(&lifetime);
        lifetime.end();
        result
    }

    /// Moves `value` into the arena and returns a reference valid as long as the arena.
    pub fn keep<T: 'static>(&self, value: T) -> &T {
        let boxed = Box::new(value);
        let ptr: *const T = &*boxed;
        self.values.borrow_mut().push(boxed);

        // SAFETY: the box is heap-allocated and only dropped in `Drop`, which requires that no borrow of `self` is alive.
        unsafe { &*ptr }
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }

    /// Drops all kept values, newest first.
    pub fn end(self) {
        drop(self);
    }
}

impl Drop for Lifetime {
    fn drop(&mut self) {
        let values = self.values.get_mut();
        while let Some(value) = values.pop() {
            drop(value);
        }
    }
}

impl fmt::Debug for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifetime").field("len", &self.len()).finish()
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Tests
