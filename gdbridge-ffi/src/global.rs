/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard};

/// Lazily initialized, mutex-protected global.
///
/// Usable in `static` items thanks to the `const` constructor. The init function runs on first [`lock()`](Self::lock).
///
/// Used for process-wide state that outlives a single init level, such as the handle registry.
pub struct Global<T> {
    value: Mutex<Slot<T>>,
}

enum Slot<T> {
    Pending(fn() -> T),
    Ready(T),
    Poisoned,
}

impl<T> Global<T> {
    pub const fn new(init_fn: fn() -> T) -> Self {
        Self {
            value: Mutex::new(Slot::Pending(init_fn)),
        }
    }

    /// Global initialized with `T::default()`.
    ///
    /// Inherent, since `Default::default()` cannot be called in `const` contexts.
    pub const fn default() -> Self
    where
        T: Default,
    {
        Self::new(T::default)
    }

    /// Blocks until the value is available, initializing it on first access.
    ///
    /// # Panics
    /// If the init function panicked before. The global stays unusable in that case.
    pub fn lock(&self) -> GlobalGuard<'_, T> {
        // A panic while a guard is held must not brick the global for the rest of the process.
        let mut guard = match self.value.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Slot::Pending(init_fn) = *guard {
            *guard = Slot::Poisoned;
            *guard = Slot::Ready(init_fn());
        }

        match *guard {
            Slot::Ready(_) => GlobalGuard { guard },
            Slot::Poisoned => panic!("previous Global<T> initialization failed due to panic"),
            Slot::Pending(_) => unreachable!("global initialized above"),
        }
    }

    /// Whether the init function has already run.
    pub fn is_initialized(&self) -> bool {
        match self.value.lock() {
            Ok(guard) => matches!(*guard, Slot::Ready(_)),
            Err(poisoned) => matches!(*poisoned.into_inner(), Slot::Ready(_)),
        }
    }
}

/// Exclusive access to the value of a [`Global`].
pub struct GlobalGuard<'a, T> {
    guard: MutexGuard<'a, Slot<T>>,
}

impl<T> Deref for GlobalGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &*self.guard {
            Slot::Ready(value) => value,
            _ => unreachable!("guard only exists for initialized globals"),
        }
    }
}

impl<T> DerefMut for GlobalGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut *self.guard {
            Slot::Ready(value) => value,
            _ => unreachable!("guard only exists for initialized globals"),
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    static NAMES: Global<BTreeMap<u32, &'static str>> = Global::default();
    static COUNTERS: Global<Vec<u64>> = Global::new(|| vec![10, 20]);
    static BROKEN: Global<u8> = Global::new(|| panic!("init failure"));

    #[test]
    fn global_default_init() {
        {
            let mut names = NAMES.lock();
            names.insert(7, "seven");
        }

        assert!(NAMES.is_initialized());

        let names = NAMES.lock();
        assert_eq!(names.get(&7), Some(&"seven"));
    }

    #[test]
    fn global_custom_init() {
        COUNTERS.lock().push(30);

        let counters = COUNTERS.lock();
        assert_eq!(*counters, [10, 20, 30]);
    }

    #[test]
    fn global_failed_init_stays_failed() {
        let first = std::panic::catch_unwind(|| {
            let _guard = BROKEN.lock();
        });
        assert!(first.is_err());

        let second = std::panic::catch_unwind(|| {
            let _guard = BROKEN.lock();
        });
        assert!(second.is_err());
        assert!(!BROKEN.is_initialized());
    }
}
