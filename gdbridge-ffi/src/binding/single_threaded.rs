/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Binding storage restricted to the thread that loaded the extension.
//!
//! Access from another thread panics in debug mode and is UB in release mode.

use super::GodotBinding;

pub(super) struct BindingStorage;

impl BindingStorage {
    #[must_use]
    pub fn initialize(binding: GodotBinding) -> Option<()> {
        super::store(binding)
    }

    pub fn deinitialize() -> Option<Box<GodotBinding>> {
        super::take()
    }

    /// # Safety
    /// - Must be called from the main thread.
    /// - The binding must be initialized.
    #[inline(always)]
    pub unsafe fn get_binding_unchecked() -> &'static GodotBinding {
        let raw = super::load();

        if cfg!(debug_assertions) {
            assert!(
                !raw.is_null(),
                "engine not available; make sure you are not calling it from unit/doc tests or after shutdown"
            );

            let binding = &*raw;
            assert_eq!(
                binding.main_thread,
                std::thread::current().id(),
                "attempted to access binding from different thread than main thread; \
                this is UB - use the \"experimental-threads\" feature."
            );
            binding
        } else {
            &*raw
        }
    }

    pub fn is_initialized() -> bool {
        !super::load().is_null()
    }
}
