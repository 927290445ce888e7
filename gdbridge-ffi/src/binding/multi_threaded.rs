/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Binding storage accessible from any thread.
//!
//! Thread safety of individual engine calls is the caller's responsibility.

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
    /// The binding must be initialized.
    #[inline(always)]
    pub unsafe fn get_binding_unchecked() -> &'static GodotBinding {
        let raw = super::load();
        debug_assert!(
            !raw.is_null(),
            "engine not available; make sure you are not calling it from unit/doc tests or after shutdown"
        );

        &*raw
    }

    pub fn is_initialized() -> bool {
        !super::load().is_null()
    }
}
