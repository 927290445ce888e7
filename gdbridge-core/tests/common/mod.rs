/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Loads the extension into the mock engine, once per test binary.

#![allow(dead_code)]

use std::mem::MaybeUninit;
use std::sync::Once;

use gdbridge_core::init::{ExtensionLibrary, InitLevel};
use gdbridge_core::sys;

pub struct TestExtension;

unsafe impl ExtensionLibrary for TestExtension {
    fn min_level() -> InitLevel {
        InitLevel::Core
    }

    fn preload_method_binds() -> bool {
        true
    }
}

gdbridge_core::gdextension_entry!(TestExtension);

static BOOT: Once = Once::new();

/// Runs the entry point and initializes all levels up to `Scene`.
pub fn boot() {
    BOOT.call_once(|| {
        let init = load(gdext_rust_init).expect("extension failed to load");
        run_levels(&init, &[InitLevel::Core, InitLevel::Servers, InitLevel::Scene]);
    });
}

type EntryPoint = unsafe extern "C" fn(
    sys::GDExtensionInterfaceGetProcAddress,
    sys::GDExtensionClassLibraryPtr,
    *mut sys::GDExtensionInitialization,
) -> sys::GDExtensionBool;

/// Calls `entry` like the engine does. `None` if the library reports failure.
pub fn load(entry: EntryPoint) -> Option<sys::GDExtensionInitialization> {
    let mut init = MaybeUninit::<sys::GDExtensionInitialization>::zeroed();

    // SAFETY: mock functions match the engine's signatures; `init` is writable.
    let success = unsafe {
        entry(
            Some(gdbridge_mock::get_proc_address),
            gdbridge_mock::library(),
            init.as_mut_ptr(),
        )
    };

    // SAFETY: zero-initialized, and filled on success.
    (success != 0).then(|| unsafe { init.assume_init() })
}

pub fn run_levels(init: &sys::GDExtensionInitialization, levels: &[InitLevel]) {
    let initialize = init.initialize.expect("initialize callback");
    for level in levels {
        // SAFETY: levels are passed in ascending order, each once.
        unsafe { initialize(init.userdata, level.to_sys()) };
    }
}

pub fn unload_levels(init: &sys::GDExtensionInitialization, levels: &[InitLevel]) {
    let deinitialize = init.deinitialize.expect("deinitialize callback");
    for level in levels {
        // SAFETY: levels are passed in descending order, each once.
        unsafe { deinitialize(init.userdata, level.to_sys()) };
    }
}
