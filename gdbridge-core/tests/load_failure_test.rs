/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

// Single test: changes the version that the mock engine reports.

mod common;

use gdbridge_core::init::{ExtensionLibrary, InitLevel};
use gdbridge_core::sys;

struct DemandingExtension;

unsafe impl ExtensionLibrary for DemandingExtension {
    fn min_runtime_version() -> (u32, u32, u32) {
        (4, 4, 0)
    }
}

gdbridge_core::gdextension_entry!(DemandingExtension, demanding_extension_init);
gdbridge_core::gdextension_entry!(common::TestExtension, default_extension_init);

#[test]
fn load_fails_on_old_engine() {
    // Older than the crate's own minimum.
    gdbridge_mock::set_reported_version(4, 1, 0);
    assert!(common::load(default_extension_init).is_none());
    assert!(!sys::is_initialized());

    // Older than what the library asks for.
    gdbridge_mock::set_reported_version(4, 3, 0);
    assert!(common::load(demanding_extension_init).is_none());
    assert!(!sys::is_initialized());

    // Same engine, default requirements.
    let init = common::load(default_extension_init).expect("4.3 is supported");
    assert!(sys::is_initialized());
    assert_eq!(init.minimum_initialization_level, InitLevel::Core.to_sys());

    // SAFETY: initialized above.
    let version = unsafe { sys::runtime_version() };
    assert_eq!(version.triple(), (4, 3, 0));
    assert!(version.string.contains("4.3.0"), "{}", version.string);

    common::unload_levels(&init, &[InitLevel::Core]);
    assert!(!sys::is_initialized());
}
