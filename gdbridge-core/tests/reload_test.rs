/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

// Single test: unloads and reloads the binding, which affects everything else in the process.

mod common;

use gdbridge_core::builtin::{GString, ToVariant, Variant};
use gdbridge_core::classes::{ConfigFile, RefCounted};
use gdbridge_core::init::{ExtensionLibrary, InitLevel, LeakPolicy};
use gdbridge_core::obj::Gd;
use gdbridge_core::ownership;
use gdbridge_core::sys;

struct ReloadExtension;

unsafe impl ExtensionLibrary for ReloadExtension {
    fn min_level() -> InitLevel {
        InitLevel::Core
    }

    fn leak_policy() -> LeakPolicy {
        LeakPolicy::Sweep
    }
}

gdbridge_core::gdextension_entry!(ReloadExtension, reload_extension_init);

const ALL_LEVELS: [InitLevel; 3] = [InitLevel::Core, InitLevel::Servers, InitLevel::Scene];
const ALL_LEVELS_REV: [InitLevel; 3] = [InitLevel::Scene, InitLevel::Servers, InitLevel::Core];

#[test]
fn pinned_handle_survives_reload() {
    let init = common::load(reload_extension_init).expect("extension loads");
    common::run_levels(&init, &ALL_LEVELS);

    let pinned = Gd::<RefCounted>::new();
    let pinned_id = pinned.instance_id().to_i64() as u64;
    assert!(pinned.pin());

    let unpinned = Gd::<RefCounted>::new();
    let unpinned_id = unpinned.instance_id().to_i64() as u64;

    common::unload_levels(&init, &ALL_LEVELS_REV);
    assert!(!sys::is_initialized());

    // The sweep skipped the pinned handle only.
    assert_eq!(gdbridge_mock::reference_count(pinned_id), Some(1));
    assert!(!gdbridge_mock::is_alive(unpinned_id));
    drop(unpinned);

    let stats = ownership::stats();
    assert_eq!(stats.pinned, 1, "{stats:?}");
    assert_eq!(stats.owned, 1, "{stats:?}");

    // Hot reload: same entry point, fresh binding.
    let init = common::load(reload_extension_init).expect("extension reloads");
    common::run_levels(&init, &ALL_LEVELS);
    assert!(sys::is_initialized());

    // Method calls resolve again after the caches were cleared.
    let mut config = Gd::<ConfigFile>::new();
    config.set_value(&GString::from("s"), &GString::from("k"), &7i64.to_variant());
    assert_eq!(
        config
            .get_value(&GString::from("s"), &GString::from("k"), &Variant::nil())
            .to::<i64>(),
        7
    );

    // The pinned object is still usable and owned once.
    let clone = pinned.clone();
    assert_eq!(gdbridge_mock::reference_count(pinned_id), Some(2));
    drop(clone);
    assert_eq!(gdbridge_mock::reference_count(pinned_id), Some(1));

    drop(pinned);
    assert!(!gdbridge_mock::is_alive(pinned_id));

    drop(config);
    common::unload_levels(&init, &ALL_LEVELS_REV);
    assert_eq!(ownership::stats(), ownership::PointerStats::default());
}
