/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

// Single test: tears the binding down, which affects everything else in the process.

mod common;

use gdbridge_core::builtin::{GString, StringName, ToVariant, Variant};
use gdbridge_core::classes::{ConfigFile, Node, RefCounted};
use gdbridge_core::init::{ExtensionLibrary, InitLevel, LeakPolicy};
use gdbridge_core::obj::Gd;
use gdbridge_core::ownership::{self, Lifetime};
use gdbridge_core::sys;
use gdbridge_mock::LogLevel;

struct ShutdownExtension;

unsafe impl ExtensionLibrary for ShutdownExtension {
    fn min_level() -> InitLevel {
        InitLevel::Core
    }

    fn leak_policy() -> LeakPolicy {
        LeakPolicy::SweepAndWarn
    }

    fn on_level_deinit(level: InitLevel) {
        if level == InitLevel::Core {
            gdbridge_core::godot_warn!("user deinit at {level:?}");
        }
    }
}

gdbridge_core::gdextension_entry!(ShutdownExtension, shutdown_extension_init);

#[test]
fn shutdown_sweeps_leaked_handles() {
    let init = common::load(shutdown_extension_init).expect("extension loads");
    common::run_levels(&init, &[InitLevel::Core, InitLevel::Servers, InitLevel::Scene]);

    // Handles deliberately kept past shutdown.
    let leaked_rc = Gd::<RefCounted>::new();
    let rc_id = leaked_rc.instance_id().to_i64() as u64;

    let mut config = Gd::<ConfigFile>::new();
    config.set_value(
        &GString::from("section"),
        &GString::from("key"),
        &"value".to_variant(),
    );
    let config_id = config.instance_id().to_i64() as u64;

    let node = Gd::<Node>::new();
    let node_id = node.instance_id().to_i64() as u64;

    let string = GString::from("still here");
    let name = StringName::from("also here");
    let variant = Variant::from("variant text");

    // Handles released before shutdown stay released.
    let scoped_id = Lifetime::scope(|lt| {
        let obj = lt.keep(Gd::<RefCounted>::new());
        obj.instance_id().to_i64() as u64
    });
    assert!(!gdbridge_mock::is_alive(scoped_id));

    let stats = ownership::stats();
    assert!(stats.owned >= 5, "{stats:?}");
    assert!(stats.borrowed >= 1, "{stats:?}");

    common::unload_levels(&init, &[InitLevel::Scene, InitLevel::Servers, InitLevel::Core]);

    // RefCounted objects lost their last reference; manual objects stay with the engine.
    assert!(!gdbridge_mock::is_alive(rc_id));
    assert!(!gdbridge_mock::is_alive(config_id));
    assert!(gdbridge_mock::is_alive(node_id));

    // Strings, names and variants were destroyed, including cached names.
    assert_eq!(gdbridge_mock::live_strings(), 0);

    assert_eq!(ownership::stats(), ownership::PointerStats::default());
    assert!(!sys::is_initialized());

    // User code runs before the sweep.
    let entries = gdbridge_mock::log_entries();
    let user = entries
        .iter()
        .position(|e| e.message == "user deinit at Core")
        .expect("on_level_deinit ran");
    let sweep = entries
        .iter()
        .position(|e| e.level == LogLevel::Warning && e.message.starts_with("handles still alive at shutdown"))
        .expect("sweep warned about leaked handles");
    assert!(user < sweep);

    // Dropping swept values is a no-op, without engine calls.
    drop(leaked_rc);
    drop(config);
    drop(node);
    drop(string);
    drop(name);
    drop(variant);
}
