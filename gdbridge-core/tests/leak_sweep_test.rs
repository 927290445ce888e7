/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

// Single test: tears the binding down, which affects everything else in the process.

mod common;

use gdbridge_core::builtin::{Array, Dictionary, GString};
use gdbridge_core::classes::RefCounted;
use gdbridge_core::init::{ExtensionLibrary, InitLevel, LeakPolicy};
use gdbridge_core::obj::Gd;
use gdbridge_core::ownership;
use gdbridge_core::sys;
use gdbridge_mock::LogLevel;

struct SweepExtension;

unsafe impl ExtensionLibrary for SweepExtension {
    fn min_level() -> InitLevel {
        InitLevel::Core
    }

    fn leak_policy() -> LeakPolicy {
        LeakPolicy::Sweep
    }
}

gdbridge_core::gdextension_entry!(SweepExtension, sweep_extension_init);

#[test]
fn sweep_policy_releases_silently() {
    let init = common::load(sweep_extension_init).expect("extension loads");
    common::run_levels(&init, &[InitLevel::Core, InitLevel::Servers, InitLevel::Scene]);

    let leaked_rc = Gd::<RefCounted>::new();
    let rc_id = leaked_rc.instance_id().to_i64() as u64;

    // Only reachable through the array.
    let element = Gd::<RefCounted>::new();
    let element_id = element.instance_id().to_i64() as u64;
    let mut array = Array::new();
    array.push(&element);
    drop(element);

    let mut dict = Dictionary::new();
    dict.set("key", "value");

    let string = GString::from("leaked");

    // Builtin methods are resolved once, then served from the table.
    assert_eq!(array.len(), 1);
    let lookups = gdbridge_mock::builtin_method_lookups();
    assert_eq!(array.len(), 1);
    assert_eq!(dict.len(), 1);
    assert_eq!(gdbridge_mock::builtin_method_lookups(), lookups + 1);

    assert!(gdbridge_mock::live_containers() >= 2);
    assert_eq!(gdbridge_mock::reference_count(element_id), Some(1));

    common::unload_levels(&init, &[InitLevel::Scene, InitLevel::Servers, InitLevel::Core]);

    assert!(!gdbridge_mock::is_alive(rc_id));
    assert!(!gdbridge_mock::is_alive(element_id));
    assert_eq!(gdbridge_mock::live_containers(), 0);
    assert_eq!(gdbridge_mock::live_strings(), 0);

    assert_eq!(ownership::stats(), ownership::PointerStats::default());
    assert!(!sys::is_initialized());

    let warned = gdbridge_mock::log_entries()
        .iter()
        .any(|e| e.level == LogLevel::Warning && e.message.contains("handles still alive"));
    assert!(!warned, "Sweep policy must not warn");

    drop(leaked_rc);
    drop(array);
    drop(dict);
    drop(string);
}
