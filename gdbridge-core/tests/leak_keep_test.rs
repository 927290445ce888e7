/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

// Single test: tears the binding down, which affects everything else in the process.

mod common;

use gdbridge_core::builtin::{Array, GString};
use gdbridge_core::classes::RefCounted;
use gdbridge_core::init::{ExtensionLibrary, InitLevel, LeakPolicy};
use gdbridge_core::obj::Gd;
use gdbridge_core::ownership;
use gdbridge_core::sys;
use gdbridge_mock::LogLevel;

struct KeepExtension;

unsafe impl ExtensionLibrary for KeepExtension {
    fn min_level() -> InitLevel {
        InitLevel::Core
    }

    fn leak_policy() -> LeakPolicy {
        LeakPolicy::Keep
    }
}

gdbridge_core::gdextension_entry!(KeepExtension, keep_extension_init);

#[test]
fn keep_policy_releases_nothing() {
    let init = common::load(keep_extension_init).expect("extension loads");
    common::run_levels(&init, &[InitLevel::Core, InitLevel::Servers, InitLevel::Scene]);

    let leaked_rc = Gd::<RefCounted>::new();
    let rc_id = leaked_rc.instance_id().to_i64() as u64;

    let string = GString::from("kept");
    let array: Array = [1i64, 2].into_iter().collect();

    assert!(ownership::stats().owned >= 3);

    common::unload_levels(&init, &[InitLevel::Scene, InitLevel::Servers, InitLevel::Core]);

    // Nothing was released; the host is responsible for these now.
    assert_eq!(gdbridge_mock::reference_count(rc_id), Some(1));
    assert!(gdbridge_mock::live_strings() >= 1);
    assert_eq!(gdbridge_mock::live_containers(), 1);

    assert_eq!(ownership::stats(), ownership::PointerStats::default());
    assert!(!sys::is_initialized());

    let warned = gdbridge_mock::log_entries()
        .iter()
        .any(|e| e.level == LogLevel::Warning && e.message.contains("handles still alive"));
    assert!(!warned, "Keep policy must not warn");

    // Forgotten handles are inert: dropping them makes no engine calls.
    drop(leaked_rc);
    drop(string);
    drop(array);

    assert_eq!(gdbridge_mock::reference_count(rc_id), Some(1));
    assert_eq!(gdbridge_mock::live_containers(), 1);
}
