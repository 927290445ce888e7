/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

// Single test: observes the global method-bind counters.

mod common;

use gdbridge_core::builtin::{GString, Vector2};
use gdbridge_core::classes::{self, ConfigFile, Node2D};
use gdbridge_core::obj::Gd;
use gdbridge_core::sys;

#[test]
fn preloaded_binds_are_not_looked_up_again() {
    common::boot();

    let keys = classes::compiled_method_keys();
    // SAFETY: the binding is initialized by `boot()`.
    let table = unsafe { sys::method_table() };

    for key in &keys {
        assert!(table.contains(key), "{key} was not preloaded");
    }
    assert_eq!(table.stats().cached, keys.len());

    let lookups_before = gdbridge_mock::method_bind_lookups();

    let mut node = Gd::<Node2D>::new();
    node.set_position(Vector2::new(1.0, 1.0));
    node.rotate(1.0);
    let _ = node.get_name();
    let _ = node.call("get_class", &[]);
    node.free();

    let mut config = Gd::<ConfigFile>::new();
    let _ = config.load(&GString::from("user://nothing.cfg"));
    drop(config);

    assert_eq!(gdbridge_mock::method_bind_lookups(), lookups_before);
    assert!(gdbridge_mock::log_entries()
        .iter()
        .all(|e| !e.message.contains("failed to load class method")));
}
