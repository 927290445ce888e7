/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

// Library usage as seen from a user crate, through the prelude only.

use std::mem::MaybeUninit;

use gdbridge::prelude::*;
use gdbridge::sys;

struct MyExtension;

unsafe impl ExtensionLibrary for MyExtension {
    fn min_level() -> InitLevel {
        InitLevel::Core
    }

    fn leak_policy() -> LeakPolicy {
        LeakPolicy::Sweep
    }
}

gdextension_entry!(MyExtension);

#[test]
fn user_crate_round_trip() {
    let mut init = MaybeUninit::<sys::GDExtensionInitialization>::zeroed();

    // SAFETY: mock functions match the engine's signatures.
    let success = unsafe {
        gdext_rust_init(
            Some(gdbridge_mock::get_proc_address),
            gdbridge_mock::library(),
            init.as_mut_ptr(),
        )
    };
    assert_eq!(success, 1);

    // SAFETY: filled on success.
    let init = unsafe { init.assume_init() };
    let initialize = init.initialize.expect("initialize callback");
    let deinitialize = init.deinitialize.expect("deinitialize callback");

    // SAFETY: levels in ascending order.
    unsafe { initialize(init.userdata, InitLevel::Core.to_sys()) };

    let mut root = Gd::<Node>::new();
    let mut sprite = Gd::<Node2D>::new();
    sprite.set_position(Vector2::new(10.0, 20.0));
    sprite.set_name(&StringName::from("Sprite"));
    root.add_child(sprite.upcast(), false, Default::default());

    let child = root
        .get_child(0, false)
        .and_then(|child| child.try_cast::<Node2D>().ok())
        .expect("Node2D child");
    assert_eq!(child.get_position(), Vector2::new(10.0, 20.0));
    assert_eq!(child.get_name(), "Sprite");

    let db = ClassDb::singleton();
    assert!(db.is_parent_class(&StringName::from("Node2D"), &StringName::from("Object")));

    let mut config = Gd::<ConfigFile>::new();
    config.set_value(&GString::from("scene"), &GString::from("root"), &root.to_variant());
    let stored: Gd<Node> = config
        .get_value(&GString::from("scene"), &GString::from("root"), &Variant::nil())
        .to();
    assert_eq!(stored, root);

    root.free();

    // SAFETY: Core is the last level; remaining handles are swept silently.
    unsafe { deinitialize(init.userdata, InitLevel::Core.to_sys()) };
    assert!(!sys::is_initialized());
    assert!(!gdbridge_mock::log_contains(gdbridge_mock::LogLevel::Warning, "handles still alive"));
}
