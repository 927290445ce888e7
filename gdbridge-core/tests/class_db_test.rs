/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

mod common;

use gdbridge_core::builtin::{StringName, ToVariant, Vector2};
use gdbridge_core::classes::{ClassDb, Node2D, Object, Resource};
use gdbridge_core::global::Error;
use gdbridge_core::obj::{Gd, Singleton};

fn name(text: &str) -> StringName {
    StringName::from(text)
}

#[test]
fn class_db_queries() {
    common::boot();

    let db = ClassDb::singleton();

    assert!(db.class_exists(&name("Node2D")));
    assert!(!db.class_exists(&name("Sprite9D")));

    assert_eq!(db.get_parent_class(&name("Node2D")), "Node");
    assert_eq!(db.get_parent_class(&name("Object")), "");

    assert!(db.is_parent_class(&name("ConfigFile"), &name("RefCounted")));
    assert!(!db.is_parent_class(&name("Node"), &name("RefCounted")));

    assert!(db.can_instantiate(&name("Resource")));
    assert!(!db.can_instantiate(&name("ClassDB")));
}

#[test]
fn class_db_singleton_is_borrowed() {
    common::boot();

    let first = ClassDb::singleton();
    let second = ClassDb::singleton();
    let id = first.instance_id().to_i64() as u64;

    assert_eq!(first, second);
    assert_eq!(first.get_class(), "ClassDB");

    drop(first);
    drop(second);
    assert!(gdbridge_mock::is_alive(id));
}

#[test]
fn class_db_instantiate_refcounted() {
    common::boot();

    let db = ClassDb::singleton();
    let variant = db.instantiate(&name("Resource"));

    let res = variant.to::<Gd<Resource>>();
    let id = res.instance_id().to_i64() as u64;
    assert_eq!(gdbridge_mock::reference_count(id), Some(2));

    drop(variant);
    assert_eq!(gdbridge_mock::reference_count(id), Some(1));

    drop(res);
    assert!(!gdbridge_mock::is_alive(id));
}

#[test]
fn class_db_instantiate_failure() {
    common::boot();

    let db = ClassDb::singleton();
    let variant = db.instantiate(&name("NoSuchClass"));

    assert!(variant.is_nil());
    assert!(gdbridge_mock::log_contains(
        gdbridge_mock::LogLevel::Error,
        "Class 'NoSuchClass' can't be instantiated."
    ));
}

#[test]
fn class_db_set_property() {
    common::boot();

    let db = ClassDb::singleton();
    let node = Gd::<Node2D>::new();
    let object: Gd<Object> = node.clone().upcast();

    let err = db.class_set_property(&object, &name("position"), &Vector2::new(5.0, 6.0).to_variant());
    assert_eq!(err, Error::OK);
    assert_eq!(node.get_position(), Vector2::new(5.0, 6.0));

    let err = db.class_set_property(&object, &name("name"), &"Player".to_variant());
    assert_eq!(err, Error::OK);
    assert_eq!(node.get_name(), "Player");

    let err = db.class_set_property(&object, &name("position"), &"not a vector".to_variant());
    assert_eq!(err, Error::ERR_INVALID_DATA);

    let err = db.class_set_property(&object, &name("no_such_property"), &1i64.to_variant());
    assert_eq!(err, Error::ERR_UNAVAILABLE);

    node.free();
}
