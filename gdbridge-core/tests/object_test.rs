/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

mod common;

use gdbridge_core::builtin::{GString, StringName, Vector2};
use gdbridge_core::classes::node::InternalMode;
use gdbridge_core::classes::{Node, Node2D, Object, RefCounted, Resource};
use gdbridge_core::obj::{Gd, InstanceId};

fn id_of<T: gdbridge_core::obj::GodotClass>(obj: &Gd<T>) -> u64 {
    obj.instance_id().to_i64() as u64
}

#[test]
fn object_new_free() {
    common::boot();

    let obj = Gd::<Object>::new();
    let id = id_of(&obj);

    assert!(gdbridge_mock::is_alive(id));
    assert!(!obj.instance_id().is_ref_counted());
    assert_eq!(obj.get_class(), "Object");

    obj.free();
    assert!(!gdbridge_mock::is_alive(id));
}

#[test]
fn object_drop_does_not_free_manual() {
    common::boot();

    let node = Gd::<Node>::new();
    let id = id_of(&node);
    drop(node);

    // Manually managed: dropping a handle leaves the object to its owner.
    assert!(gdbridge_mock::is_alive(id));
    Gd::<Node>::from_instance_id(InstanceId::from_i64(id as i64)).free();
    assert!(!gdbridge_mock::is_alive(id));
}

#[test]
fn refcounted_construct_clone_drop() {
    common::boot();

    let obj = Gd::<RefCounted>::new();
    let id = id_of(&obj);

    assert!(obj.instance_id().is_ref_counted());
    assert_eq!(gdbridge_mock::reference_count(id), Some(1));
    assert_eq!(obj.get_reference_count(), 1);

    let clone = obj.clone();
    assert_eq!(gdbridge_mock::reference_count(id), Some(2));
    assert_eq!(clone, obj);

    drop(clone);
    assert_eq!(gdbridge_mock::reference_count(id), Some(1));

    drop(obj);
    assert!(!gdbridge_mock::is_alive(id));
}

#[test]
fn object_instance_id_roundtrip() {
    common::boot();

    let res = Gd::<Resource>::new();
    let id = res.instance_id();
    assert_eq!(res.get_instance_id(), id.to_i64());

    let found = Gd::<Resource>::from_instance_id(id);
    assert_eq!(found, res);
    assert_eq!(gdbridge_mock::reference_count(id.to_i64() as u64), Some(2));

    // Lookup with an incompatible class.
    assert!(Gd::<Node>::try_from_instance_id(id).is_none());
    assert_eq!(gdbridge_mock::reference_count(id.to_i64() as u64), Some(2));
}

#[test]
fn object_instance_id_unknown() {
    common::boot();

    let node = Gd::<Node>::new();
    let id = node.instance_id();
    node.free();

    assert!(Gd::<Node>::try_from_instance_id(id).is_none());
}

#[test]
#[should_panic(expected = "does not belong to a valid object")]
fn object_from_instance_id_panics() {
    common::boot();

    let node = Gd::<Node>::new();
    let id = node.instance_id();
    node.free();

    Gd::<Node>::from_instance_id(id);
}

#[test]
fn object_upcast_downcast() {
    common::boot();

    let node2d = Gd::<Node2D>::new();
    let id = node2d.instance_id();

    let object: Gd<Object> = node2d.upcast();
    assert!(object.is_class(&GString::from("Node")));
    assert_eq!(object.get_class(), "Node2D");
    assert_eq!(object.dynamic_class_string(), "Node2D");

    let node: Gd<Node> = object.cast();
    let node2d: Gd<Node2D> = node.try_cast().expect("dynamic class is Node2D");
    assert_eq!(node2d.instance_id(), id);

    node2d.free();
}

#[test]
fn object_downcast_failure_keeps_handle() {
    common::boot();

    let object: Gd<Object> = Gd::<Node>::new().upcast();
    let object = object
        .try_cast::<Node2D>()
        .expect_err("Node is not a Node2D");

    assert!(object.is_instance_valid());
    object.free();
}

#[test]
fn object_deref_chain() {
    common::boot();

    let mut node2d = Gd::<Node2D>::new();

    // Node2D method, Node method, Object method.
    node2d.set_position(Vector2::new(1.5, -2.0));
    node2d.set_name(&StringName::from("Sprite"));
    assert!(node2d.has_method(&StringName::from("rotate")));

    assert_eq!(node2d.get_position(), Vector2::new(1.5, -2.0));
    assert_eq!(node2d.get_name(), "Sprite");

    node2d.rotate(0.25);
    node2d.rotate(0.5);
    assert!((node2d.get_rotation() - 0.75).abs() < 1e-6);

    node2d.free();
}

#[test]
fn node_add_child_transfers_ownership() {
    common::boot();

    let mut parent = Gd::<Node>::new();
    let child = Gd::<Node2D>::new();
    let child_id = id_of(&child);

    parent.add_child(child.upcast(), false, InternalMode::Disabled);
    assert_eq!(parent.get_child_count(false), 1);

    let child = parent.get_child(0, false).expect("child at index 0");
    assert_eq!(id_of(&child), child_id);
    assert_eq!(child.get_parent(), Some(parent.clone()));

    // Negative indices count from the end.
    assert_eq!(parent.get_child(-1, false), Some(child.clone()));

    // Freeing the parent frees the child, which the engine owns now.
    parent.free();
    assert!(!gdbridge_mock::is_alive(child_id));
    assert!(!child.is_instance_valid());
}

#[test]
fn node_get_child_out_of_bounds() {
    common::boot();

    let node = Gd::<Node>::new();
    assert_eq!(node.get_child(3, false), None);
    assert!(gdbridge_mock::log_contains(
        gdbridge_mock::LogLevel::Error,
        "Index p_index = 3 is out of bounds"
    ));

    assert_eq!(node.get_parent(), None);
    node.free();
}

#[test]
fn node_add_child_twice_reports_engine_error() {
    common::boot();

    let mut first = Gd::<Node>::new();
    let mut second = Gd::<Node>::new();
    let mut child = Gd::<Node>::new();
    child.set_name(&StringName::from("TwiceAdded"));

    first.add_child(child.clone(), false, InternalMode::Disabled);
    second.add_child(child, false, InternalMode::Disabled);

    assert_eq!(second.get_child_count(false), 0);
    assert!(gdbridge_mock::log_contains(
        gdbridge_mock::LogLevel::Error,
        "Can't add child 'TwiceAdded'"
    ));

    first.free();
    second.free();
}

#[test]
fn resource_duplicate_adopts_reference() {
    common::boot();

    let mut res = Gd::<Resource>::new();
    res.set_path(&GString::from("res://icon.png"));

    let copy = res.duplicate(false).expect("duplicate");
    let copy_id = id_of(&copy);

    assert_ne!(copy, res);
    assert_eq!(copy.get_path(), "res://icon.png");
    assert_eq!(gdbridge_mock::reference_count(copy_id), Some(1));

    drop(copy);
    assert!(!gdbridge_mock::is_alive(copy_id));
}

#[test]
fn object_new_by_class_name() {
    common::boot();

    let obj = Gd::<Object>::new_by_class_name("Node2D").expect("Node2D is instantiable");
    assert_eq!(obj.get_class(), "Node2D");
    obj.free();

    assert!(Gd::<Object>::new_by_class_name("ClassDB").is_none());
    assert!(Gd::<Object>::new_by_class_name("DoesNotExist").is_none());
    assert!(gdbridge_mock::log_contains(
        gdbridge_mock::LogLevel::Error,
        "Class 'DoesNotExist' can't be instantiated."
    ));
}

#[test]
#[should_panic(expected = "RefCounted dynamic type")]
fn object_free_refcounted_panics() {
    common::boot();

    let obj: Gd<Object> = Gd::<RefCounted>::new().upcast();
    obj.free();
}

#[test]
#[should_panic(expected = "already destroyed")]
fn object_double_free_panics() {
    common::boot();

    let node = Gd::<Node>::new();
    let copy = node.clone();

    node.free();
    copy.free();
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "was freed")]
fn object_use_after_free_panics() {
    common::boot();

    let node = Gd::<Node>::new();
    let copy = node.clone();
    node.free();

    copy.get_name();
}

#[test]
fn object_debug_and_equality() {
    common::boot();

    let a = Gd::<RefCounted>::new();
    let b = Gd::<RefCounted>::new();

    assert_ne!(a, b);
    assert_eq!(a, a.clone());

    let debug = format!("{a:?}");
    assert!(debug.starts_with("Gd { id: "), "{debug}");
    assert!(debug.ends_with("class: RefCounted }"), "{debug}");
}
