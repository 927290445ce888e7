/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

mod common;

use gdbridge_core::builtin::{
    GString, StringName, ToVariant, Variant, VariantType, Vector2, Vector2i, Vector3,
};
use gdbridge_core::classes::{Node, RefCounted};
use gdbridge_core::meta::error::ErrorKind;
use gdbridge_core::obj::{Gd, InstanceId};

#[test]
fn variant_nil() {
    common::boot();

    let nil = Variant::nil();
    assert!(nil.is_nil());
    assert_eq!(nil.get_type(), VariantType::Nil);
    assert_eq!(nil.to_string(), "<null>");
    assert_eq!(format!("{nil:?}"), "null");

    let default = Variant::default();
    assert!(default.is_nil());
    assert!(nil.clone().is_nil());
}

#[test]
fn variant_primitives() {
    common::boot();

    let int = Variant::from(-42i64);
    assert_eq!(int.get_type(), VariantType::Int);
    assert_eq!(int.to::<i64>(), -42);
    assert_eq!(int.to::<i32>(), -42);
    assert_eq!(int.to::<i8>(), -42);
    assert_eq!(int.to_string(), "-42");

    let float = Variant::from(2.5f64);
    assert_eq!(float.get_type(), VariantType::Float);
    assert_eq!(float.to::<f64>(), 2.5);
    assert_eq!(float.to::<f32>(), 2.5);

    let boolean = true.to_variant();
    assert_eq!(boolean.get_type(), VariantType::Bool);
    assert!(boolean.to::<bool>());
    assert!(!false.to_variant().to::<bool>());
}

#[test]
fn variant_vectors() {
    common::boot();

    let v2 = Variant::from(Vector2::new(3.0, -4.0));
    assert_eq!(v2.get_type(), VariantType::Vector2);
    assert_eq!(v2.to::<Vector2>(), Vector2::new(3.0, -4.0));
    assert_eq!(v2.to_string(), "(3, -4)");

    let v2i = Variant::from(Vector2i::new(-7, 9));
    assert_eq!(v2i.to::<Vector2i>(), Vector2i::new(-7, 9));

    let v3 = Variant::from(Vector3::new(1.0, 2.0, 3.0));
    assert_eq!(v3.get_type(), VariantType::Vector3);
    assert_eq!(v3.to::<Vector3>(), Vector3::new(1.0, 2.0, 3.0));
}

#[test]
fn variant_strings() {
    common::boot();

    let string = Variant::from("hello");
    assert_eq!(string.get_type(), VariantType::String);
    assert_eq!(string.to::<GString>(), "hello");
    assert_eq!(string.to::<String>(), "hello");
    assert_eq!(format!("{string:?}"), "\"hello\"");

    let name = StringName::from("node_path").to_variant();
    assert_eq!(name.get_type(), VariantType::StringName);
    assert_eq!(name.to::<StringName>(), "node_path");
    assert_eq!(format!("{name:?}"), "&\"node_path\"");

    // Clones own their own string.
    let copy = string.clone();
    drop(string);
    assert_eq!(copy.to::<String>(), "hello");
}

#[test]
fn variant_bad_type() {
    common::boot();

    let variant = Variant::from("not a number");
    let err = variant.try_to::<i64>().expect_err("String is not Int");

    assert_eq!(
        err.kind(),
        &ErrorKind::BadType {
            expected: VariantType::Int,
            actual: VariantType::String,
        }
    );
    assert_eq!(err.value(), Some("\"not a number\""));

    assert!(Variant::nil().try_to::<Vector2>().is_err());
    assert!(Variant::from(1i64).try_to::<f64>().is_err());
}

#[test]
fn variant_integer_narrowing() {
    common::boot();

    let big = Variant::from(1i64 << 40);
    let err = big.try_to::<i32>().expect_err("does not fit into i32");
    assert!(matches!(err.kind(), ErrorKind::BadValue(_)), "{err}");

    let negative = Variant::from(-1i64);
    assert!(negative.try_to::<u32>().is_err());
    assert_eq!(negative.try_to::<i16>().ok(), Some(-1));

    assert_eq!(Variant::from(255i64).try_to::<u8>().ok(), Some(255));
    assert!(Variant::from(256i64).try_to::<u8>().is_err());
}

#[test]
#[should_panic(expected = "FromVariant::from_variant() failed")]
fn variant_to_panics_on_mismatch() {
    common::boot();

    Variant::from(true).to::<GString>();
}

#[test]
fn variant_object_reference_counting() {
    common::boot();

    let obj = Gd::<RefCounted>::new();
    let id = obj.instance_id().to_i64() as u64;

    let variant = obj.to_variant();
    assert_eq!(variant.get_type(), VariantType::Object);
    assert_eq!(gdbridge_mock::reference_count(id), Some(2));

    let back = variant.to::<Gd<RefCounted>>();
    assert_eq!(back, obj);
    assert_eq!(gdbridge_mock::reference_count(id), Some(3));

    drop(back);
    drop(obj);
    assert_eq!(gdbridge_mock::reference_count(id), Some(1));

    // The variant holds the last reference.
    drop(variant);
    assert!(!gdbridge_mock::is_alive(id));
}

#[test]
fn variant_object_wrong_class() {
    common::boot();

    let node = Gd::<Node>::new();
    let variant = node.to_variant();

    let err = variant
        .try_to::<Gd<RefCounted>>()
        .expect_err("Node is not RefCounted");
    assert_eq!(
        err.kind(),
        &ErrorKind::WrongClass {
            expected: "RefCounted".to_string(),
            actual: "Node".to_string(),
        }
    );

    let same = variant.to::<Gd<Node>>();
    assert_eq!(same, node);
    node.free();
}

#[test]
fn variant_object_option() {
    common::boot();

    let none: Option<Gd<Node>> = None;
    assert!(none.to_variant().is_nil());
    assert_eq!(Variant::nil().to::<Option<Gd<Node>>>(), None);

    let err = Variant::nil().try_to::<Gd<Node>>().expect_err("nil is no object");
    assert!(matches!(err.kind(), ErrorKind::BadType { .. }));

    let node = Gd::<Node>::new();
    let some = Some(node.clone()).to_variant();
    assert_eq!(some.to::<Option<Gd<Node>>>(), Some(node.clone()));
    node.free();
}

#[test]
fn variant_freed_object_option() {
    common::boot();

    let node = Gd::<Node>::new();
    let variant = node.to_variant();
    node.free();

    // Still Object-typed, but no longer convertible to a live object.
    assert_eq!(variant.get_type(), VariantType::Object);
    assert_eq!(variant.try_to::<Option<Gd<Node>>>(), Ok(None));

    let err = variant.try_to::<Gd<Node>>().expect_err("freed object");
    assert!(matches!(err.kind(), ErrorKind::NullObject));
}

#[test]
fn variant_instance_id() {
    common::boot();

    let obj = Gd::<RefCounted>::new();
    let id = obj.instance_id();

    let variant = id.to_variant();
    assert_eq!(variant.get_type(), VariantType::Int);
    assert_eq!(variant.to::<InstanceId>(), id);
    assert!(Variant::from(0i64).try_to::<InstanceId>().is_err());
}

#[test]
fn variant_stringify_object() {
    common::boot();

    let node = Gd::<Node>::new();
    let text = node.to_variant().stringify();
    assert_eq!(text, format!("<Node#{}>", node.instance_id()).as_str());
    node.free();
}

#[test]
fn strings_roundtrip() {
    common::boot();

    let string = GString::from("Grüße, 世界");
    assert_eq!(string.to_string(), "Grüße, 世界");
    assert_eq!(string.len(), "Grüße, 世界".chars().count());
    assert!(!string.is_empty());
    assert!(GString::new().is_empty());
    assert_eq!(GString::default(), GString::new());

    let clone = string.clone();
    drop(string);
    assert_eq!(clone, "Grüße, 世界");

    let name = StringName::from(&clone);
    assert_eq!(GString::from(&name), clone);
    assert_eq!(String::from(&clone), "Grüße, 世界");
}
