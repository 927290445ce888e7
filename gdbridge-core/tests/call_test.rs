/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

mod common;

use gdbridge_core::builtin::{GString, StringName, ToVariant, Variant, VariantType};
use gdbridge_core::classes::{Node, Object, RefCounted};
use gdbridge_core::obj::Gd;
use gdbridge_core::sys::{self, MethodKey};
use gdbridge_mock::LogLevel;

#[test]
fn varcall_returns_value() {
    common::boot();

    let mut obj = Gd::<RefCounted>::new();

    let class = obj.call("get_class", &[]);
    assert_eq!(class.get_type(), VariantType::String);
    assert_eq!(class.to::<String>(), "RefCounted");

    let is_object = obj.call("is_class", &[GString::from("Object").to_variant()]);
    assert!(is_object.to::<bool>());

    let count = obj.call(StringName::from("get_reference_count"), &[]);
    assert_eq!(count.to::<i64>(), 1);
}

#[test]
fn varcall_mutates_through_base() {
    common::boot();

    let mut node = Gd::<Node>::new();
    let result = node.call("set_name", &["Renamed".to_variant()]);

    assert!(result.is_nil());
    assert_eq!(node.get_name(), "Renamed");
    node.free();
}

#[test]
fn varcall_method_not_found() {
    common::boot();

    let mut obj = Gd::<Object>::new();
    let err = obj
        .try_call("frobnicate", &[Variant::from(1i64)])
        .expect_err("no such method");

    assert_eq!(err.class_name(), Some("Object"));
    assert_eq!(err.method_name(), "call");
    assert_eq!(err.reason(), "method not found");
    assert_eq!(
        err.to_string(),
        "gdbridge function call failed: Object::call(&\"frobnicate\", [va] 1)\n    Reason: method not found"
    );

    obj.free();
}

#[test]
fn varcall_invalid_argument() {
    common::boot();

    let mut obj = Gd::<RefCounted>::new();
    let err = obj
        .try_call("is_class", &[Variant::from(7i64)])
        .expect_err("Int is not a class name");

    assert_eq!(
        err.reason(),
        "parameter #1 -- cannot convert from Int to String"
    );
}

#[test]
fn varcall_wrong_argument_count() {
    common::boot();

    let mut obj = Gd::<RefCounted>::new();

    let err = obj
        .try_call("get_class", &[Variant::nil()])
        .expect_err("too many arguments");
    assert_eq!(
        err.reason(),
        "function has 0 parameters, but received 1 argument"
    );

    let err = obj
        .try_call("is_class", &[])
        .expect_err("too few arguments");
    assert_eq!(
        err.reason(),
        "function has 1 parameter, but received 0 arguments"
    );
}

#[test]
#[should_panic(expected = "method not found")]
fn varcall_panics_through_call() {
    common::boot();

    let mut obj = Gd::<RefCounted>::new();
    obj.call("missing_method", &[]);
}

#[test]
fn method_bind_hash_mismatch() {
    common::boot();

    let key = MethodKey::new("Node", "get_name", 12345);
    let err = sys::try_method_bind(&key).expect_err("hash differs from the engine's");

    assert_eq!(err.key, key);
    assert!(err.to_string().contains("Node::get_name (hash 12345)"));
    assert!(gdbridge_mock::log_contains(
        LogLevel::Error,
        "Hash mismatch for method Node::get_name"
    ));
}

#[test]
fn method_bind_unknown_method() {
    common::boot();

    let key = MethodKey::new("Node", "does_not_exist", 1);
    assert!(sys::try_method_bind(&key).is_err());

    // Inherited methods resolve through the base class.
    let inherited = MethodKey::new("Node2D", "get_name", 2002593661);
    assert!(sys::try_method_bind(&inherited).is_ok());
}

#[test]
fn engine_error_forwarding() {
    common::boot();

    gdbridge_core::godot_error!("custom error {}", 17);
    gdbridge_core::godot_warn!("custom warning");
    gdbridge_core::godot_script_error!("custom script error");

    let entries = gdbridge_mock::log_entries();
    let error = entries
        .iter()
        .find(|e| e.message == "custom error 17")
        .expect("error was forwarded");

    assert_eq!(error.level, LogLevel::Error);
    assert!(error.file.ends_with("call_test.rs"), "{}", error.file);
    assert!(error.line > 0);
    assert!(error.function.contains("engine_error_forwarding"), "{}", error.function);

    assert!(gdbridge_mock::log_contains(LogLevel::Warning, "custom warning"));
    assert!(gdbridge_mock::log_contains(LogLevel::ScriptError, "custom script error"));
}

#[test]
fn panic_is_reported_to_engine() {
    common::boot();

    let result = gdbridge_core::private::handle_panic(
        || "error in test callback",
        || panic!("first line\nsecond line"),
    );

    assert_eq!(result, Err::<(), _>("first line\nsecond line".to_string()));
    assert!(gdbridge_mock::log_contains(
        LogLevel::Error,
        "error in test callback\n[panic]\n  first line\n  second line"
    ));
}
