/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

mod common;

use gdbridge_core::builtin::{Array, Dictionary, GString, ToVariant, Variant, VariantType, Vector2};
use gdbridge_core::classes::RefCounted;
use gdbridge_core::global::Error;
use gdbridge_core::obj::Gd;
use gdbridge_mock::LogLevel;

fn rc_id(obj: &Gd<RefCounted>) -> u64 {
    obj.instance_id().to_i64() as u64
}

fn ints(array: &Array) -> Vec<i64> {
    array.iter_shared().map(|v| v.to::<i64>()).collect()
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Array

#[test]
fn array_push_and_get() {
    common::boot();

    let mut array = Array::new();
    assert!(array.is_empty());

    array.push(1i64);
    array.push("two");
    array.push(Vector2::new(3.0, 4.0));

    assert_eq!(array.len(), 3);
    assert!(!array.is_empty());
    assert_eq!(array.at(0).to::<i64>(), 1);
    assert_eq!(array.at(1).to::<GString>(), "two");
    assert_eq!(array.at(2).to::<Vector2>(), Vector2::new(3.0, 4.0));
    assert!(array.get(3).is_none());

    assert!(array.contains("two"));
    assert!(!array.contains(2i64));
}

#[test]
fn array_collect_and_iterate() {
    common::boot();

    let array: Array = [1i64, 2, 3].into_iter().collect();
    assert_eq!(ints(&array), [1, 2, 3]);
    assert_eq!(format!("{array:?}"), "[1, 2, 3]");
}

#[test]
fn array_clone_shares_storage() {
    common::boot();

    let array = Array::new();
    let mut shared = array.clone();
    shared.push(7i64);

    assert_eq!(array.len(), 1);
    assert_eq!(array.at(0).to::<i64>(), 7);

    drop(shared);
    assert_eq!(ints(&array), [7]);
}

#[test]
fn array_set_replaces_element() {
    common::boot();

    let mut array: Array = [1i64, 2].into_iter().collect();
    array.set(1, "replaced");

    assert_eq!(array.len(), 2);
    assert_eq!(array.at(1).to::<String>(), "replaced");
}

#[test]
#[should_panic(expected = "Array index 3 is out of bounds: length is 2")]
fn array_set_out_of_bounds_panics() {
    common::boot();

    let mut array: Array = [1i64, 2].into_iter().collect();
    array.set(3, 0i64);
}

#[test]
#[should_panic(expected = "Array index 0 is out of bounds: length is 0")]
fn array_at_out_of_bounds_panics() {
    common::boot();

    Array::new().at(0);
}

#[test]
fn array_resize_and_clear() {
    common::boot();

    let mut array: Array = [5i64].into_iter().collect();
    assert_eq!(array.resize(3), Ok(()));
    assert_eq!(array.len(), 3);
    assert!(array.at(2).is_nil());

    assert_eq!(array.resize(1), Ok(()));
    assert_eq!(ints(&array), [5]);

    array.clear();
    assert!(array.is_empty());
}

#[test]
fn array_read_only_rejects_writes() {
    common::boot();

    let mut array: Array = [1i64].into_iter().collect();
    let mut shared = array.clone();
    assert!(!array.is_read_only());

    array.make_read_only();
    assert!(array.is_read_only());
    assert!(shared.is_read_only());

    shared.push(2i64);
    assert!(gdbridge_mock::log_contains(LogLevel::Error, "Array is in read-only state."));
    assert_eq!(array.resize(5), Err(Error::ERR_LOCKED));

    array.set(0, 10i64);
    array.clear();

    // Reads still work, and nothing changed.
    assert_eq!(ints(&array), [1]);
}

#[test]
fn array_variant_conversion() {
    common::boot();

    let array: Array = [Variant::from(1i64), Variant::from("a")].into_iter().collect();
    let variant = array.to_variant();

    assert_eq!(variant.get_type(), VariantType::Array);
    assert_eq!(variant.to_string(), "[1, \"a\"]");
    assert_eq!(array.to_string(), "[1, \"a\"]");

    // Converting back yields another reference to the same array.
    let mut back = variant.to::<Array>();
    back.push(2i64);
    assert_eq!(array.len(), 3);

    assert!(Variant::from(1i64).try_to::<Array>().is_err());
}

#[test]
fn array_elements_hold_object_references() {
    common::boot();

    let obj = Gd::<RefCounted>::new();
    let id = rc_id(&obj);

    let mut array = Array::new();
    array.push(&obj);
    array.push(&obj);
    assert_eq!(gdbridge_mock::reference_count(id), Some(3));

    array.resize(1).expect("resize");
    assert_eq!(gdbridge_mock::reference_count(id), Some(2));

    let back = array.at(0).to::<Gd<RefCounted>>();
    assert_eq!(back, obj);
    drop(back);

    // Dropping the last array reference releases its elements.
    drop(array);
    assert_eq!(gdbridge_mock::reference_count(id), Some(1));
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Dictionary

#[test]
fn dictionary_set_and_get() {
    common::boot();

    let mut dict = Dictionary::new();
    assert!(dict.is_empty());

    dict.set("a", 1i64);
    dict.set("b", "text");
    dict.set(3i64, Vector2::new(1.0, 2.0));

    assert_eq!(dict.len(), 3);
    assert!(dict.contains_key("a"));
    assert!(!dict.contains_key("z"));
    assert_eq!(dict.get("a").map(|v| v.to::<i64>()), Some(1));
    assert_eq!(dict.get(3i64).map(|v| v.to::<Vector2>()), Some(Vector2::new(1.0, 2.0)));
    assert!(dict.get("z").is_none());

    dict.set("a", 2i64);
    assert_eq!(dict.len(), 3);
    assert_eq!(dict.get_or_nil("a").to::<i64>(), 2);
}

#[test]
fn dictionary_nil_values() {
    common::boot();

    let mut dict = Dictionary::new();
    dict.set("nothing", Variant::nil());

    let stored = dict.get("nothing").expect("key is present");
    assert!(stored.is_nil());
    assert!(dict.get_or_nil("missing").is_nil());
    assert!(dict.get("missing").is_none());
}

#[test]
fn dictionary_keys_values_in_insertion_order() {
    common::boot();

    let dict: Dictionary = [("z", 1i64), ("a", 2), ("m", 3)].into_iter().collect();

    let keys: Vec<String> = dict.keys_array().iter_shared().map(|k| k.to::<String>()).collect();
    assert_eq!(keys, ["z", "a", "m"]);
    assert_eq!(ints(&dict.values_array()), [1, 2, 3]);

    let pairs: Vec<(String, i64)> = dict
        .iter_shared()
        .map(|(k, v)| (k.to::<String>(), v.to::<i64>()))
        .collect();
    assert_eq!(pairs, [("z".to_string(), 1), ("a".to_string(), 2), ("m".to_string(), 3)]);
}

#[test]
fn dictionary_remove_and_clear() {
    common::boot();

    let mut dict: Dictionary = [("a", 1i64), ("b", 2)].into_iter().collect();

    assert_eq!(dict.remove("a").map(|v| v.to::<i64>()), Some(1));
    assert!(dict.remove("a").is_none());
    assert_eq!(dict.len(), 1);

    dict.clear();
    assert!(dict.is_empty());
}

#[test]
fn dictionary_read_only_rejects_writes() {
    common::boot();

    let mut dict: Dictionary = [("a", 1i64)].into_iter().collect();
    dict.make_read_only();
    assert!(dict.is_read_only());

    dict.set("a", 5i64);
    dict.set("b", 6i64);
    assert!(gdbridge_mock::log_contains(LogLevel::Error, "Dictionary is in read-only state."));

    assert!(dict.remove("a").is_none());
    assert_eq!(dict.len(), 1);
    assert_eq!(dict.get("a").map(|v| v.to::<i64>()), Some(1));
}

#[test]
fn dictionary_variant_conversion_and_display() {
    common::boot();

    let dict: Dictionary = [("key", 1i64)].into_iter().collect();
    let variant = dict.to_variant();

    assert_eq!(variant.get_type(), VariantType::Dictionary);
    assert_eq!(dict.to_string(), "{ \"key\": 1 }");
    assert_eq!(format!("{dict:?}"), "{\"key\": 1}");

    let mut back = variant.to::<Dictionary>();
    back.set("other", 2i64);
    assert_eq!(dict.len(), 2);

    assert!(variant.try_to::<Array>().is_err());
}

#[test]
fn dictionary_values_hold_object_references() {
    common::boot();

    let obj = Gd::<RefCounted>::new();
    let id = rc_id(&obj);

    let mut dict = Dictionary::new();
    dict.set("obj", &obj);
    assert_eq!(gdbridge_mock::reference_count(id), Some(2));

    // Overwriting releases the previous value.
    dict.set("obj", 0i64);
    assert_eq!(gdbridge_mock::reference_count(id), Some(1));

    dict.set(&obj, "as key");
    assert_eq!(gdbridge_mock::reference_count(id), Some(2));
    drop(dict);
    assert_eq!(gdbridge_mock::reference_count(id), Some(1));
}

#[test]
fn nested_containers() {
    common::boot();

    let inner: Array = [1i64, 2].into_iter().collect();
    let mut dict = Dictionary::new();
    dict.set("list", &inner);

    let mut from_dict = dict.get("list").expect("present").to::<Array>();
    from_dict.push(3i64);

    assert_eq!(ints(&inner), [1, 2, 3]);
    assert_eq!(dict.to_string(), "{ \"list\": [1, 2, 3] }");
}
