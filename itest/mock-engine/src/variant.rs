/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! 24-byte variant representation: a type tag followed by two payload words.
//!
//! Strings are owned by the variant through a heap pointer. Object variants hold a reference if the object is
//! RefCounted; container variants always hold one.

use std::ffi::c_void;

use gdbridge_ffi as sys;
use sys::VariantType;

use crate::containers::{
    array_to_variant, dictionary_to_variant, variant_to_array, variant_to_dictionary, ContainerData,
};
use crate::strings;
use crate::world::{world, Value, World};

#[repr(C)]
#[derive(Copy, Clone)]
struct RawVariant {
    tag: u32,
    _pad: u32,
    a: u64,
    b: u64,
}

sys::static_assert!(std::mem::size_of::<RawVariant>() == 24);

fn pack_f32(x: f32, y: f32) -> u64 {
    x.to_bits() as u64 | ((y.to_bits() as u64) << 32)
}

fn unpack_f32(word: u64) -> [f32; 2] {
    [f32::from_bits(word as u32), f32::from_bits((word >> 32) as u32)]
}

/// Reads a variant without taking ownership. Strings are cloned.
pub(crate) unsafe fn read(ptr: sys::GDExtensionConstVariantPtr) -> Value {
    let raw = *(ptr as *const RawVariant);
    let text = |word: u64| strings::read(&word as *const u64 as *const c_void);

    match VariantType::try_from_sys(raw.tag as i32) {
        Some(VariantType::Bool) => Value::Bool(raw.a != 0),
        Some(VariantType::Int) => Value::Int(raw.a as i64),
        Some(VariantType::Float) => Value::Float(f64::from_bits(raw.a)),
        Some(VariantType::String) => Value::String(text(raw.a)),
        Some(VariantType::StringName) => Value::StringName(text(raw.a)),
        Some(VariantType::Vector2) => Value::Vector2(unpack_f32(raw.a)),
        Some(VariantType::Vector2i) => Value::Vector2i([raw.a as u32 as i32, (raw.a >> 32) as u32 as i32]),
        Some(VariantType::Vector3) => {
            let [x, y] = unpack_f32(raw.a);
            Value::Vector3([x, y, f32::from_bits(raw.b as u32)])
        }
        Some(VariantType::Object) => Value::Object(raw.b),
        Some(VariantType::Array) => Value::Array(raw.a),
        Some(VariantType::Dictionary) => Value::Dictionary(raw.a),
        _ => Value::Nil,
    }
}

/// Writes `value` into an uninitialized variant slot. Takes a reference for RefCounted objects.
pub(crate) unsafe fn write(world: &mut World, ptr: sys::GDExtensionUninitializedVariantPtr, value: Value) {
    let mut raw = RawVariant {
        tag: value.variant_type().sys() as u32,
        _pad: 0,
        a: 0,
        b: 0,
    };

    match &value {
        Value::Nil => {}
        Value::Bool(v) => raw.a = u64::from(*v),
        Value::Int(v) => raw.a = *v as u64,
        Value::Float(v) => raw.a = v.to_bits(),
        Value::String(s) | Value::StringName(s) => raw.a = strings::alloc(s.clone()) as u64,
        Value::Vector2([x, y]) => raw.a = pack_f32(*x, *y),
        Value::Vector2i([x, y]) => raw.a = (*x as u32 as u64) | ((*y as u32 as u64) << 32),
        Value::Vector3([x, y, z]) => {
            raw.a = pack_f32(*x, *y);
            raw.b = z.to_bits() as u64;
        }
        Value::Object(id) => {
            raw.a = world.ptr_of(*id).map_or(0, |p| p as u64);
            raw.b = *id;
        }
        Value::Array(id) | Value::Dictionary(id) => raw.a = *id,
    }

    world.retain(&value);
    *(ptr as *mut RawVariant) = raw;
}

/// Releases the variant's resources and leaves it nil.
pub(crate) unsafe fn destroy(world: &mut World, ptr: sys::GDExtensionVariantPtr) {
    let raw = *(ptr as *const RawVariant);

    match VariantType::try_from_sys(raw.tag as i32) {
        Some(VariantType::String | VariantType::StringName) => strings::free(raw.a as strings::StringRepr),
        Some(VariantType::Object) => world.release(&Value::Object(raw.b)),
        Some(VariantType::Array) => world.release(&Value::Array(raw.a)),
        Some(VariantType::Dictionary) => world.release(&Value::Dictionary(raw.a)),
        _ => {}
    }

    *(ptr as *mut RawVariant) = RawVariant { tag: 0, _pad: 0, a: 0, b: 0 };
}

/// Replaces the content of an initialized variant.
pub(crate) unsafe fn assign(world: &mut World, ptr: sys::GDExtensionVariantPtr, value: Value) {
    destroy(world, ptr);
    write(world, ptr, value);
}

pub(crate) fn stringify(world: &World, value: &Value) -> String {
    match value {
        Value::Nil => "<null>".to_string(),
        Value::Bool(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::Float(v) if v.fract() == 0.0 && v.is_finite() => format!("{v:.1}"),
        Value::Float(v) => v.to_string(),
        Value::String(s) | Value::StringName(s) => s.clone(),
        Value::Vector2([x, y]) => format!("({x}, {y})"),
        Value::Vector2i([x, y]) => format!("({x}, {y})"),
        Value::Vector3([x, y, z]) => format!("({x}, {y}, {z})"),
        Value::Object(0) => "<Object#null>".to_string(),
        Value::Object(id) => match world.objects.get(id) {
            Some(obj) => format!("<{}#{}>", obj.class.name, id),
            None => "<Freed Object>".to_string(),
        },
        Value::Array(id) => {
            let elements = match world.containers.get(id).map(|c| &c.data) {
                Some(data @ ContainerData::Array(_)) => data.elements(),
                _ => Vec::new(),
            };
            let items: Vec<String> = elements.iter().map(|v| stringify_nested(world, v)).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Dictionary(id) => {
            let entries = world.containers.get(id).map(|c| c.data.entries()).unwrap_or_default();
            let items: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", stringify_nested(world, k), stringify_nested(world, v)))
                .collect();
            format!("{{ {} }}", items.join(", "))
        }
    }
}

/// Inside containers, strings are quoted.
fn stringify_nested(world: &World, value: &Value) -> String {
    match value {
        Value::String(s) => format!("{s:?}"),
        Value::StringName(s) => format!("&{s:?}"),
        _ => stringify(world, value),
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Interface functions

pub(crate) unsafe extern "C" fn variant_new_copy(
    dest: sys::GDExtensionUninitializedVariantPtr,
    src: sys::GDExtensionConstVariantPtr,
) {
    let value = read(src);
    write(&mut world(), dest, value);
}

pub(crate) unsafe extern "C" fn variant_new_nil(dest: sys::GDExtensionUninitializedVariantPtr) {
    write(&mut world(), dest, Value::Nil);
}

pub(crate) unsafe extern "C" fn variant_destroy(this: sys::GDExtensionVariantPtr) {
    destroy(&mut world(), this);
}

pub(crate) unsafe extern "C" fn variant_get_type(
    this: sys::GDExtensionConstVariantPtr,
) -> sys::GDExtensionVariantType {
    read(this).variant_type().sys()
}

pub(crate) unsafe extern "C" fn variant_stringify(
    this: sys::GDExtensionConstVariantPtr,
    ret: sys::GDExtensionStringPtr,
) {
    let value = read(this);
    let text = stringify(&world(), &value);
    strings::write(ret, text);
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Type conversions

macro_rules! conversions {
    ( $( $Ty:ident => $from:ident, $to:ident; )* ) => {
        pub(crate) fn from_type_constructor(ty: sys::GDExtensionVariantType) -> sys::GDExtensionVariantFromTypeConstructorFunc {
            match VariantType::try_from_sys(ty) {
                $( Some(VariantType::$Ty) => Some($from), )*
                _ => None,
            }
        }

        pub(crate) fn to_type_constructor(ty: sys::GDExtensionVariantType) -> sys::GDExtensionTypeFromVariantConstructorFunc {
            match VariantType::try_from_sys(ty) {
                $( Some(VariantType::$Ty) => Some($to), )*
                _ => None,
            }
        }
    };
}

conversions! {
    Bool => bool_to_variant, variant_to_bool;
    Int => int_to_variant, variant_to_int;
    Float => float_to_variant, variant_to_float;
    String => string_to_variant, variant_to_string;
    StringName => string_name_to_variant, variant_to_string;
    Vector2 => vector2_to_variant, variant_to_vector2;
    Vector2i => vector2i_to_variant, variant_to_vector2i;
    Vector3 => vector3_to_variant, variant_to_vector3;
    Object => object_to_variant, variant_to_object;
    Array => array_to_variant, variant_to_array;
    Dictionary => dictionary_to_variant, variant_to_dictionary;
}

unsafe extern "C" fn bool_to_variant(dest: sys::GDExtensionUninitializedVariantPtr, src: sys::GDExtensionTypePtr) {
    write(&mut world(), dest, Value::Bool(*(src as *const u8) != 0));
}

unsafe extern "C" fn int_to_variant(dest: sys::GDExtensionUninitializedVariantPtr, src: sys::GDExtensionTypePtr) {
    write(&mut world(), dest, Value::Int(*(src as *const i64)));
}

unsafe extern "C" fn float_to_variant(dest: sys::GDExtensionUninitializedVariantPtr, src: sys::GDExtensionTypePtr) {
    write(&mut world(), dest, Value::Float(*(src as *const f64)));
}

unsafe extern "C" fn string_to_variant(dest: sys::GDExtensionUninitializedVariantPtr, src: sys::GDExtensionTypePtr) {
    write(&mut world(), dest, Value::String(strings::read(src)));
}

unsafe extern "C" fn string_name_to_variant(dest: sys::GDExtensionUninitializedVariantPtr, src: sys::GDExtensionTypePtr) {
    write(&mut world(), dest, Value::StringName(strings::read(src)));
}

unsafe extern "C" fn vector2_to_variant(dest: sys::GDExtensionUninitializedVariantPtr, src: sys::GDExtensionTypePtr) {
    write(&mut world(), dest, Value::Vector2(*(src as *const [f32; 2])));
}

unsafe extern "C" fn vector2i_to_variant(dest: sys::GDExtensionUninitializedVariantPtr, src: sys::GDExtensionTypePtr) {
    write(&mut world(), dest, Value::Vector2i(*(src as *const [i32; 2])));
}

unsafe extern "C" fn vector3_to_variant(dest: sys::GDExtensionUninitializedVariantPtr, src: sys::GDExtensionTypePtr) {
    write(&mut world(), dest, Value::Vector3(*(src as *const [f32; 3])));
}

unsafe extern "C" fn object_to_variant(dest: sys::GDExtensionUninitializedVariantPtr, src: sys::GDExtensionTypePtr) {
    let mut world = world();
    let object_ptr = *(src as *const sys::GDExtensionObjectPtr);
    // Like the engine, a null object still makes an Object-typed variant.
    let value = match world.get(object_ptr) {
        Some((id, _)) => Value::Object(id),
        None if object_ptr.is_null() => Value::Object(0),
        None => Value::Nil,
    };
    write(&mut world, dest, value);
}

unsafe extern "C" fn variant_to_bool(dest: sys::GDExtensionUninitializedTypePtr, src: sys::GDExtensionVariantPtr) {
    *(dest as *mut u8) = matches!(read(src), Value::Bool(true)) as u8;
}

unsafe extern "C" fn variant_to_int(dest: sys::GDExtensionUninitializedTypePtr, src: sys::GDExtensionVariantPtr) {
    *(dest as *mut i64) = match read(src) {
        Value::Int(v) => v,
        _ => 0,
    };
}

unsafe extern "C" fn variant_to_float(dest: sys::GDExtensionUninitializedTypePtr, src: sys::GDExtensionVariantPtr) {
    *(dest as *mut f64) = match read(src) {
        Value::Float(v) => v,
        _ => 0.0,
    };
}

unsafe extern "C" fn variant_to_string(dest: sys::GDExtensionUninitializedTypePtr, src: sys::GDExtensionVariantPtr) {
    let text = read(src).as_text().map(str::to_owned).unwrap_or_default();
    strings::write(dest, text);
}

unsafe extern "C" fn variant_to_vector2(dest: sys::GDExtensionUninitializedTypePtr, src: sys::GDExtensionVariantPtr) {
    *(dest as *mut [f32; 2]) = match read(src) {
        Value::Vector2(v) => v,
        _ => [0.0; 2],
    };
}

unsafe extern "C" fn variant_to_vector2i(dest: sys::GDExtensionUninitializedTypePtr, src: sys::GDExtensionVariantPtr) {
    *(dest as *mut [i32; 2]) = match read(src) {
        Value::Vector2i(v) => v,
        _ => [0; 2],
    };
}

unsafe extern "C" fn variant_to_vector3(dest: sys::GDExtensionUninitializedTypePtr, src: sys::GDExtensionVariantPtr) {
    *(dest as *mut [f32; 3]) = match read(src) {
        Value::Vector3(v) => v,
        _ => [0.0; 3],
    };
}

unsafe extern "C" fn variant_to_object(dest: sys::GDExtensionUninitializedTypePtr, src: sys::GDExtensionVariantPtr) {
    let ptr = match read(src) {
        Value::Object(id) => world().ptr_of(id).unwrap_or(std::ptr::null_mut()),
        _ => std::ptr::null_mut(),
    };
    *(dest as *mut sys::GDExtensionObjectPtr) = ptr;
}
