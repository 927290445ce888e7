/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Method-binds of the mock classes.
//!
//! Each entry carries the hash under which the engine publishes the method. Lookups with any other hash fail, like
//! they would against an engine with a different API version.

use std::ffi::c_void;

use gdbridge_ffi as sys;

use crate::log;
use crate::strings;
use crate::variant;
use crate::world::{class_info, id_of, inherits, world, Value, World};

type PtrcallFn = unsafe fn(sys::GDExtensionObjectPtr, *const sys::GDExtensionConstTypePtr, sys::GDExtensionTypePtr);
type VarcallFn = unsafe fn(sys::GDExtensionObjectPtr, &[Value]) -> Result<Value, sys::GDExtensionCallError>;

pub(crate) struct MethodEntry {
    pub class: &'static str,
    pub name: &'static str,
    pub hash: i64,
    pub ptrcall: PtrcallFn,
    pub varcall: Option<VarcallFn>,
}

macro_rules! methods {
    ( $( $class:literal :: $name:ident ($hash:literal) => $ptrcall:ident $(, varcall $varcall:ident)?; )* ) => {
        pub(crate) static METHODS: &[MethodEntry] = &[
            $(
                MethodEntry {
                    class: $class,
                    name: stringify!($name),
                    hash: $hash,
                    ptrcall: $ptrcall,
                    varcall: methods!(@varcall $($varcall)?),
                },
            )*
        ];
    };
    (@varcall) => { None };
    (@varcall $varcall:ident) => { Some($varcall) };
}

methods! {
    "Object"::get_class(201670096) => object_get_class;
    "Object"::is_class(3927539163) => object_is_class;
    "Object"::has_method(2619796661) => object_has_method;
    "Object"::get_instance_id(3905245786) => object_get_instance_id;
    "Object"::call(3400424181) => vararg_only, varcall object_call;

    "RefCounted"::init_ref(2240911060) => ref_counted_init_ref;
    "RefCounted"::reference(2240911060) => ref_counted_reference;
    "RefCounted"::unreference(2240911060) => ref_counted_unreference;
    "RefCounted"::get_reference_count(3905245786) => ref_counted_get_reference_count;

    "Resource"::set_path(83702148) => resource_set_path;
    "Resource"::get_path(201670096) => resource_get_path;
    "Resource"::duplicate(482882304) => resource_duplicate;

    "Node"::add_child(3863233950) => node_add_child;
    "Node"::get_child_count(894402480) => node_get_child_count;
    "Node"::get_child(541253412) => node_get_child;
    "Node"::get_parent(3160264692) => node_get_parent;
    "Node"::set_name(3304788590) => node_set_name;
    "Node"::get_name(2002593661) => node_get_name;

    "Node2D"::set_position(743155724) => node2d_set_position;
    "Node2D"::get_position(3341600327) => node2d_get_position;
    "Node2D"::rotate(373806689) => node2d_rotate;
    "Node2D"::get_rotation(1740695150) => node2d_get_rotation;

    "ConfigFile"::set_value(2504492430) => config_set_value;
    "ConfigFile"::get_value(89809366) => config_get_value;
    "ConfigFile"::has_section(3927539163) => config_has_section;
    "ConfigFile"::load(166001499) => config_load;

    "ClassDB"::class_exists(2619796661) => classdb_class_exists;
    "ClassDB"::get_parent_class(1965194235) => classdb_get_parent_class;
    "ClassDB"::is_parent_class(471820014) => classdb_is_parent_class;
    "ClassDB"::can_instantiate(2619796661) => classdb_can_instantiate;
    "ClassDB"::instantiate(2760726917) => classdb_instantiate;
    "ClassDB"::class_set_property(1690314931) => classdb_class_set_property;
}

/// Finds `method` on `class` or its ancestors, requiring the exact hash.
pub(crate) fn find(class: &str, method: &str, hash: i64) -> Option<&'static MethodEntry> {
    let mut current = class_info(class);
    while let Some(info) = current {
        if let Some(entry) = METHODS.iter().find(|m| m.class == info.name && m.name == method) {
            if entry.hash != hash {
                log::engine_error(format!(
                    "Hash mismatch for method {}::{method}: engine has {}, extension requested {hash}",
                    info.name, entry.hash
                ));
                return None;
            }
            return Some(entry);
        }
        current = info.parent.and_then(class_info);
    }
    None
}

fn class_has_method(class: &str, method: &str) -> bool {
    METHODS
        .iter()
        .any(|m| m.name == method && inherits(class, m.class))
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Marshaling helpers

unsafe fn arg<T: Copy>(args: *const sys::GDExtensionConstTypePtr, index: usize) -> T {
    *(*args.add(index) as *const T)
}

unsafe fn arg_text(args: *const sys::GDExtensionConstTypePtr, index: usize) -> String {
    strings::read(*args.add(index))
}

unsafe fn arg_value(args: *const sys::GDExtensionConstTypePtr, index: usize) -> Value {
    variant::read(*args.add(index))
}

unsafe fn ret<T>(ret: sys::GDExtensionTypePtr, value: T) {
    *(ret as *mut T) = value;
}

/// Runs `f` with the world locked and the ID of a live `this`; logs an error for null or freed instances.
unsafe fn with_self<R>(
    this: sys::GDExtensionObjectPtr,
    method: &str,
    f: impl FnOnce(&mut World, u64) -> R,
) -> Option<R> {
    let mut world = world();
    match id_of(this).filter(|id| world.objects.contains_key(id)) {
        Some(id) => Some(f(&mut *world, id)),
        None => {
            log::engine_error(format!("{method}: instance is null or was freed"));
            None
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Object

unsafe fn object_get_class(this: sys::GDExtensionObjectPtr, _args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    if let Some(name) = with_self(this, "Object::get_class", |w, id| w.objects[&id].class.name) {
        strings::assign(r, name.to_string());
    }
}

unsafe fn object_is_class(this: sys::GDExtensionObjectPtr, args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    let class = arg_text(args, 0);
    if let Some(is) = with_self(this, "Object::is_class", |w, id| inherits(w.objects[&id].class.name, &class)) {
        ret(r, u8::from(is));
    }
}

unsafe fn object_has_method(this: sys::GDExtensionObjectPtr, args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    let method = arg_text(args, 0);
    if let Some(has) = with_self(this, "Object::has_method", |w, id| class_has_method(w.objects[&id].class.name, &method)) {
        ret(r, u8::from(has));
    }
}

unsafe fn object_get_instance_id(this: sys::GDExtensionObjectPtr, _args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    if let Some(id) = with_self(this, "Object::get_instance_id", |_, id| id) {
        ret(r, id as i64);
    }
}

unsafe fn vararg_only(_this: sys::GDExtensionObjectPtr, _args: *const sys::GDExtensionConstTypePtr, _r: sys::GDExtensionTypePtr) {
    log::engine_error("vararg method cannot be called through ptrcall");
}

fn call_error(error: sys::GDExtensionCallErrorType, argument: i32, expected: i32) -> sys::GDExtensionCallError {
    sys::GDExtensionCallError { error, argument, expected }
}

fn expect_arg_count(args: &[Value], count: usize) -> Result<(), sys::GDExtensionCallError> {
    if args.len() > count {
        Err(call_error(sys::GDEXTENSION_CALL_ERROR_TOO_MANY_ARGUMENTS, 0, count as i32))
    } else if args.len() < count {
        Err(call_error(sys::GDEXTENSION_CALL_ERROR_TOO_FEW_ARGUMENTS, 0, count as i32))
    } else {
        Ok(())
    }
}

/// `Object.call(method: StringName, ...)`; only a handful of methods are dispatchable dynamically.
unsafe fn object_call(this: sys::GDExtensionObjectPtr, args: &[Value]) -> Result<Value, sys::GDExtensionCallError> {
    let Some((method, rest)) = args.split_first() else {
        return Err(call_error(sys::GDEXTENSION_CALL_ERROR_TOO_FEW_ARGUMENTS, 0, 1));
    };
    let Some(method) = method.as_text() else {
        return Err(call_error(
            sys::GDEXTENSION_CALL_ERROR_INVALID_ARGUMENT,
            0,
            sys::VariantType::StringName.sys(),
        ));
    };

    let mut world = world();
    let Some(id) = id_of(this).filter(|id| world.objects.contains_key(id)) else {
        return Err(call_error(sys::GDEXTENSION_CALL_ERROR_INSTANCE_IS_NULL, 0, 0));
    };
    let obj = &world.objects[&id];
    let invalid_method = call_error(sys::GDEXTENSION_CALL_ERROR_INVALID_METHOD, 0, 0);

    match method {
        "get_class" => {
            expect_arg_count(rest, 0)?;
            Ok(Value::String(obj.class.name.to_string()))
        }
        "is_class" => {
            expect_arg_count(rest, 1)?;
            match rest[0].as_text() {
                Some(class) => Ok(Value::Bool(inherits(obj.class.name, class))),
                None => Err(call_error(
                    sys::GDEXTENSION_CALL_ERROR_INVALID_ARGUMENT,
                    0,
                    sys::VariantType::String.sys(),
                )),
            }
        }
        "get_reference_count" if obj.class.ref_counted => {
            expect_arg_count(rest, 0)?;
            Ok(Value::Int(obj.refcount))
        }
        "get_child_count" if inherits(obj.class.name, "Node") => {
            if rest.len() > 1 {
                return Err(call_error(sys::GDEXTENSION_CALL_ERROR_TOO_MANY_ARGUMENTS, 0, 1));
            }
            Ok(Value::Int(obj.children.len() as i64))
        }
        "set_name" if inherits(obj.class.name, "Node") => {
            expect_arg_count(rest, 1)?;
            let Some(name) = rest[0].as_text() else {
                return Err(call_error(
                    sys::GDEXTENSION_CALL_ERROR_INVALID_ARGUMENT,
                    0,
                    sys::VariantType::StringName.sys(),
                ));
            };
            let name = name.to_string();
            if let Some(obj) = world.objects.get_mut(&id) {
                obj.name = name;
            }
            Ok(Value::Nil)
        }
        _ => Err(invalid_method),
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// RefCounted

fn ref_counted(world: &mut World, id: u64, method: &str) -> bool {
    let is_rc = world.objects[&id].class.ref_counted;
    if !is_rc {
        log::engine_error(format!("RefCounted::{method} called on non-RefCounted object {id}"));
    }
    is_rc
}

fn reference(world: &mut World, id: u64) -> bool {
    match world.objects.get_mut(&id) {
        Some(obj) if obj.refcount > 0 => {
            obj.refcount += 1;
            true
        }
        _ => false,
    }
}

unsafe fn ref_counted_init_ref(this: sys::GDExtensionObjectPtr, _args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    let ok = with_self(this, "RefCounted::init_ref", |w, id| {
        if !ref_counted(w, id, "init_ref") || !reference(w, id) {
            return false;
        }

        // The first reference is already counted at construction; compensate once.
        let obj = w.objects.get_mut(&id).expect("checked above");
        if obj.refcount_init == 1 {
            obj.refcount_init = 0;
            obj.refcount -= 1;
        }
        true
    });
    ret(r, u8::from(ok.unwrap_or(false)));
}

unsafe fn ref_counted_reference(this: sys::GDExtensionObjectPtr, _args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    let ok = with_self(this, "RefCounted::reference", |w, id| ref_counted(w, id, "reference") && reference(w, id));
    ret(r, u8::from(ok.unwrap_or(false)));
}

unsafe fn ref_counted_unreference(this: sys::GDExtensionObjectPtr, _args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    let die = with_self(this, "RefCounted::unreference", |w, id| {
        if !ref_counted(w, id, "unreference") {
            return false;
        }
        let obj = w.objects.get_mut(&id).expect("checked above");
        obj.refcount -= 1;
        obj.refcount == 0
    });
    ret(r, u8::from(die.unwrap_or(false)));
}

unsafe fn ref_counted_get_reference_count(this: sys::GDExtensionObjectPtr, _args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    let count = with_self(this, "RefCounted::get_reference_count", |w, id| w.objects[&id].refcount);
    ret(r, count.unwrap_or(0));
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Resource

unsafe fn resource_set_path(this: sys::GDExtensionObjectPtr, args: *const sys::GDExtensionConstTypePtr, _r: sys::GDExtensionTypePtr) {
    let path = arg_text(args, 0);
    with_self(this, "Resource::set_path", |w, id| {
        if let Some(obj) = w.objects.get_mut(&id) {
            obj.resource_path = path;
        }
    });
}

unsafe fn resource_get_path(this: sys::GDExtensionObjectPtr, _args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    if let Some(path) = with_self(this, "Resource::get_path", |w, id| w.objects[&id].resource_path.clone()) {
        strings::assign(r, path);
    }
}

/// Returns a new resource whose only reference is transferred to the caller.
unsafe fn resource_duplicate(this: sys::GDExtensionObjectPtr, _args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    let copy = with_self(this, "Resource::duplicate", |w, id| {
        let (class, path) = {
            let obj = &w.objects[&id];
            (obj.class, obj.resource_path.clone())
        };
        let (ptr, copy_id) = w.create_referenced(class);
        if let Some(copy) = w.objects.get_mut(&copy_id) {
            copy.resource_path = path;
        }
        ptr
    });
    ret(r, copy.unwrap_or(std::ptr::null_mut()));
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Node, Node2D

unsafe fn node_add_child(this: sys::GDExtensionObjectPtr, args: *const sys::GDExtensionConstTypePtr, _r: sys::GDExtensionTypePtr) {
    let child_ptr: sys::GDExtensionObjectPtr = arg(args, 0);
    let _force_readable_name: u8 = arg(args, 1);
    let _internal: i64 = arg(args, 2);

    with_self(this, "Node::add_child", |w, parent_id| {
        let Some(child_id) = id_of(child_ptr).filter(|id| w.objects.contains_key(id)) else {
            log::engine_error("Parameter \"p_child\" is null.");
            return;
        };

        let child = &w.objects[&child_id];
        if !inherits(child.class.name, "Node") {
            log::engine_error(format!("Can't add child: object {child_id} is not a Node."));
            return;
        }
        if child_id == parent_id {
            log::engine_error(format!("Can't add child '{}' to itself.", child.name));
            return;
        }
        if let Some(existing) = child.parent {
            log::engine_error(format!(
                "Can't add child '{}' to '{}', already has a parent '{}'.",
                child.name, w.objects[&parent_id].name, w.objects[&existing].name
            ));
            return;
        }

        let child = w.objects.get_mut(&child_id).expect("checked above");
        child.parent = Some(parent_id);
        if child.name.is_empty() {
            child.name = format!("@{}@{}", child.class.name, child_id);
        }
        if let Some(parent) = w.objects.get_mut(&parent_id) {
            parent.children.push(child_id);
        }
    });
}

unsafe fn node_get_child_count(this: sys::GDExtensionObjectPtr, _args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    let count = with_self(this, "Node::get_child_count", |w, id| w.objects[&id].children.len() as i64);
    ret(r, count.unwrap_or(0));
}

unsafe fn node_get_child(this: sys::GDExtensionObjectPtr, args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    let index: i64 = arg(args, 0);

    let child = with_self(this, "Node::get_child", |w, id| {
        let children = &w.objects[&id].children;
        let len = children.len() as i64;
        let index = if index < 0 { index + len } else { index };

        if (0..len).contains(&index) {
            w.ptr_of(children[index as usize])
        } else {
            log::engine_error(format!("Index p_index = {index} is out of bounds (count = {len})."));
            None
        }
    });
    ret(r, child.flatten().unwrap_or(std::ptr::null_mut()));
}

unsafe fn node_get_parent(this: sys::GDExtensionObjectPtr, _args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    let parent = with_self(this, "Node::get_parent", |w, id| w.objects[&id].parent.and_then(|p| w.ptr_of(p)));
    ret(r, parent.flatten().unwrap_or(std::ptr::null_mut()));
}

unsafe fn node_set_name(this: sys::GDExtensionObjectPtr, args: *const sys::GDExtensionConstTypePtr, _r: sys::GDExtensionTypePtr) {
    let name = arg_text(args, 0);
    with_self(this, "Node::set_name", |w, id| {
        if let Some(obj) = w.objects.get_mut(&id) {
            obj.name = name;
        }
    });
}

unsafe fn node_get_name(this: sys::GDExtensionObjectPtr, _args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    if let Some(name) = with_self(this, "Node::get_name", |w, id| w.objects[&id].name.clone()) {
        strings::assign(r, name);
    }
}

unsafe fn node2d_set_position(this: sys::GDExtensionObjectPtr, args: *const sys::GDExtensionConstTypePtr, _r: sys::GDExtensionTypePtr) {
    let position: [f32; 2] = arg(args, 0);
    with_self(this, "Node2D::set_position", |w, id| {
        if let Some(obj) = w.objects.get_mut(&id) {
            obj.position = position;
        }
    });
}

unsafe fn node2d_get_position(this: sys::GDExtensionObjectPtr, _args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    if let Some(position) = with_self(this, "Node2D::get_position", |w, id| w.objects[&id].position) {
        ret(r, position);
    }
}

unsafe fn node2d_rotate(this: sys::GDExtensionObjectPtr, args: *const sys::GDExtensionConstTypePtr, _r: sys::GDExtensionTypePtr) {
    let radians: f64 = arg(args, 0);
    with_self(this, "Node2D::rotate", |w, id| {
        if let Some(obj) = w.objects.get_mut(&id) {
            obj.rotation += radians;
        }
    });
}

unsafe fn node2d_get_rotation(this: sys::GDExtensionObjectPtr, _args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    if let Some(rotation) = with_self(this, "Node2D::get_rotation", |w, id| w.objects[&id].rotation) {
        ret(r, rotation);
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// ConfigFile

const OK: i64 = 0;
const ERR_UNAVAILABLE: i64 = 2;
const ERR_FILE_NOT_FOUND: i64 = 7;
const ERR_INVALID_DATA: i64 = 30;
const ERR_PARSE_ERROR: i64 = 43;

unsafe fn config_set_value(this: sys::GDExtensionObjectPtr, args: *const sys::GDExtensionConstTypePtr, _r: sys::GDExtensionTypePtr) {
    let section = arg_text(args, 0);
    let key = arg_text(args, 1);
    let value = arg_value(args, 2);

    with_self(this, "ConfigFile::set_value", |w, id| {
        // Setting nil erases the key, and the section once it is empty.
        if value != Value::Nil {
            w.retain(&value);
        }

        let Some(obj) = w.objects.get_mut(&id) else {
            return;
        };
        let previous = if value == Value::Nil {
            let entries = obj.config.get_mut(&section);
            let previous = entries.and_then(|e| e.remove(&key));
            if obj.config.get(&section).is_some_and(|e| e.is_empty()) {
                obj.config.remove(&section);
            }
            previous
        } else {
            obj.config.entry(section).or_default().insert(key, value)
        };

        if let Some(previous) = previous {
            w.release(&previous);
        }
    });
}

unsafe fn config_get_value(this: sys::GDExtensionObjectPtr, args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    let section = arg_text(args, 0);
    let key = arg_text(args, 1);
    let default = arg_value(args, 2);

    with_self(this, "ConfigFile::get_value", |w, id| {
        let stored = w.objects[&id].config.get(&section).and_then(|e| e.get(&key)).cloned();
        let value = match stored {
            Some(value) => value,
            None => {
                if default == Value::Nil {
                    log::engine_error(format!(
                        "Couldn't find the given section \"{section}\" and key \"{key}\", and no default was given."
                    ));
                }
                default
            }
        };
        variant::assign(w, r, value);
    });
}

unsafe fn config_has_section(this: sys::GDExtensionObjectPtr, args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    let section = arg_text(args, 0);
    let has = with_self(this, "ConfigFile::has_section", |w, id| w.objects[&id].config.contains_key(&section));
    ret(r, u8::from(has.unwrap_or(false)));
}

unsafe fn config_load(this: sys::GDExtensionObjectPtr, args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    let path = arg_text(args, 0);

    let code = with_self(this, "ConfigFile::load", |w, id| {
        let Some(contents) = w.files.get(&path).cloned() else {
            return ERR_FILE_NOT_FOUND;
        };
        let Some(parsed) = parse_config(&contents) else {
            return ERR_PARSE_ERROR;
        };

        let old = match w.objects.get_mut(&id) {
            Some(obj) => std::mem::replace(&mut obj.config, parsed),
            None => return ERR_UNAVAILABLE,
        };
        for value in old.into_values().flat_map(|s| s.into_values()) {
            w.release(&value);
        }
        OK
    });
    ret(r, code.unwrap_or(ERR_UNAVAILABLE));
}

type ConfigMap = std::collections::BTreeMap<String, std::collections::BTreeMap<String, Value>>;

fn parse_config(contents: &str) -> Option<ConfigMap> {
    let mut map = ConfigMap::new();
    let mut section = String::new();

    for line in contents.lines().map(str::trim) {
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            section = rest.strip_suffix(']')?.trim().to_string();
            continue;
        }

        let (key, value) = line.split_once('=')?;
        map.entry(section.clone())
            .or_default()
            .insert(key.trim().to_string(), parse_config_value(value.trim())?);
    }

    Some(map)
}

fn parse_config_value(text: &str) -> Option<Value> {
    if let Some(inner) = text.strip_prefix('"') {
        return Some(Value::String(inner.strip_suffix('"')?.to_string()));
    }
    if let Some(inner) = text.strip_prefix("Vector2(") {
        let (x, y) = inner.strip_suffix(')')?.split_once(',')?;
        return Some(Value::Vector2([x.trim().parse().ok()?, y.trim().parse().ok()?]));
    }

    match text {
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        "null" => Some(Value::Nil),
        _ => text
            .parse::<i64>()
            .map(Value::Int)
            .or_else(|_| text.parse::<f64>().map(Value::Float))
            .ok(),
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// ClassDB singleton

unsafe fn classdb_class_exists(_this: sys::GDExtensionObjectPtr, args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    ret(r, u8::from(class_info(&arg_text(args, 0)).is_some()));
}

unsafe fn classdb_get_parent_class(_this: sys::GDExtensionObjectPtr, args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    let parent = class_info(&arg_text(args, 0)).and_then(|c| c.parent).unwrap_or_default();
    strings::assign(r, parent.to_string());
}

unsafe fn classdb_is_parent_class(_this: sys::GDExtensionObjectPtr, args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    let class = arg_text(args, 0);
    let base = arg_text(args, 1);
    ret(r, u8::from(inherits(&class, &base)));
}

unsafe fn classdb_can_instantiate(_this: sys::GDExtensionObjectPtr, args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    let can = class_info(&arg_text(args, 0)).is_some_and(|c| c.instantiable);
    ret(r, u8::from(can));
}

unsafe fn classdb_instantiate(_this: sys::GDExtensionObjectPtr, args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    let class = arg_text(args, 0);
    let mut world = world();

    let value = match class_info(&class).filter(|c| c.instantiable) {
        Some(info) => {
            let (_, id) = world.create(info);
            Value::Object(id)
        }
        None => {
            log::engine_error(format!("Class '{class}' can't be instantiated."));
            Value::Nil
        }
    };

    variant::assign(&mut world, r, value.clone());

    // The variant took its own reference; drop the construction reference so the variant is the only owner.
    if let Value::Object(id) = value {
        if let Some(obj) = world.objects.get_mut(&id) {
            if obj.class.ref_counted {
                obj.refcount_init = 0;
                obj.refcount -= 1;
            }
        }
    }
}

unsafe fn classdb_class_set_property(_this: sys::GDExtensionObjectPtr, args: *const sys::GDExtensionConstTypePtr, r: sys::GDExtensionTypePtr) {
    let object: sys::GDExtensionObjectPtr = arg(args, 0);
    let property = arg_text(args, 1);
    let value = arg_value(args, 2);

    let mut world = world();
    let Some(obj) = world.get_mut(object) else {
        ret(r, ERR_UNAVAILABLE);
        return;
    };
    let class = obj.class.name;

    let code = match (property.as_str(), value) {
        ("name", value) if inherits(class, "Node") => match value.as_text() {
            Some(name) => {
                obj.name = name.to_string();
                OK
            }
            None => ERR_INVALID_DATA,
        },
        ("position", value) if inherits(class, "Node2D") => match value {
            Value::Vector2(position) => {
                obj.position = position;
                OK
            }
            _ => ERR_INVALID_DATA,
        },
        ("resource_path", value) if inherits(class, "Resource") => match value {
            Value::String(path) => {
                obj.resource_path = path;
                OK
            }
            _ => ERR_INVALID_DATA,
        },
        _ => ERR_UNAVAILABLE,
    };

    ret(r, code);
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Interface functions

pub(crate) unsafe extern "C" fn object_method_bind_ptrcall(
    method_bind: sys::GDExtensionMethodBindPtr,
    instance: sys::GDExtensionObjectPtr,
    args: *const sys::GDExtensionConstTypePtr,
    r_ret: sys::GDExtensionTypePtr,
) {
    let entry = &*(method_bind as *const MethodEntry);
    (entry.ptrcall)(instance, args, r_ret);
}

pub(crate) unsafe extern "C" fn object_method_bind_call(
    method_bind: sys::GDExtensionMethodBindPtr,
    instance: sys::GDExtensionObjectPtr,
    args: *const sys::GDExtensionConstVariantPtr,
    arg_count: sys::GDExtensionInt,
    r_ret: sys::GDExtensionUninitializedVariantPtr,
    r_error: *mut sys::GDExtensionCallError,
) {
    let entry = &*(method_bind as *const MethodEntry);
    let values: Vec<Value> = (0..arg_count.max(0) as usize)
        .map(|i| variant::read(*args.add(i)))
        .collect();

    let result = match entry.varcall {
        Some(varcall) => varcall(instance, &values),
        None => Err(call_error(sys::GDEXTENSION_CALL_ERROR_INVALID_METHOD, 0, 0)),
    };

    let mut world = world();
    match result {
        Ok(value) => {
            *r_error = call_error(sys::GDEXTENSION_CALL_OK, 0, 0);
            variant::write(&mut world, r_ret, value);
        }
        Err(err) => {
            *r_error = err;
            variant::write(&mut world, r_ret, Value::Nil);
        }
    }
}

pub(crate) unsafe extern "C" fn classdb_get_method_bind(
    class_name: sys::GDExtensionConstStringNamePtr,
    method_name: sys::GDExtensionConstStringNamePtr,
    hash: sys::GDExtensionInt,
) -> sys::GDExtensionMethodBindPtr {
    crate::METHOD_BIND_LOOKUPS.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

    let class = strings::read(class_name);
    let method = strings::read(method_name);

    match find(&class, &method, hash) {
        Some(entry) => entry as *const MethodEntry as *const c_void,
        None => std::ptr::null(),
    }
}
