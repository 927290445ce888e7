/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! `Array` and `Dictionary` storage, and their builtin methods.
//!
//! Both types use an 8-byte handle holding the ID of a reference-counted container in the world. Elements are
//! engine variants in boxed slots, so the operator-index functions can hand out pointers that stay put.

use std::ffi::c_void;
use std::sync::atomic::{AtomicUsize, Ordering};

use gdbridge_ffi as sys;
use sys::{OpaqueVariant, VariantType};

use crate::world::{world, Value, World};
use crate::{log, strings, variant};

pub(crate) static BUILTIN_METHOD_LOOKUPS: AtomicUsize = AtomicUsize::new(0);

const ERR_LOCKED: i64 = 23;
const ERR_INVALID_PARAMETER: i64 = 31;

type Slot = Box<OpaqueVariant>;

pub(crate) struct Container {
    pub refcount: i64,
    pub read_only: bool,
    pub data: ContainerData,
}

pub(crate) enum ContainerData {
    Array(Vec<Slot>),
    /// Insertion-ordered key-value pairs.
    Dictionary(Vec<(Slot, Slot)>),
}

impl ContainerData {
    fn len(&self) -> usize {
        match self {
            ContainerData::Array(slots) => slots.len(),
            ContainerData::Dictionary(entries) => entries.len(),
        }
    }

    /// Moves all elements out, leaving an empty container of the same type.
    fn take(&mut self) -> ContainerData {
        match self {
            ContainerData::Array(slots) => ContainerData::Array(std::mem::take(slots)),
            ContainerData::Dictionary(entries) => ContainerData::Dictionary(std::mem::take(entries)),
        }
    }

    /// Array elements or dictionary keys, in order.
    pub(crate) fn elements(&self) -> Vec<Value> {
        match self {
            ContainerData::Array(slots) => slots.iter().map(|s| read_slot(s)).collect(),
            ContainerData::Dictionary(entries) => entries.iter().map(|(k, _)| read_slot(k)).collect(),
        }
    }

    /// Dictionary entries, in insertion order. Empty for arrays.
    pub(crate) fn entries(&self) -> Vec<(Value, Value)> {
        match self {
            ContainerData::Array(_) => Vec::new(),
            ContainerData::Dictionary(entries) => entries
                .iter()
                .map(|(k, v)| (read_slot(k), read_slot(v)))
                .collect(),
        }
    }

    /// Releases the resources of all elements.
    ///
    /// # Safety
    /// Must be called once per element set, after it was unlinked from its container.
    pub(crate) unsafe fn destroy_elements(self, world: &mut World) {
        match self {
            ContainerData::Array(slots) => {
                for mut slot in slots {
                    variant::destroy(world, slot.as_mut_ptr());
                }
            }
            ContainerData::Dictionary(entries) => {
                for (mut key, mut value) in entries {
                    variant::destroy(world, key.as_mut_ptr());
                    variant::destroy(world, value.as_mut_ptr());
                }
            }
        }
    }
}

/// Number of containers with at least one reference.
pub fn live_containers() -> usize {
    world().containers.len()
}

fn read_slot(slot: &Slot) -> Value {
    // SAFETY: slots always hold an initialized variant.
    unsafe { variant::read(slot.as_ptr()) }
}

/// New slot holding a copy of `value`.
unsafe fn new_slot(world: &mut World, value: Value) -> Slot {
    let mut slot = Box::new(OpaqueVariant::zeroed());
    variant::write(world, slot.as_mut_ptr(), value);
    slot
}

unsafe fn handle_id(ptr: *const c_void) -> u64 {
    *(ptr as *const u64)
}

/// Value tag for the container `id`, used to route retain/release.
fn value_of(world: &World, id: u64) -> Value {
    match world.containers.get(&id).map(|c| &c.data) {
        Some(ContainerData::Dictionary(_)) => Value::Dictionary(id),
        _ => Value::Array(id),
    }
}

fn type_name(data: &ContainerData) -> &'static str {
    match data {
        ContainerData::Array(_) => "Array",
        ContainerData::Dictionary(_) => "Dictionary",
    }
}

/// Logs the engine's error for writes to read-only containers. Returns whether the write may proceed.
fn check_writable(container: &Container) -> bool {
    if container.read_only {
        log::engine_error(format!("{} is in read-only state.", type_name(&container.data)));
    }
    !container.read_only
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Lifecycle

unsafe extern "C" fn array_construct_default(
    base: sys::GDExtensionUninitializedTypePtr,
    _args: *const sys::GDExtensionConstTypePtr,
) {
    let id = world().create_container(ContainerData::Array(Vec::new()));
    *(base as *mut u64) = id;
}

unsafe extern "C" fn dictionary_construct_default(
    base: sys::GDExtensionUninitializedTypePtr,
    _args: *const sys::GDExtensionConstTypePtr,
) {
    let id = world().create_container(ContainerData::Dictionary(Vec::new()));
    *(base as *mut u64) = id;
}

/// Copies share the container.
unsafe extern "C" fn construct_copy(
    base: sys::GDExtensionUninitializedTypePtr,
    args: *const sys::GDExtensionConstTypePtr,
) {
    let id = handle_id(*args);
    let mut world = world();
    let value = value_of(&world, id);
    world.retain(&value);
    *(base as *mut u64) = id;
}

pub(crate) unsafe extern "C" fn destroy(base: sys::GDExtensionTypePtr) {
    let id = handle_id(base);
    let mut world = world();
    let value = value_of(&world, id);
    world.release(&value);
    *(base as *mut u64) = 0;
}

pub(crate) fn constructor(ty: VariantType, index: i32) -> sys::GDExtensionPtrConstructor {
    match (ty, index) {
        (VariantType::Array, 0) => Some(array_construct_default),
        (VariantType::Dictionary, 0) => Some(dictionary_construct_default),
        (VariantType::Array | VariantType::Dictionary, 1) => Some(construct_copy),
        _ => None,
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Variant conversions

pub(crate) unsafe extern "C" fn array_to_variant(
    dest: sys::GDExtensionUninitializedVariantPtr,
    src: sys::GDExtensionTypePtr,
) {
    variant::write(&mut world(), dest, Value::Array(handle_id(src)));
}

pub(crate) unsafe extern "C" fn dictionary_to_variant(
    dest: sys::GDExtensionUninitializedVariantPtr,
    src: sys::GDExtensionTypePtr,
) {
    variant::write(&mut world(), dest, Value::Dictionary(handle_id(src)));
}

/// Shares the variant's array; any other variant converts to a new empty array.
pub(crate) unsafe extern "C" fn variant_to_array(
    dest: sys::GDExtensionUninitializedTypePtr,
    src: sys::GDExtensionVariantPtr,
) {
    let mut world = world();
    let id = match variant::read(src) {
        value @ Value::Array(id) => {
            world.retain(&value);
            id
        }
        _ => world.create_container(ContainerData::Array(Vec::new())),
    };
    *(dest as *mut u64) = id;
}

pub(crate) unsafe extern "C" fn variant_to_dictionary(
    dest: sys::GDExtensionUninitializedTypePtr,
    src: sys::GDExtensionVariantPtr,
) {
    let mut world = world();
    let id = match variant::read(src) {
        value @ Value::Dictionary(id) => {
            world.retain(&value);
            id
        }
        _ => world.create_container(ContainerData::Dictionary(Vec::new())),
    };
    *(dest as *mut u64) = id;
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Element access

/// Like the engine, out-of-bounds access returns null without an error.
pub(crate) unsafe extern "C" fn array_operator_index(
    this: sys::GDExtensionTypePtr,
    index: sys::GDExtensionInt,
) -> sys::GDExtensionVariantPtr {
    let id = handle_id(this);
    let mut world = world();
    let Some(container) = world.containers.get_mut(&id) else {
        log::engine_error("Array::operator[]: array is null or was freed");
        return std::ptr::null_mut();
    };

    let writable = !container.read_only;
    let ContainerData::Array(slots) = &mut container.data else {
        return std::ptr::null_mut();
    };

    let Some(slot) = usize::try_from(index).ok().and_then(|i| slots.get_mut(i)) else {
        return std::ptr::null_mut();
    };

    if !writable {
        log::engine_error("Array is in read-only state.");
        return std::ptr::null_mut();
    }
    slot.as_mut_ptr()
}

pub(crate) unsafe extern "C" fn array_operator_index_const(
    this: sys::GDExtensionConstTypePtr,
    index: sys::GDExtensionInt,
) -> sys::GDExtensionVariantPtr {
    let id = handle_id(this);
    let mut world = world();
    let Some(ContainerData::Array(slots)) = world.containers.get_mut(&id).map(|c| &mut c.data) else {
        log::engine_error("Array::operator[]: array is null or was freed");
        return std::ptr::null_mut();
    };

    match usize::try_from(index).ok().and_then(|i| slots.get_mut(i)) {
        Some(slot) => slot.as_mut_ptr(),
        None => std::ptr::null_mut(),
    }
}

/// Value slot for `key`, inserting nil for a new key.
pub(crate) unsafe extern "C" fn dictionary_operator_index(
    this: sys::GDExtensionTypePtr,
    key: sys::GDExtensionConstVariantPtr,
) -> sys::GDExtensionVariantPtr {
    let id = handle_id(this);
    let key = variant::read(key);
    let mut world = world();

    let (writable, found) = match world.containers.get(&id) {
        Some(container) => match &container.data {
            ContainerData::Dictionary(entries) => (
                check_writable(container),
                entries.iter().position(|(k, _)| read_slot(k) == key),
            ),
            ContainerData::Array(_) => return std::ptr::null_mut(),
        },
        None => {
            log::engine_error("Dictionary::operator[]: dictionary is null or was freed");
            return std::ptr::null_mut();
        }
    };

    if !writable {
        return std::ptr::null_mut();
    }

    let new_entry = match found {
        Some(_) => None,
        None => Some((new_slot(&mut world, key), Box::new(OpaqueVariant::zeroed()))),
    };

    let Some(Container { data: ContainerData::Dictionary(entries), .. }) = world.containers.get_mut(&id) else {
        return std::ptr::null_mut();
    };

    let index = match (found, new_entry) {
        (Some(index), _) => index,
        (None, Some(entry)) => {
            entries.push(entry);
            entries.len() - 1
        }
        (None, None) => return std::ptr::null_mut(),
    };
    entries[index].1.as_mut_ptr()
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Builtin methods

struct BuiltinEntry {
    ty: VariantType,
    name: &'static str,
    hash: i64,
    func: sys::BuiltinMethodBind,
}

macro_rules! builtin_methods {
    ( $( $Ty:ident :: $name:ident ($hash:literal) => $func:ident; )* ) => {
        static BUILTIN_METHODS: &[BuiltinEntry] = &[
            $(
                BuiltinEntry {
                    ty: VariantType::$Ty,
                    name: stringify!($name),
                    hash: $hash,
                    func: $func,
                },
            )*
        ];
    };
}

builtin_methods! {
    Array::size(3173160232) => container_size;
    Array::is_empty(3918633141) => container_is_empty;
    Array::clear(3218959716) => container_clear;
    Array::resize(848867239) => array_resize;
    Array::push_back(3316032543) => array_push_back;
    Array::has(3680194679) => array_has;
    Array::is_read_only(3918633141) => container_is_read_only;
    Array::make_read_only(3218959716) => container_make_read_only;

    Dictionary::size(3173160232) => container_size;
    Dictionary::is_empty(3918633141) => container_is_empty;
    Dictionary::clear(3218959716) => container_clear;
    Dictionary::has(3680194679) => dictionary_has;
    Dictionary::get(2205440559) => dictionary_get;
    Dictionary::erase(1776646889) => dictionary_erase;
    Dictionary::keys(4144163970) => dictionary_keys;
    Dictionary::values(4144163970) => dictionary_values;
    Dictionary::is_read_only(3918633141) => container_is_read_only;
    Dictionary::make_read_only(3218959716) => container_make_read_only;
}

pub(crate) unsafe extern "C" fn variant_get_ptr_builtin_method(
    ty: sys::GDExtensionVariantType,
    method: sys::GDExtensionConstStringNamePtr,
    hash: sys::GDExtensionInt,
) -> sys::GDExtensionPtrBuiltInMethod {
    BUILTIN_METHOD_LOOKUPS.fetch_add(1, Ordering::SeqCst);

    let ty = VariantType::try_from_sys(ty)?;
    let name = strings::read(method);
    let entry = BUILTIN_METHODS.iter().find(|m| m.ty == ty && m.name == name)?;

    if entry.hash != hash {
        log::engine_error(format!(
            "Hash mismatch for builtin method {ty}::{name}: engine has {}, extension requested {hash}",
            entry.hash
        ));
        return None;
    }
    Some(entry.func)
}

unsafe fn arg_value(args: *const sys::GDExtensionConstTypePtr, index: usize) -> Value {
    variant::read(*args.add(index))
}

unsafe fn ret<T>(ret: sys::GDExtensionTypePtr, value: T) {
    *(ret as *mut T) = value;
}

/// Runs `f` with the world locked and the ID of a live container; logs an error for null or freed handles.
unsafe fn with_container<R>(
    base: sys::GDExtensionTypePtr,
    f: impl FnOnce(&mut World, u64) -> R,
) -> Option<R> {
    let id = handle_id(base);
    let mut world = world();
    if world.containers.contains_key(&id) {
        Some(f(&mut world, id))
    } else {
        log::engine_error("builtin method called on a container that is null or was freed");
        None
    }
}

unsafe extern "C" fn container_size(
    base: sys::GDExtensionTypePtr,
    _args: *const sys::GDExtensionConstTypePtr,
    r: sys::GDExtensionTypePtr,
    _argc: i32,
) {
    if let Some(len) = with_container(base, |w, id| w.containers[&id].data.len()) {
        ret(r, len as i64);
    }
}

unsafe extern "C" fn container_is_empty(
    base: sys::GDExtensionTypePtr,
    _args: *const sys::GDExtensionConstTypePtr,
    r: sys::GDExtensionTypePtr,
    _argc: i32,
) {
    if let Some(len) = with_container(base, |w, id| w.containers[&id].data.len()) {
        ret(r, u8::from(len == 0));
    }
}

unsafe extern "C" fn container_clear(
    base: sys::GDExtensionTypePtr,
    _args: *const sys::GDExtensionConstTypePtr,
    _r: sys::GDExtensionTypePtr,
    _argc: i32,
) {
    with_container(base, |w, id| {
        let old = match w.containers.get_mut(&id) {
            Some(container) if check_writable(container) => container.data.take(),
            _ => return,
        };
        old.destroy_elements(w);
    });
}

unsafe extern "C" fn container_is_read_only(
    base: sys::GDExtensionTypePtr,
    _args: *const sys::GDExtensionConstTypePtr,
    r: sys::GDExtensionTypePtr,
    _argc: i32,
) {
    if let Some(read_only) = with_container(base, |w, id| w.containers[&id].read_only) {
        ret(r, u8::from(read_only));
    }
}

unsafe extern "C" fn container_make_read_only(
    base: sys::GDExtensionTypePtr,
    _args: *const sys::GDExtensionConstTypePtr,
    _r: sys::GDExtensionTypePtr,
    _argc: i32,
) {
    with_container(base, |w, id| {
        if let Some(container) = w.containers.get_mut(&id) {
            container.read_only = true;
        }
    });
}

unsafe extern "C" fn array_resize(
    base: sys::GDExtensionTypePtr,
    args: *const sys::GDExtensionConstTypePtr,
    r: sys::GDExtensionTypePtr,
    _argc: i32,
) {
    let new_size: i64 = *(*args as *const i64);

    let code = with_container(base, |w, id| {
        let Some(container) = w.containers.get_mut(&id) else {
            return ERR_INVALID_PARAMETER;
        };
        if !check_writable(container) {
            return ERR_LOCKED;
        }
        let (Ok(new_size), ContainerData::Array(slots)) = (usize::try_from(new_size), &mut container.data) else {
            return ERR_INVALID_PARAMETER;
        };

        // New elements are nil, i.e. zeroed.
        let removed = if new_size < slots.len() {
            slots.split_off(new_size)
        } else {
            slots.resize_with(new_size, || Box::new(OpaqueVariant::zeroed()));
            Vec::new()
        };

        ContainerData::Array(removed).destroy_elements(w);
        0
    });

    ret(r, code.unwrap_or(ERR_INVALID_PARAMETER));
}

unsafe extern "C" fn array_push_back(
    base: sys::GDExtensionTypePtr,
    args: *const sys::GDExtensionConstTypePtr,
    _r: sys::GDExtensionTypePtr,
    _argc: i32,
) {
    let value = arg_value(args, 0);

    with_container(base, |w, id| {
        if !w.containers.get(&id).is_some_and(check_writable) {
            return;
        }

        let slot = new_slot(w, value);
        if let Some(Container { data: ContainerData::Array(slots), .. }) = w.containers.get_mut(&id) {
            slots.push(slot);
        }
    });
}

unsafe extern "C" fn array_has(
    base: sys::GDExtensionTypePtr,
    args: *const sys::GDExtensionConstTypePtr,
    r: sys::GDExtensionTypePtr,
    _argc: i32,
) {
    let value = arg_value(args, 0);
    if let Some(has) = with_container(base, |w, id| w.containers[&id].data.elements().contains(&value)) {
        ret(r, u8::from(has));
    }
}

unsafe extern "C" fn dictionary_has(
    base: sys::GDExtensionTypePtr,
    args: *const sys::GDExtensionConstTypePtr,
    r: sys::GDExtensionTypePtr,
    _argc: i32,
) {
    let key = arg_value(args, 0);
    if let Some(has) = with_container(base, |w, id| w.containers[&id].data.elements().contains(&key)) {
        ret(r, u8::from(has));
    }
}

/// `get(key, default)`, returning a new variant.
unsafe extern "C" fn dictionary_get(
    base: sys::GDExtensionTypePtr,
    args: *const sys::GDExtensionConstTypePtr,
    r: sys::GDExtensionTypePtr,
    _argc: i32,
) {
    let key = arg_value(args, 0);
    let default = arg_value(args, 1);

    with_container(base, |w, id| {
        let found = w.containers[&id]
            .data
            .entries()
            .into_iter()
            .find_map(|(k, v)| (k == key).then_some(v));

        variant::write(w, r, found.unwrap_or(default));
    });
}

unsafe extern "C" fn dictionary_erase(
    base: sys::GDExtensionTypePtr,
    args: *const sys::GDExtensionConstTypePtr,
    r: sys::GDExtensionTypePtr,
    _argc: i32,
) {
    let key = arg_value(args, 0);

    let erased = with_container(base, |w, id| {
        let removed = match w.containers.get_mut(&id) {
            Some(container) if check_writable(container) => match &mut container.data {
                ContainerData::Dictionary(entries) => entries
                    .iter()
                    .position(|(k, _)| read_slot(k) == key)
                    .map(|index| entries.remove(index)),
                ContainerData::Array(_) => None,
            },
            _ => None,
        };

        match removed {
            Some(entry) => {
                ContainerData::Dictionary(vec![entry]).destroy_elements(w);
                true
            }
            None => false,
        }
    });

    ret(r, u8::from(erased.unwrap_or(false)));
}

/// New array holding copies of the keys or values.
unsafe fn dictionary_to_array(base: sys::GDExtensionTypePtr, r: sys::GDExtensionTypePtr, keys: bool) {
    let id = with_container(base, |w, id| {
        let entries = w.containers[&id].data.entries();
        let slots = entries
            .into_iter()
            .map(|(k, v)| new_slot(w, if keys { k } else { v }))
            .collect();

        w.create_container(ContainerData::Array(slots))
    });

    if let Some(id) = id {
        ret(r, id);
    }
}

unsafe extern "C" fn dictionary_keys(
    base: sys::GDExtensionTypePtr,
    _args: *const sys::GDExtensionConstTypePtr,
    r: sys::GDExtensionTypePtr,
    _argc: i32,
) {
    dictionary_to_array(base, r, true);
}

unsafe extern "C" fn dictionary_values(
    base: sys::GDExtensionTypePtr,
    _args: *const sys::GDExtensionConstTypePtr,
    r: sys::GDExtensionTypePtr,
    _argc: i32,
) {
    dictionary_to_array(base, r, false);
}
