/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Object graph of the mock engine.

use std::collections::{BTreeMap, HashMap};
use std::ffi::c_void;

use gdbridge_ffi as sys;
use sys::{Global, GlobalGuard};

use crate::containers::{Container, ContainerData};

pub(crate) const REF_COUNTED_BIT: u64 = 1 << 63;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Classes

pub struct ClassInfo {
    pub name: &'static str,
    pub parent: Option<&'static str>,
    pub ref_counted: bool,
    pub instantiable: bool,
}

pub(crate) static CLASSES: [ClassInfo; 7] = [
    ClassInfo { name: "Object", parent: None, ref_counted: false, instantiable: true },
    ClassInfo { name: "RefCounted", parent: Some("Object"), ref_counted: true, instantiable: true },
    ClassInfo { name: "Resource", parent: Some("RefCounted"), ref_counted: true, instantiable: true },
    ClassInfo { name: "ConfigFile", parent: Some("RefCounted"), ref_counted: true, instantiable: true },
    ClassInfo { name: "Node", parent: Some("Object"), ref_counted: false, instantiable: true },
    ClassInfo { name: "Node2D", parent: Some("Node"), ref_counted: false, instantiable: true },
    ClassInfo { name: "ClassDB", parent: Some("Object"), ref_counted: false, instantiable: false },
];

pub(crate) fn class_info(name: &str) -> Option<&'static ClassInfo> {
    CLASSES.iter().find(|c| c.name == name)
}

/// Whether `class` is `base` or derives from it.
pub(crate) fn inherits(class: &str, base: &str) -> bool {
    let mut current = class_info(class);
    while let Some(info) = current {
        if info.name == base {
            return true;
        }
        current = info.parent.and_then(class_info);
    }
    false
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Values

/// Owned content of a variant, as stored engine-side (config entries, variant payloads).
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    StringName(String),
    Vector2([f32; 2]),
    Vector2i([i32; 2]),
    Vector3([f32; 3]),
    Object(u64),
    /// Container ID; copies share the container.
    Array(u64),
    Dictionary(u64),
}

impl Value {
    pub(crate) fn variant_type(&self) -> sys::VariantType {
        match self {
            Value::Nil => sys::VariantType::Nil,
            Value::Bool(_) => sys::VariantType::Bool,
            Value::Int(_) => sys::VariantType::Int,
            Value::Float(_) => sys::VariantType::Float,
            Value::String(_) => sys::VariantType::String,
            Value::StringName(_) => sys::VariantType::StringName,
            Value::Vector2(_) => sys::VariantType::Vector2,
            Value::Vector2i(_) => sys::VariantType::Vector2i,
            Value::Vector3(_) => sys::VariantType::Vector3,
            Value::Object(_) => sys::VariantType::Object,
            Value::Array(_) => sys::VariantType::Array,
            Value::Dictionary(_) => sys::VariantType::Dictionary,
        }
    }

    /// Text content for `String` and `StringName`.
    pub(crate) fn as_text(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::StringName(s) => Some(s),
            _ => None,
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Objects

pub(crate) struct MockObject {
    pub class: &'static ClassInfo,
    pub ptr: sys::GDExtensionObjectPtr,
    pub refcount: i64,
    pub refcount_init: i64,
    pub parent: Option<u64>,
    pub children: Vec<u64>,
    pub name: String,
    pub position: [f32; 2],
    pub rotation: f64,
    pub resource_path: String,
    pub config: BTreeMap<String, BTreeMap<String, Value>>,
}

#[derive(Default)]
pub(crate) struct World {
    pub objects: HashMap<u64, MockObject>,
    pub singletons: HashMap<&'static str, u64>,
    pub files: HashMap<String, String>,
    pub containers: HashMap<u64, Container>,
    next_id: u64,
    next_container_id: u64,
}

// SAFETY: object pointers are addresses of leaked boxes, only used as identity tokens.
unsafe impl Send for World {}

static WORLD: Global<World> = Global::default();

pub(crate) fn world() -> GlobalGuard<'static, World> {
    WORLD.lock()
}

/// Reads the instance ID behind an object pointer. The boxes behind pointers are never freed.
pub(crate) unsafe fn id_of(ptr: sys::GDExtensionConstObjectPtr) -> Option<u64> {
    if ptr.is_null() {
        None
    } else {
        Some(*(ptr as *const u64))
    }
}

impl World {
    pub fn create(&mut self, class: &'static ClassInfo) -> (sys::GDExtensionObjectPtr, u64) {
        self.next_id += 1;
        let id = if class.ref_counted {
            self.next_id | REF_COUNTED_BIT
        } else {
            self.next_id
        };

        let ptr = Box::leak(Box::new(id)) as *mut u64 as *mut c_void;
        self.objects.insert(
            id,
            MockObject {
                class,
                ptr,
                refcount: 1,
                refcount_init: 1,
                parent: None,
                children: Vec::new(),
                name: String::new(),
                position: [0.0; 2],
                rotation: 0.0,
                resource_path: String::new(),
                config: BTreeMap::new(),
            },
        );

        (ptr, id)
    }

    /// Creates a RefCounted object whose single reference is already handed out.
    pub fn create_referenced(&mut self, class: &'static ClassInfo) -> (sys::GDExtensionObjectPtr, u64) {
        let (ptr, id) = self.create(class);
        if let Some(obj) = self.objects.get_mut(&id) {
            obj.refcount_init = 0;
        }
        (ptr, id)
    }

    pub unsafe fn get(&self, ptr: sys::GDExtensionConstObjectPtr) -> Option<(u64, &MockObject)> {
        let id = id_of(ptr)?;
        self.objects.get(&id).map(|obj| (id, obj))
    }

    pub unsafe fn get_mut(&mut self, ptr: sys::GDExtensionConstObjectPtr) -> Option<&mut MockObject> {
        let id = id_of(ptr)?;
        self.objects.get_mut(&id)
    }

    pub fn ptr_of(&self, id: u64) -> Option<sys::GDExtensionObjectPtr> {
        self.objects.get(&id).map(|obj| obj.ptr)
    }

    /// Adds a reference held by a variant or container.
    pub fn retain(&mut self, value: &Value) {
        match value {
            Value::Object(id) => {
                if let Some(obj) = self.objects.get_mut(id) {
                    if obj.class.ref_counted {
                        obj.refcount += 1;
                    }
                }
            }
            Value::Array(id) | Value::Dictionary(id) => {
                if let Some(container) = self.containers.get_mut(id) {
                    container.refcount += 1;
                }
            }
            _ => {}
        }
    }

    /// Drops a reference held by a variant or container; frees the object or container at zero.
    pub fn release(&mut self, value: &Value) {
        match value {
            Value::Object(id) => {
                let dead = match self.objects.get_mut(id) {
                    Some(obj) if obj.class.ref_counted => {
                        obj.refcount -= 1;
                        obj.refcount == 0
                    }
                    _ => false,
                };

                if dead {
                    self.destroy(*id);
                }
            }
            Value::Array(id) | Value::Dictionary(id) => {
                let dead = match self.containers.get_mut(id) {
                    Some(container) => {
                        container.refcount -= 1;
                        container.refcount == 0
                    }
                    None => false,
                };

                if dead {
                    if let Some(container) = self.containers.remove(id) {
                        // SAFETY: the container is unlinked, its element variants are destroyed exactly once.
                        unsafe { container.data.destroy_elements(self) };
                    }
                }
            }
            _ => {}
        }
    }

    /// New container with a single reference, returning its ID.
    pub fn create_container(&mut self, data: ContainerData) -> u64 {
        self.next_container_id += 1;
        let id = self.next_container_id;
        self.containers.insert(
            id,
            Container {
                refcount: 1,
                read_only: false,
                data,
            },
        );
        id
    }

    /// Frees an object together with its children, and releases values it holds.
    pub fn destroy(&mut self, id: u64) {
        let Some(obj) = self.objects.remove(&id) else {
            return;
        };

        if let Some(parent) = obj.parent.and_then(|p| self.objects.get_mut(&p)) {
            parent.children.retain(|&c| c != id);
        }

        for child in obj.children {
            if let Some(child_obj) = self.objects.get_mut(&child) {
                child_obj.parent = None;
            }
            self.destroy(child);
        }

        for section in obj.config.into_values() {
            for value in section.into_values() {
                self.release(&value);
            }
        }
    }
}
