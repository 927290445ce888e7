/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! `get_proc_address` and the object/ClassDB part of the interface.

use std::ffi::{c_char, c_void, CStr, CString};

use gdbridge_ffi as sys;
use sys::Global;

use crate::world::{class_info, inherits, world, ClassInfo, CLASSES};
use crate::{containers, log, methods, strings, variant};

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Version

struct ReportedVersion {
    major: u32,
    minor: u32,
    patch: u32,
    string: CString,
}

static VERSION: Global<ReportedVersion> = Global::new(|| ReportedVersion {
    major: 4,
    minor: 3,
    patch: 0,
    string: CString::new("Godot Engine v4.3.stable.mock").unwrap_or_default(),
});

/// Changes the version that `get_godot_version` reports to extensions loaded afterwards.
pub fn set_reported_version(major: u32, minor: u32, patch: u32) {
    let mut version = VERSION.lock();
    version.major = major;
    version.minor = minor;
    version.patch = patch;
    version.string = CString::new(format!("Godot Engine v{major}.{minor}.{patch}.stable.mock")).unwrap_or_default();
}

unsafe extern "C" fn get_godot_version(r_godot_version: *mut sys::GDExtensionGodotVersion) {
    let version = VERSION.lock();

    // The CString lives in a static and is only replaced between loads.
    *r_godot_version = sys::GDExtensionGodotVersion {
        major: version.major,
        minor: version.minor,
        patch: version.patch,
        string: version.string.as_ptr(),
    };
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Objects

fn class_tag(info: &'static ClassInfo) -> *mut c_void {
    info as *const ClassInfo as *mut c_void
}

unsafe extern "C" fn global_get_singleton(name: sys::GDExtensionConstStringNamePtr) -> sys::GDExtensionObjectPtr {
    let name = strings::read(name);
    if name != "ClassDB" {
        log::engine_error(format!("Failed to retrieve non-existent singleton '{name}'."));
        return std::ptr::null_mut();
    }

    let mut world = world();
    if let Some(ptr) = world.singletons.get("ClassDB").and_then(|&id| world.ptr_of(id)) {
        return ptr;
    }

    let info = class_info("ClassDB").expect("ClassDB is a built-in class");
    let (ptr, id) = world.create(info);
    world.singletons.insert("ClassDB", id);
    ptr
}

unsafe extern "C" fn classdb_construct_object(class_name: sys::GDExtensionConstStringNamePtr) -> sys::GDExtensionObjectPtr {
    let class_name = strings::read(class_name);

    match class_info(&class_name).filter(|c| c.instantiable) {
        Some(info) => world().create(info).0,
        None => {
            log::engine_error(format!("Class '{class_name}' can't be instantiated."));
            std::ptr::null_mut()
        }
    }
}

unsafe extern "C" fn classdb_get_class_tag(class_name: sys::GDExtensionConstStringNamePtr) -> *mut c_void {
    class_info(&strings::read(class_name)).map_or(std::ptr::null_mut(), class_tag)
}

unsafe extern "C" fn object_destroy(object: sys::GDExtensionObjectPtr) {
    let mut world = world();
    let id = world.get(object).map(|(id, _)| id);
    match id {
        Some(id) => world.destroy(id),
        None => log::engine_error("Attempted to destroy an object that was already freed."),
    }
}

unsafe extern "C" fn object_get_instance_id(object: sys::GDExtensionConstObjectPtr) -> sys::GDObjectInstanceID {
    world().get(object).map_or(0, |(id, _)| id)
}

unsafe extern "C" fn object_get_instance_from_id(instance_id: sys::GDObjectInstanceID) -> sys::GDExtensionObjectPtr {
    world().ptr_of(instance_id).unwrap_or(std::ptr::null_mut())
}

unsafe extern "C" fn object_cast_to(
    object: sys::GDExtensionConstObjectPtr,
    class_tag: *mut c_void,
) -> sys::GDExtensionObjectPtr {
    let world = world();
    let Some((_, obj)) = world.get(object) else {
        return std::ptr::null_mut();
    };

    let target = CLASSES.iter().find(|c| self::class_tag(c) == class_tag);
    match target {
        Some(target) if inherits(obj.class.name, target.name) => obj.ptr,
        _ => std::ptr::null_mut(),
    }
}

unsafe extern "C" fn object_get_class_name(
    object: sys::GDExtensionConstObjectPtr,
    _library: sys::GDExtensionClassLibraryPtr,
    r_class_name: sys::GDExtensionUninitializedStringNamePtr,
) -> sys::GDExtensionBool {
    let class = world().get(object).map(|(_, obj)| obj.class.name);
    match class {
        Some(name) => {
            strings::write(r_class_name, name.to_string());
            1
        }
        None => 0,
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Builtin lifecycle

unsafe extern "C" fn variant_get_ptr_constructor(
    ty: sys::GDExtensionVariantType,
    constructor: i32,
) -> sys::GDExtensionPtrConstructor {
    match sys::VariantType::try_from_sys(ty) {
        Some(sys::VariantType::String | sys::VariantType::StringName) => strings::constructor(constructor),
        Some(ty @ (sys::VariantType::Array | sys::VariantType::Dictionary)) => containers::constructor(ty, constructor),
        _ => None,
    }
}

unsafe extern "C" fn variant_get_ptr_destructor(ty: sys::GDExtensionVariantType) -> sys::GDExtensionPtrDestructor {
    match sys::VariantType::try_from_sys(ty) {
        Some(sys::VariantType::String | sys::VariantType::StringName) => Some(strings::destroy),
        Some(sys::VariantType::Array | sys::VariantType::Dictionary) => Some(containers::destroy),
        _ => None,
    }
}

unsafe extern "C" fn get_variant_from_type_constructor(
    ty: sys::GDExtensionVariantType,
) -> sys::GDExtensionVariantFromTypeConstructorFunc {
    variant::from_type_constructor(ty)
}

unsafe extern "C" fn get_variant_to_type_constructor(
    ty: sys::GDExtensionVariantType,
) -> sys::GDExtensionTypeFromVariantConstructorFunc {
    variant::to_type_constructor(ty)
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Lookup

macro_rules! proc_table {
    ( $name:ident; $( $symbol:ident => $func:path, )* ) => {
        match $name {
            $(
                stringify!($symbol) => {
                    // SAFETY: the extension transmutes back to the typedef declared for `$symbol`.
                    Some(unsafe { std::mem::transmute::<*const (), unsafe extern "C" fn()>($func as *const ()) })
                }
            )*
            _ => None,
        }
    };
}

/// Entry point handed to the extension, resolving interface functions by name.
///
/// # Safety
/// `name` must be a null-terminated C string.
pub unsafe extern "C" fn get_proc_address(name: *const c_char) -> sys::GDExtensionInterfaceFunctionPtr {
    let name = CStr::from_ptr(name).to_str().unwrap_or_default();

    proc_table! { name;
        get_godot_version => get_godot_version,
        print_error => log::print_error,
        print_warning => log::print_warning,
        print_script_error => log::print_script_error,
        variant_new_copy => variant::variant_new_copy,
        variant_new_nil => variant::variant_new_nil,
        variant_destroy => variant::variant_destroy,
        variant_get_type => variant::variant_get_type,
        variant_stringify => variant::variant_stringify,
        get_variant_from_type_constructor => get_variant_from_type_constructor,
        get_variant_to_type_constructor => get_variant_to_type_constructor,
        variant_get_ptr_constructor => variant_get_ptr_constructor,
        variant_get_ptr_destructor => variant_get_ptr_destructor,
        variant_get_ptr_builtin_method => containers::variant_get_ptr_builtin_method,
        string_new_with_utf8_chars_and_len => strings::string_new_with_utf8_chars_and_len,
        string_to_utf8_chars => strings::string_to_utf8_chars,
        string_name_new_with_utf8_chars_and_len => strings::string_name_new_with_utf8_chars_and_len,
        array_operator_index => containers::array_operator_index,
        array_operator_index_const => containers::array_operator_index_const,
        dictionary_operator_index => containers::dictionary_operator_index,
        object_method_bind_call => methods::object_method_bind_call,
        object_method_bind_ptrcall => methods::object_method_bind_ptrcall,
        object_destroy => object_destroy,
        global_get_singleton => global_get_singleton,
        object_get_instance_id => object_get_instance_id,
        object_get_instance_from_id => object_get_instance_from_id,
        object_cast_to => object_cast_to,
        object_get_class_name => object_get_class_name,
        classdb_construct_object => classdb_construct_object,
        classdb_get_method_bind => methods::classdb_get_method_bind,
        classdb_get_class_tag => classdb_get_class_tag,
    }
}
