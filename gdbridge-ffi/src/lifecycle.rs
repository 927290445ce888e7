/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate as sys;
use crate::VariantType;

type PtrConstructor =
    unsafe extern "C" fn(sys::GDExtensionUninitializedTypePtr, *const sys::GDExtensionConstTypePtr);
type PtrDestructor = unsafe extern "C" fn(sys::GDExtensionTypePtr);
type VariantFromType =
    unsafe extern "C" fn(sys::GDExtensionUninitializedVariantPtr, sys::GDExtensionTypePtr);
type VariantToType =
    unsafe extern "C" fn(sys::GDExtensionUninitializedTypePtr, sys::GDExtensionVariantPtr);

// Constructor indices from extension_api.json.
const STRING_FROM_STRING: i32 = 1;
const STRING_FROM_STRING_NAME: i32 = 2;
const STRING_NAME_FROM_STRING_NAME: i32 = 1;
const STRING_NAME_FROM_STRING: i32 = 2;
const DEFAULT: i32 = 0;
const COPY: i32 = 1;

/// Constructors, destructors and variant conversions for builtin types, resolved once at startup.
///
/// Constructors and destructors of strings and containers are mandatory; variant conversions are optional per type,
/// since not every type is used by this crate.
pub struct BuiltinLifecycleTable {
    pub string_destroy: PtrDestructor,
    pub string_from_string: PtrConstructor,
    pub string_from_string_name: PtrConstructor,
    pub string_name_destroy: PtrDestructor,
    pub string_name_from_string_name: PtrConstructor,
    pub string_name_from_string: PtrConstructor,
    pub array_construct_default: PtrConstructor,
    pub array_construct_copy: PtrConstructor,
    pub array_destroy: PtrDestructor,
    pub dictionary_construct_default: PtrConstructor,
    pub dictionary_construct_copy: PtrConstructor,
    pub dictionary_destroy: PtrDestructor,
    variant_from_type: [Option<VariantFromType>; VariantType::COUNT],
    variant_to_type: [Option<VariantToType>; VariantType::COUNT],
}

impl BuiltinLifecycleTable {
    /// # Safety
    /// `interface` must be loaded from a live engine.
    pub unsafe fn load(interface: &sys::GDExtensionInterface) -> Self {
        let get_ctor = interface
            .variant_get_ptr_constructor
            .unwrap_or_else(|| sys::missing_interface_fn("variant_get_ptr_constructor"));
        let get_dtor = interface
            .variant_get_ptr_destructor
            .unwrap_or_else(|| sys::missing_interface_fn("variant_get_ptr_destructor"));
        let get_from = interface
            .get_variant_from_type_constructor
            .unwrap_or_else(|| sys::missing_interface_fn("get_variant_from_type_constructor"));
        let get_to = interface
            .get_variant_to_type_constructor
            .unwrap_or_else(|| sys::missing_interface_fn("get_variant_to_type_constructor"));

        let ctor = |ty: VariantType, index: i32| -> PtrConstructor {
            get_ctor(ty.sys(), index)
                .unwrap_or_else(|| panic!("engine provides no constructor #{index} for {ty}"))
        };
        let dtor = |ty: VariantType| -> PtrDestructor {
            get_dtor(ty.sys()).unwrap_or_else(|| panic!("engine provides no destructor for {ty}"))
        };

        let mut variant_from_type = [None; VariantType::COUNT];
        let mut variant_to_type = [None; VariantType::COUNT];

        // Nil has no conversions; the variant itself is the value.
        for &ty in &VariantType::ALL[1..] {
            variant_from_type[ty.ord()] = get_from(ty.sys());
            variant_to_type[ty.ord()] = get_to(ty.sys());
        }

        Self {
            string_destroy: dtor(VariantType::String),
            string_from_string: ctor(VariantType::String, STRING_FROM_STRING),
            string_from_string_name: ctor(VariantType::String, STRING_FROM_STRING_NAME),
            string_name_destroy: dtor(VariantType::StringName),
            string_name_from_string_name: ctor(VariantType::StringName, STRING_NAME_FROM_STRING_NAME),
            string_name_from_string: ctor(VariantType::StringName, STRING_NAME_FROM_STRING),
            array_construct_default: ctor(VariantType::Array, DEFAULT),
            array_construct_copy: ctor(VariantType::Array, COPY),
            array_destroy: dtor(VariantType::Array),
            dictionary_construct_default: ctor(VariantType::Dictionary, DEFAULT),
            dictionary_construct_copy: ctor(VariantType::Dictionary, COPY),
            dictionary_destroy: dtor(VariantType::Dictionary),
            variant_from_type,
            variant_to_type,
        }
    }

    /// Converter from a value of type `ty` into a new variant.
    ///
    /// # Panics
    /// If the engine does not provide one.
    pub fn variant_from_type(&self, ty: VariantType) -> VariantFromType {
        self.variant_from_type[ty.ord()]
            .unwrap_or_else(|| panic!("no conversion from {ty} to Variant available"))
    }

    /// Converter from a variant holding `ty` into a value of that type.
    ///
    /// # Panics
    /// If the engine does not provide one.
    pub fn variant_to_type(&self, ty: VariantType) -> VariantToType {
        self.variant_to_type[ty.ord()]
            .unwrap_or_else(|| panic!("no conversion from Variant to {ty} available"))
    }
}
