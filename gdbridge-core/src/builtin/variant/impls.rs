/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::{
    Array, Dictionary, GString, StringName, Variant, VariantType, Vector2, Vector2i, Vector3,
};
use crate::meta::error::ConvertError;
use crate::obj::{Gd, GodotClass};
use crate::sys;
use sys::{OpaqueArray, OpaqueDictionary, OpaqueString, OpaqueStringName};

/// Conversion of a Rust value into a [`Variant`].
pub trait ToVariant {
    fn to_variant(&self) -> Variant;
}

/// Conversion of a [`Variant`] back into a Rust value.
///
/// The variant must hold exactly the expected type. There is no implicit coercion between `Int` and `Float`.
pub trait FromVariant: Sized {
    fn try_from_variant(variant: &Variant) -> Result<Self, ConvertError>;

    /// ⚠️ Like [`try_from_variant()`][Self::try_from_variant], but panics on error.
    #[track_caller]
    fn from_variant(variant: &Variant) -> Self {
        Self::try_from_variant(variant).unwrap_or_else(|err| {
            panic!("FromVariant::from_variant() failed: {err}");
        })
    }
}

fn expect_type(variant: &Variant, expected: VariantType) -> Result<(), ConvertError> {
    if variant.get_type() == expected {
        Ok(())
    } else {
        Err(ConvertError::bad_type(expected, variant))
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Types with a plain-old-data representation

macro_rules! impl_variant_pod {
    ($T:ty, $variant_type:ident) => {
        impl ToVariant for $T {
            fn to_variant(&self) -> Variant {
                // SAFETY: `$T` is the native representation of `$variant_type`.
                unsafe { Variant::from_raw_typed(VariantType::$variant_type, *self) }
            }
        }

        impl FromVariant for $T {
            fn try_from_variant(variant: &Variant) -> Result<Self, ConvertError> {
                expect_type(variant, VariantType::$variant_type)?;

                // SAFETY: type checked above; the value holds no resources.
                Ok(unsafe { variant.to_raw_typed(VariantType::$variant_type, <$T>::default()) })
            }
        }
    };
}

impl_variant_pod!(i64, Int);
impl_variant_pod!(f64, Float);
impl_variant_pod!(Vector2, Vector2);
impl_variant_pod!(Vector2i, Vector2i);
impl_variant_pod!(Vector3, Vector3);

impl ToVariant for bool {
    fn to_variant(&self) -> Variant {
        // SAFETY: booleans travel as a single byte.
        unsafe { Variant::from_raw_typed(VariantType::Bool, u8::from(*self)) }
    }
}

impl FromVariant for bool {
    fn try_from_variant(variant: &Variant) -> Result<Self, ConvertError> {
        expect_type(variant, VariantType::Bool)?;

        // SAFETY: type checked above.
        let byte: u8 = unsafe { variant.to_raw_typed(VariantType::Bool, 0u8) };
        Ok(byte != 0)
    }
}

// Narrower integers go through i64 and are range-checked when read back.
macro_rules! impl_variant_int {
    ($($T:ty),* $(,)?) => {
        $(
            impl ToVariant for $T {
                fn to_variant(&self) -> Variant {
                    i64::from(*self).to_variant()
                }
            }

            impl FromVariant for $T {
                fn try_from_variant(variant: &Variant) -> Result<Self, ConvertError> {
                    let wide = i64::try_from_variant(variant)?;
                    <$T>::try_from(wide).map_err(|_| {
                        ConvertError::bad_value(
                            format!("integer {wide} does not fit into `{}`", stringify!($T)),
                            variant,
                        )
                    })
                }
            }
        )*
    };
}

impl_variant_int!(i8, i16, i32, u8, u16, u32);

impl ToVariant for f32 {
    fn to_variant(&self) -> Variant {
        f64::from(*self).to_variant()
    }
}

impl FromVariant for f32 {
    fn try_from_variant(variant: &Variant) -> Result<Self, ConvertError> {
        f64::try_from_variant(variant).map(|f| f as f32)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Strings

impl ToVariant for GString {
    fn to_variant(&self) -> Variant {
        // SAFETY: the engine copies the string; `self` keeps its own reference.
        unsafe { Variant::from_raw_typed(VariantType::String, self.opaque()) }
    }
}

impl FromVariant for GString {
    fn try_from_variant(variant: &Variant) -> Result<Self, ConvertError> {
        expect_type(variant, VariantType::String)?;

        // SAFETY: type checked above; the new string is adopted.
        let raw = unsafe { variant.to_raw_typed(VariantType::String, OpaqueString::zeroed()) };
        Ok(GString::from_opaque(raw))
    }
}

impl ToVariant for StringName {
    fn to_variant(&self) -> Variant {
        // SAFETY: see GString.
        unsafe { Variant::from_raw_typed(VariantType::StringName, self.opaque()) }
    }
}

impl FromVariant for StringName {
    fn try_from_variant(variant: &Variant) -> Result<Self, ConvertError> {
        expect_type(variant, VariantType::StringName)?;

        // SAFETY: type checked above; the new name is adopted.
        let raw = unsafe { variant.to_raw_typed(VariantType::StringName, OpaqueStringName::zeroed()) };
        Ok(StringName::from_opaque(raw))
    }
}

impl ToVariant for String {
    fn to_variant(&self) -> Variant {
        self.as_str().to_variant()
    }
}

impl ToVariant for str {
    fn to_variant(&self) -> Variant {
        GString::from(self).to_variant()
    }
}

impl FromVariant for String {
    fn try_from_variant(variant: &Variant) -> Result<Self, ConvertError> {
        GString::try_from_variant(variant).map(|s| s.to_string())
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Containers: the variant and the Rust value share the engine-side storage.

impl ToVariant for Array {
    fn to_variant(&self) -> Variant {
        // SAFETY: the variant takes its own reference to the array.
        unsafe { Variant::from_raw_typed(VariantType::Array, self.opaque()) }
    }
}

impl FromVariant for Array {
    fn try_from_variant(variant: &Variant) -> Result<Self, ConvertError> {
        expect_type(variant, VariantType::Array)?;

        // SAFETY: type checked above; the new reference is adopted.
        let raw = unsafe { variant.to_raw_typed(VariantType::Array, OpaqueArray::zeroed()) };
        Ok(Array::from_opaque(raw))
    }
}

impl ToVariant for Dictionary {
    fn to_variant(&self) -> Variant {
        // SAFETY: the variant takes its own reference to the dictionary.
        unsafe { Variant::from_raw_typed(VariantType::Dictionary, self.opaque()) }
    }
}

impl FromVariant for Dictionary {
    fn try_from_variant(variant: &Variant) -> Result<Self, ConvertError> {
        expect_type(variant, VariantType::Dictionary)?;

        // SAFETY: type checked above; the new reference is adopted.
        let raw = unsafe { variant.to_raw_typed(VariantType::Dictionary, OpaqueDictionary::zeroed()) };
        Ok(Dictionary::from_opaque(raw))
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Objects

impl<T: GodotClass> ToVariant for Gd<T> {
    fn to_variant(&self) -> Variant {
        // SAFETY: the variant takes its own reference on RefCounted objects.
        unsafe { Variant::from_raw_typed(VariantType::Object, self.obj_sys()) }
    }
}

impl<T: GodotClass> FromVariant for Gd<T> {
    fn try_from_variant(variant: &Variant) -> Result<Self, ConvertError> {
        expect_type(variant, VariantType::Object)?;
        let ptr = object_ptr(variant);

        // SAFETY: `ptr` is null or points to a live object, to which the variant holds a reference.
        let object = unsafe { Gd::<crate::classes::Object>::from_obj_sys_retain(ptr) }
            .ok_or_else(ConvertError::null_object)?;

        object.owned_cast::<T>().map_err(|object| {
            ConvertError::wrong_class(T::CLASS_NAME, object.dynamic_class_string().to_string())
        })
    }
}

impl<T: GodotClass> ToVariant for Option<Gd<T>> {
    fn to_variant(&self) -> Variant {
        match self {
            Some(gd) => gd.to_variant(),
            None => Variant::nil(),
        }
    }
}

impl<T: GodotClass> FromVariant for Option<Gd<T>> {
    fn try_from_variant(variant: &Variant) -> Result<Self, ConvertError> {
        match variant.get_type() {
            VariantType::Nil => Ok(None),

            // Object-typed, but holding null or an object freed in the meantime.
            VariantType::Object if object_ptr(variant).is_null() => Ok(None),

            _ => Gd::try_from_variant(variant).map(Some),
        }
    }
}

/// Object pointer held by an Object-typed variant. Null if the variant holds no live object.
fn object_ptr(variant: &Variant) -> sys::GDExtensionObjectPtr {
    // SAFETY: callers check for `VariantType::Object`. The engine hands out the pointer without a reference.
    unsafe { variant.to_raw_typed(VariantType::Object, std::ptr::null_mut()) }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Variant itself

impl ToVariant for Variant {
    fn to_variant(&self) -> Variant {
        self.clone()
    }
}

impl FromVariant for Variant {
    fn try_from_variant(variant: &Variant) -> Result<Self, ConvertError> {
        Ok(variant.clone())
    }
}

impl<T: ToVariant + ?Sized> ToVariant for &T {
    fn to_variant(&self) -> Variant {
        T::to_variant(*self)
    }
}
