/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::builtin::{GString, VariantType};
use crate::meta::error::ConvertError;
use crate::ownership::{Handle, Pointer};
use crate::sys;
use sys::{interface_fn, OpaqueVariant};

mod impls;

pub use impls::{FromVariant, ToVariant};

/// Registry kind for engine `Variant` values.
pub enum VariantHandle {}

// SAFETY: every owned variant is destroyed exactly once, by the registry.
unsafe impl Handle for VariantHandle {
    type Raw = OpaqueVariant;
    const KIND: &'static str = "Variant";

    unsafe fn release(mut raw: OpaqueVariant) {
        // Nil holds no resources.
        if sys::is_initialized() && !raw.is_zeroed() {
            interface_fn!(variant_destroy)(raw.as_mut_ptr());
        }
    }
}

/// Engine variant type, able to store a variety of different types.
///
/// Variants holding strings or objects own a share of them; dropping the variant releases it.
pub struct Variant {
    handle: Pointer<VariantHandle>,
}

impl Variant {
    /// Create an empty variant (`null` value in GDScript). Does not call into the engine.
    pub fn nil() -> Self {
        // All-zero bytes are the nil variant.
        Self::from_opaque(OpaqueVariant::zeroed())
    }

    /// Create a variant holding a non-nil value.
    ///
    /// Equivalent to [`value.to_variant()`][ToVariant::to_variant], but consumes the argument.
    pub fn from<T: ToVariant>(value: T) -> Self {
        value.to_variant()
    }

    /// ⚠️ Convert to type `T`, panicking on failure.
    ///
    /// # Panics
    /// When this variant holds a different type.
    #[track_caller]
    pub fn to<T: FromVariant>(&self) -> T {
        T::from_variant(self)
    }

    /// Convert to type `T`, returning `Err` on failure.
    pub fn try_to<T: FromVariant>(&self) -> Result<T, ConvertError> {
        T::try_from_variant(self)
    }

    /// Returns the type that is currently held by this variant.
    pub fn get_type(&self) -> VariantType {
        let opaque = self.opaque();
        if opaque.is_zeroed() {
            return VariantType::Nil;
        }

        // SAFETY: `opaque` is a live variant.
        let sys_type = unsafe { interface_fn!(variant_get_type)(opaque.as_ptr()) };
        VariantType::try_from_sys(sys_type).unwrap_or(VariantType::Nil)
    }

    /// Checks whether the variant is empty (`null` value in GDScript).
    pub fn is_nil(&self) -> bool {
        self.get_type() == VariantType::Nil
    }

    /// Textual form as the engine prints it.
    pub fn stringify(&self) -> GString {
        let opaque = self.opaque();

        // SAFETY: `variant_stringify` writes a new string into the uninitialized slot.
        unsafe {
            GString::new_with_uninit(|dst| {
                interface_fn!(variant_stringify)(opaque.as_ptr(), dst);
            })
        }
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // Engine representation

    pub(crate) fn from_opaque(opaque: OpaqueVariant) -> Self {
        Self {
            handle: Pointer::new(opaque),
        }
    }

    pub(crate) fn opaque(&self) -> OpaqueVariant {
        self.handle.get()
    }

    /// New variant from a value in its native representation, via the engine's from-type constructor.
    ///
    /// # Safety
    /// `raw` must be the native representation of `ty`.
    pub(crate) unsafe fn from_raw_typed<R: Copy>(ty: VariantType, mut raw: R) -> Self {
        let constructor = sys::builtin_lifecycle_api().variant_from_type(ty);

        let mut opaque = OpaqueVariant::zeroed();
        constructor(opaque.as_mut_ptr(), &mut raw as *mut R as sys::GDExtensionTypePtr);
        Self::from_opaque(opaque)
    }

    /// Native representation of the held value, via the engine's to-type constructor.
    ///
    /// The caller must have checked that the variant holds `ty`. `init` is overwritten by the engine.
    ///
    /// # Safety
    /// `R` must be the native representation of `ty`. If `ty` owns resources, the caller takes ownership of the result.
    pub(crate) unsafe fn to_raw_typed<R: Copy>(&self, ty: VariantType, init: R) -> R {
        let constructor = sys::builtin_lifecycle_api().variant_to_type(ty);

        let mut out = init;
        let mut opaque = self.opaque();
        constructor(&mut out as *mut R as sys::GDExtensionUninitializedTypePtr, opaque.as_mut_ptr());
        out
    }
}

impl Default for Variant {
    fn default() -> Self {
        Self::nil()
    }
}

impl Clone for Variant {
    fn clone(&self) -> Self {
        let source = self.opaque();
        if source.is_zeroed() {
            return Self::nil();
        }

        let mut opaque = OpaqueVariant::zeroed();
        // SAFETY: `variant_new_copy` initializes the destination, taking its own share of the contents.
        unsafe { interface_fn!(variant_new_copy)(opaque.as_mut_ptr(), source.as_ptr()) };
        Self::from_opaque(opaque)
    }
}

impl Drop for Variant {
    fn drop(&mut self) {
        self.handle.release();
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.stringify(), f)
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get_type() {
            // Quoted, to distinguish from other types.
            VariantType::String => write!(f, "{:?}", self.stringify().to_string()),
            VariantType::StringName => write!(f, "&{:?}", self.stringify().to_string()),
            VariantType::Nil => write!(f, "null"),
            _ => fmt::Display::fmt(self, f),
        }
    }
}
