/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate as sys;

/// Marshaling contract between a Rust value and its ptrcall slot representation.
///
/// # Safety
/// `Raw` must have exactly the layout the engine reads and writes for [`variant_type()`](Self::variant_type) in a
/// ptrcall: `int64_t` for all integers, `double` for all floats, a single byte for `bool`.
pub unsafe trait GodotFfi: Sized {
    /// Slot representation, copied into a call-frame by value.
    type Raw: Copy + 'static;

    fn variant_type() -> sys::VariantType;

    /// Encodes `self` without giving up ownership.
    fn to_raw(&self) -> Self::Raw;

    /// Decodes a slot written by the engine, taking ownership of its contents.
    ///
    /// # Safety
    /// `raw` must have been written by the engine for this type, or be [`null_raw()`](Self::null_raw).
    unsafe fn from_raw(raw: Self::Raw) -> Self;

    /// Initial content of a return slot before the engine writes to it.
    fn null_raw() -> Self::Raw;
}

macro_rules! impl_ffi_as {
    ($( $T:ty => $Raw:ty, $VariantTy:ident, $kind:ident; )*) => {
        $(
            unsafe impl GodotFfi for $T {
                type Raw = $Raw;

                fn variant_type() -> sys::VariantType {
                    sys::VariantType::$VariantTy
                }

                fn to_raw(&self) -> $Raw {
                    *self as $Raw
                }

                unsafe fn from_raw(raw: $Raw) -> Self {
                    impl_ffi_as!(@check_range $kind, $T, raw);
                    raw as $T
                }

                fn null_raw() -> $Raw {
                    <$Raw>::default()
                }
            }
        )*
    };

    // The engine may return any int64_t where the API declares a narrower integer.
    (@check_range int, $T:ty, $raw:ident) => {
        debug_assert!(
            <$T>::try_from($raw).is_ok(),
            "engine returned {} which does not fit {}",
            $raw,
            stringify!($T)
        );
    };
    (@check_range float, $T:ty, $raw:ident) => {};
}

impl_ffi_as! {
    i64 => i64, Int, int;
    i32 => i64, Int, int;
    i16 => i64, Int, int;
    i8 => i64, Int, int;
    u32 => i64, Int, int;
    u16 => i64, Int, int;
    u8 => i64, Int, int;
    f64 => f64, Float, float;
    f32 => f64, Float, float;
}

unsafe impl GodotFfi for u64 {
    type Raw = i64;

    fn variant_type() -> sys::VariantType {
        sys::VariantType::Int
    }

    // Bit-preserving, used for instance IDs.
    fn to_raw(&self) -> i64 {
        *self as i64
    }

    unsafe fn from_raw(raw: i64) -> Self {
        raw as u64
    }

    fn null_raw() -> i64 {
        0
    }
}

unsafe impl GodotFfi for bool {
    type Raw = u8;

    fn variant_type() -> sys::VariantType {
        sys::VariantType::Bool
    }

    fn to_raw(&self) -> u8 {
        u8::from(*self)
    }

    unsafe fn from_raw(raw: u8) -> Self {
        raw != 0
    }

    fn null_raw() -> u8 {
        0
    }
}

unsafe impl GodotFfi for () {
    type Raw = ();

    fn variant_type() -> sys::VariantType {
        sys::VariantType::Nil
    }

    fn to_raw(&self) {}

    unsafe fn from_raw(_raw: ()) -> Self {}

    fn null_raw() {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_widen_to_int64() {
        assert_eq!((-3i8).to_raw(), -3i64);
        assert_eq!(u32::MAX.to_raw(), 4_294_967_295i64);
        assert_eq!(unsafe { i32::from_raw(-7) }, -7);
        assert_eq!(<u16 as GodotFfi>::variant_type(), sys::VariantType::Int);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "engine returned 300 which does not fit u8")]
    fn narrowing_out_of_range_panics() {
        let _ = unsafe { u8::from_raw(300) };
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "does not fit i32")]
    fn narrowing_overflowing_int_panics() {
        let _ = unsafe { i32::from_raw(i64::from(i32::MAX) + 1) };
    }

    #[test]
    fn narrowing_in_range_is_exact() {
        assert_eq!(unsafe { u8::from_raw(255) }, 255);
        assert_eq!(unsafe { i16::from_raw(-32768) }, i16::MIN);
    }

    #[test]
    fn floats_widen_to_double() {
        assert_eq!(1.5f32.to_raw(), 1.5f64);
        assert_eq!(<f32 as GodotFfi>::variant_type(), sys::VariantType::Float);
    }

    #[test]
    fn bool_is_single_byte() {
        assert_eq!(std::mem::size_of::<<bool as GodotFfi>::Raw>(), 1);
        assert_eq!(true.to_raw(), 1);
        assert!(unsafe { bool::from_raw(2) });
        assert!(!unsafe { bool::from_raw(bool::null_raw()) });
    }

    #[test]
    fn instance_id_bits_survive() {
        let id = (1u64 << 63) | 42;
        assert_eq!(unsafe { u64::from_raw(id.to_raw()) }, id);
    }
}
