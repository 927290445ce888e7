/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Byte storage for an engine builtin whose layout is private to the engine.
///
/// Only the engine reads or writes the contents. Rust code moves the bytes around and passes pointers to them.
///
/// All-zero bytes are the engine's representation of the default value (empty string, nil variant), which is
/// what [`zeroed()`](Self::zeroed) relies on.
#[repr(C, align(8))]
#[derive(Copy, Clone)]
pub struct Opaque<const N: usize> {
    storage: [u8; N],
    marker: std::marker::PhantomData<*const u8>, // disable Send/Sync
}

impl<const N: usize> Opaque<N> {
    pub const SIZE: usize = N;

    pub const fn zeroed() -> Self {
        Self {
            storage: [0; N],
            marker: std::marker::PhantomData,
        }
    }

    pub fn is_zeroed(&self) -> bool {
        self.storage.iter().all(|&b| b == 0)
    }

    pub fn as_ptr(&self) -> *const std::ffi::c_void {
        self.storage.as_ptr() as *const std::ffi::c_void
    }

    pub fn as_mut_ptr(&mut self) -> *mut std::ffi::c_void {
        self.storage.as_mut_ptr() as *mut std::ffi::c_void
    }
}

impl<const N: usize> std::fmt::Debug for Opaque<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Opaque<{N}>(")?;
        for byte in &self.storage {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

// Sizes for 64-bit targets with single-precision `real_t`.
pub type OpaqueString = Opaque<8>;
pub type OpaqueStringName = Opaque<8>;
pub type OpaqueVariant = Opaque<24>;
pub type OpaqueArray = Opaque<8>;
pub type OpaqueDictionary = Opaque<8>;

#[cfg(target_pointer_width = "64")]
crate::static_assert!(std::mem::size_of::<OpaqueVariant>() == 24);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_is_default_representation() {
        let mut opaque = OpaqueString::zeroed();
        assert!(opaque.is_zeroed());

        unsafe { *(opaque.as_mut_ptr() as *mut u8) = 1 };
        assert!(!opaque.is_zeroed());
    }

    #[test]
    fn layout_matches_engine() {
        assert_eq!(std::mem::size_of::<OpaqueString>(), 8);
        assert_eq!(std::mem::align_of::<OpaqueVariant>(), 8);
        assert_eq!(format!("{:?}", Opaque::<2>::zeroed()), "Opaque<2>(0000)");
    }
}
