/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::num::NonZeroU64;

use crate::builtin::{FromVariant, ToVariant, Variant};
use crate::meta::error::ConvertError;

/// Represents a non-zero instance ID.
///
/// The engine hands out IDs as `u64`, while scripts see them as `i64`. The public API uses `i64` so that there is only
/// one representation of negative values (RefCounted IDs have the top bit set).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct InstanceId {
    value: NonZeroU64,
}

impl InstanceId {
    const REF_COUNTED_BIT: u64 = 1 << 63;

    /// Constructs an instance ID from an integer, or `None` if the integer is zero.
    ///
    /// This does *not* check if the instance is valid.
    pub fn try_from_i64(id: i64) -> Option<Self> {
        Self::try_from_u64(id as u64)
    }

    /// ⚠️ Constructs an instance ID from a non-zero integer, or panics.
    ///
    /// # Panics
    /// If `id` is zero.
    pub fn from_i64(id: i64) -> Self {
        Self::try_from_i64(id).expect("expected non-zero instance ID")
    }

    pub(crate) fn try_from_u64(id: u64) -> Option<Self> {
        NonZeroU64::new(id).map(|value| Self { value })
    }

    pub fn to_i64(self) -> i64 {
        self.to_u64() as i64
    }

    /// Returns if the object being referred to inherits `RefCounted`.
    ///
    /// No engine round-trip; the engine encodes this in the ID itself.
    pub fn is_ref_counted(self) -> bool {
        self.to_u64() & Self::REF_COUNTED_BIT != 0
    }

    pub(crate) fn to_u64(self) -> u64 {
        self.value.get()
    }
}

impl Display for InstanceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_i64())
    }
}

impl Debug for InstanceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "InstanceId({})", self.to_i64())
    }
}

impl ToVariant for InstanceId {
    fn to_variant(&self) -> Variant {
        self.to_i64().to_variant()
    }
}

impl FromVariant for InstanceId {
    fn try_from_variant(variant: &Variant) -> Result<Self, ConvertError> {
        let id = i64::try_from_variant(variant)?;
        InstanceId::try_from_i64(id).ok_or_else(|| ConvertError::bad_value("instance ID must not be zero", variant))
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_rejected() {
        assert_eq!(InstanceId::try_from_i64(0), None);
        assert!(InstanceId::try_from_u64(0).is_none());
    }

    #[test]
    fn ref_counted_bit() {
        let manual = InstanceId::from_i64(42);
        let ref_counted = InstanceId::try_from_u64(42 | (1 << 63)).unwrap();

        assert!(!manual.is_ref_counted());
        assert!(ref_counted.is_ref_counted());
        assert!(ref_counted.to_i64() < 0);
        assert_eq!(InstanceId::try_from_i64(ref_counted.to_i64()), Some(ref_counted));
    }

    #[test]
    fn formatting() {
        let id = InstanceId::from_i64(17);
        assert_eq!(id.to_string(), "17");
        assert_eq!(format!("{id:?}"), "InstanceId(17)");
    }
}
