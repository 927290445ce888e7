/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

macro_rules! variant_types {
    ( $( $Variant:ident = $ord:literal ),* $(,)? ) => {
        /// Type tag stored in every engine `Variant`.
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
        #[repr(i32)]
        pub enum VariantType {
            $( $Variant = $ord, )*
        }

        impl VariantType {
            /// All types, indexed by their ordinal.
            pub const ALL: &'static [VariantType] = &[ $( Self::$Variant, )* ];

            #[doc(hidden)]
            pub fn try_from_sys(enumerator: crate::GDExtensionVariantType) -> Option<Self> {
                match enumerator {
                    $( $ord => Some(Self::$Variant), )*
                    _ => None,
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$Variant => stringify!($Variant), )*
                }
            }
        }
    };
}

variant_types! {
    Nil = 0,
    Bool = 1,
    Int = 2,
    Float = 3,
    String = 4,
    Vector2 = 5,
    Vector2i = 6,
    Rect2 = 7,
    Rect2i = 8,
    Vector3 = 9,
    Vector3i = 10,
    Transform2D = 11,
    Vector4 = 12,
    Vector4i = 13,
    Plane = 14,
    Quaternion = 15,
    Aabb = 16,
    Basis = 17,
    Transform3D = 18,
    Projection = 19,
    Color = 20,
    StringName = 21,
    NodePath = 22,
    Rid = 23,
    Object = 24,
    Callable = 25,
    Signal = 26,
    Dictionary = 27,
    Array = 28,
    PackedByteArray = 29,
    PackedInt32Array = 30,
    PackedInt64Array = 31,
    PackedFloat32Array = 32,
    PackedFloat64Array = 33,
    PackedStringArray = 34,
    PackedVector2Array = 35,
    PackedVector3Array = 36,
    PackedColorArray = 37,
    PackedVector4Array = 38,
}

impl VariantType {
    /// Number of variant types, i.e. `VARIANT_MAX`.
    pub const COUNT: usize = Self::ALL.len();

    #[doc(hidden)]
    pub fn from_sys(enumerator: crate::GDExtensionVariantType) -> Self {
        Self::try_from_sys(enumerator)
            .unwrap_or_else(|| panic!("invalid variant type {enumerator}"))
    }

    #[doc(hidden)]
    pub fn sys(self) -> crate::GDExtensionVariantType {
        self as _
    }

    pub fn ord(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for VariantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_match_table_position() {
        for (index, ty) in VariantType::ALL.iter().enumerate() {
            assert_eq!(ty.ord(), index);
            assert_eq!(VariantType::from_sys(ty.sys()), *ty);
        }

        assert_eq!(VariantType::COUNT, 39);
        assert_eq!(VariantType::try_from_sys(39), None);
    }

    #[test]
    fn display_uses_engine_name() {
        assert_eq!(VariantType::StringName.to_string(), "StringName");
        assert_eq!(VariantType::Object.sys(), 24);
    }
}
