/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Plain-data vector types, passed to the engine by value.
//!
//! Layout matches the engine with single-precision `real_t`. Math is delegated to `glam`.

use std::fmt;

/// Implements a component-wise binary operator between two vectors, and between a vector and a scalar.
macro_rules! impl_vector_operators {
    (@op $Vector:ty, $Scalar:ty, ($($components:ident),*), $Operator:ident, $func:ident) => {
        impl std::ops::$Operator for $Vector {
            type Output = Self;
            fn $func(mut self, rhs: $Vector) -> Self::Output {
                $(
                    self.$components = std::ops::$Operator::$func(self.$components, rhs.$components);
                )*
                self
            }
        }

        impl std::ops::$Operator<$Scalar> for $Vector {
            type Output = Self;
            fn $func(mut self, rhs: $Scalar) -> Self::Output {
                $(
                    self.$components = std::ops::$Operator::$func(self.$components, rhs);
                )*
                self
            }
        }
    };
    (
        // Name of the vector type.
        $Vector:ty,
        // Type of each individual component, for example `i32`.
        $Scalar:ty,
        // Names of the components, with parentheses, for example `(x, y)`.
        ($($components:ident),*)
    ) => {
        impl_vector_operators!(@op $Vector, $Scalar, ($($components),*), Add, add);
        impl_vector_operators!(@op $Vector, $Scalar, ($($components),*), Sub, sub);
        impl_vector_operators!(@op $Vector, $Scalar, ($($components),*), Mul, mul);

        impl std::ops::Neg for $Vector {
            type Output = Self;
            fn neg(mut self) -> Self::Output {
                $(
                    self.$components = -self.$components;
                )*
                self
            }
        }
    };
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Vector2

/// Vector used for 2D math using floating point coordinates.
#[derive(Default, Copy, Clone, PartialEq, Debug)]
#[repr(C)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn from_glam(v: glam::Vec2) -> Self {
        Self::new(v.x, v.y)
    }

    pub fn to_glam(self) -> glam::Vec2 {
        glam::Vec2::new(self.x, self.y)
    }

    pub fn length(self) -> f32 {
        self.to_glam().length()
    }

    pub fn dot(self, with: Self) -> f32 {
        self.to_glam().dot(with.to_glam())
    }

    /// Unit vector in the same direction, or zero for the zero vector.
    pub fn normalized(self) -> Self {
        Self::from_glam(self.to_glam().normalize_or_zero())
    }

    /// Rotated by `angle` radians.
    pub fn rotated(self, angle: f32) -> Self {
        Self::from_glam(glam::Vec2::from_angle(angle).rotate(self.to_glam()))
    }

    pub fn is_equal_approx(self, to: Self) -> bool {
        self.to_glam().abs_diff_eq(to.to_glam(), 1e-5)
    }
}

impl_vector_operators!(Vector2, f32, (x, y));

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Vector2i

/// Vector used for 2D math using integer coordinates.
#[derive(Default, Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(C)]
pub struct Vector2i {
    pub x: i32,
    pub y: i32,
}

impl Vector2i {
    pub const ZERO: Self = Self::new(0, 0);

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn from_glam(v: glam::IVec2) -> Self {
        Self::new(v.x, v.y)
    }

    pub fn to_glam(self) -> glam::IVec2 {
        glam::IVec2::new(self.x, self.y)
    }

    pub fn abs(self) -> Self {
        Self::from_glam(self.to_glam().abs())
    }

    /// Converts to floating point, possibly losing precision for large values.
    pub fn cast_float(self) -> Vector2 {
        Vector2::from_glam(self.to_glam().as_vec2())
    }
}

impl_vector_operators!(Vector2i, i32, (x, y));

impl fmt::Display for Vector2i {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Vector3

/// Vector used for 3D math using floating point coordinates.
#[derive(Default, Copy, Clone, PartialEq, Debug)]
#[repr(C)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn from_glam(v: glam::Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    pub fn to_glam(self) -> glam::Vec3 {
        glam::Vec3::new(self.x, self.y, self.z)
    }

    pub fn length(self) -> f32 {
        self.to_glam().length()
    }

    pub fn dot(self, with: Self) -> f32 {
        self.to_glam().dot(with.to_glam())
    }

    pub fn cross(self, with: Self) -> Self {
        Self::from_glam(self.to_glam().cross(with.to_glam()))
    }

    pub fn normalized(self) -> Self {
        Self::from_glam(self.to_glam().normalize_or_zero())
    }
}

impl_vector_operators!(Vector3, f32, (x, y, z));

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_engine() {
        assert_eq!(std::mem::size_of::<Vector2>(), 8);
        assert_eq!(std::mem::size_of::<Vector2i>(), 8);
        assert_eq!(std::mem::size_of::<Vector3>(), 12);
    }

    #[test]
    fn operators() {
        let a = Vector2::new(1.0, 2.0);
        let b = Vector2::new(3.0, -1.0);

        assert_eq!(a + b, Vector2::new(4.0, 1.0));
        assert_eq!(a - b, Vector2::new(-2.0, 3.0));
        assert_eq!(a * 2.0, Vector2::new(2.0, 4.0));
        assert_eq!(-a, Vector2::new(-1.0, -2.0));
        assert_eq!(Vector2i::new(2, 3) * Vector2i::new(4, 5), Vector2i::new(8, 15));
    }

    #[test]
    fn glam_math() {
        assert_eq!(Vector2::new(3.0, 4.0).length(), 5.0);
        assert_eq!(Vector2::ZERO.normalized(), Vector2::ZERO);
        assert!(Vector2::new(1.0, 0.0)
            .rotated(std::f32::consts::FRAC_PI_2)
            .is_equal_approx(Vector2::new(0.0, 1.0)));
        assert_eq!(
            Vector3::new(1.0, 0.0, 0.0).cross(Vector3::new(0.0, 1.0, 0.0)),
            Vector3::new(0.0, 0.0, 1.0)
        );
        assert_eq!(Vector2i::new(-2, 5).abs().cast_float(), Vector2::new(2.0, 5.0));
    }

    #[test]
    fn display() {
        assert_eq!(Vector2::new(1.5, -2.0).to_string(), "(1.5, -2)");
        assert_eq!(Vector2i::new(1, 2).to_string(), "(1, 2)");
        assert_eq!(Vector3::new(0.0, 1.0, 2.0).to_string(), "(0, 1, 2)");
    }
}
