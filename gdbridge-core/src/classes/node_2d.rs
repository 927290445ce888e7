/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::Vector2;
use crate::classes::{Node, Object};
use crate::obj::engine_class;

engine_class! {
    /// Node with a 2D transform.
    pub struct Node2D {
        inherits: Node, Object;
        kind: Instantiable;
    }

    methods {
        fn set_position(&mut self, position: Vector2) = 743155724;

        fn get_position(&self) -> Vector2 = 3341600327;

        /// Adds `radians` to the current rotation.
        fn rotate(&mut self, radians: f32) = 373806689;

        fn get_rotation(&self) -> f32 = 1740695150;
    }
}
