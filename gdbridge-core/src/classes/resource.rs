/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::GString;
use crate::classes::{Object, RefCounted};
use crate::obj::{engine_class, Gd};

engine_class! {
    /// Base class for serializable engine data.
    pub struct Resource {
        inherits: RefCounted, Object;
        kind: Instantiable;
    }

    methods {
        fn set_path(&mut self, path: &GString) = 83702148;

        fn get_path(&self) -> GString = 201670096;

        /// Copy of the resource. The engine hands out the only reference, which the returned `Gd` adopts.
        fn duplicate(&self, subresources: bool) -> Option<Gd<Resource>> = 482882304;
    }
}
