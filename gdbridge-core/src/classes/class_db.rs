/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::{StringName, Variant};
use crate::classes::Object;
use crate::global::Error;
use crate::obj::{engine_class, Gd};

engine_class! {
    /// The engine's registry of classes, methods and properties.
    ///
    /// Obtained through [`Singleton::singleton()`][crate::obj::Singleton::singleton]. Rust never frees it.
    pub struct ClassDb {
        class_name: "ClassDB";
        inherits: Object;
        kind: Singleton;
    }

    methods {
        fn class_exists(&self, class: &StringName) -> bool = 2619796661;

        /// Direct base class, or an empty name for `Object` and unknown classes.
        fn get_parent_class(&self, class: &StringName) -> StringName = 1965194235;

        fn is_parent_class(&self, class: &StringName, inherits: &StringName) -> bool = 471820014;

        fn can_instantiate(&self, class: &StringName) -> bool = 2619796661;

        /// New instance wrapped in a variant, or nil if the class cannot be instantiated.
        fn instantiate(&self, class: &StringName) -> Variant = 2760726917;

        fn class_set_property(&self, object: &Gd<Object>, property: &StringName, value: &Variant) -> Error = 1690314931;
    }
}
