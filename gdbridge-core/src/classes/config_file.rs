/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::{GString, Variant};
use crate::classes::{Object, RefCounted};
use crate::global::Error;
use crate::obj::engine_class;

engine_class! {
    /// INI-style configuration file, organized in sections of key-value pairs.
    pub struct ConfigFile {
        inherits: RefCounted, Object;
        kind: Instantiable;
    }

    methods {
        /// Stores `value` under `section`/`key`. A nil value erases the key, and the section once it is empty.
        fn set_value(&mut self, section: &GString, key: &GString, value: &Variant) = 2504492430;

        /// Stored value, or `default` if there is none.
        fn get_value(&self, section: &GString, key: &GString, default: &Variant) -> Variant = 89809366;

        fn has_section(&self, section: &GString) -> bool = 3927539163;

        /// Replaces the contents with the file at `path`. The engine's error code is returned unchanged.
        fn load(&mut self, path: &GString) -> Error = 166001499;
    }
}
