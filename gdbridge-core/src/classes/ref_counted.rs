/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::classes::Object;
use crate::obj::engine_class;

engine_class! {
    /// Base class of all reference-counted objects.
    ///
    /// `Gd` manages the count on its own. The raw counting methods are only exposed for diagnostics.
    pub struct RefCounted {
        inherits: Object;
        kind: Instantiable;
    }

    methods {
        #[doc(hidden)]
        fn init_ref(&mut self) -> bool = 2240911060;

        #[doc(hidden)]
        fn reference(&mut self) -> bool = 2240911060;

        #[doc(hidden)]
        fn unreference(&mut self) -> bool = 2240911060;

        fn get_reference_count(&self) -> i32 = 3905245786;
    }
}
