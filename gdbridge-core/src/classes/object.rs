/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::{GString, StringName, ToVariant, Variant};
use crate::meta::error::CallError;
use crate::meta::Signature;
use crate::obj::{engine_class, GodotClass};
use crate::sys::MethodKey;

engine_class! {
    /// Root of the engine's class hierarchy.
    ///
    /// Objects are either RefCounted (see [`RefCounted`][super::RefCounted]) or manually managed.
    pub struct Object {
        kind: Instantiable;
    }

    methods {
        /// Name of the object's dynamic class.
        fn get_class(&self) -> GString = 201670096;

        /// Whether the object's class is `class` or inherits from it.
        fn is_class(&self, class: &GString) -> bool = 3927539163;

        fn has_method(&self, method: &StringName) -> bool = 2619796661;

        fn get_instance_id(&self) -> i64 = 3905245786;
    }
}

/// Vararg `Object.call()`, dispatched through `object_method_bind_call`.
pub const CALL: MethodKey = MethodKey::new("Object", "call", 3400424181);

impl Object {
    /// ⚠️ Calls a method by name, with arguments passed as variants.
    ///
    /// # Panics
    /// If the call fails; see [`try_call()`][Self::try_call] for the error cases.
    #[track_caller]
    pub fn call(&mut self, method: impl Into<StringName>, args: &[Variant]) -> Variant {
        self.try_call(method, args)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    /// Calls a method by name, with arguments passed as variants.
    ///
    /// Returns `Err` if the method does not exist, the argument count or types do not match, or the instance is gone.
    pub fn try_call(&mut self, method: impl Into<StringName>, args: &[Variant]) -> Result<Variant, CallError> {
        let method = method.into();
        let object = self.handle.checked_obj_sys(Self::CLASS_NAME);

        // SAFETY: `object` is alive; the method name is passed as the first, declared argument.
        unsafe { Signature::out_class_varcall(&CALL, object, &[method.to_variant()], args) }
    }
}
