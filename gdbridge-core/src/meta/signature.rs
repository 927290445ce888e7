/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::Variant;
use crate::meta::error::CallError;
use crate::meta::{CallContext, FromPtrcall};
use crate::sys;
use sys::{BuiltinMethodKey, CallFrame, MethodKey};

/// Out-calls from Rust into engine class methods and builtin-type methods.
///
/// Every generated trampoline ends in one of these functions: resolve the method from its table, hand the packed
/// frame to the engine, decode the return slot.
pub enum Signature {}

impl Signature {
    /// Calls the method `key` on `object` with the arguments in `frame`.
    ///
    /// # Safety
    /// - `object` must point to a live instance of `key.class_name` or a subclass (null for static methods).
    /// - `frame` must hold exactly the parameters of the method, in their ptrcall representation.
    /// - `R` must be the method's return type.
    ///
    /// # Panics
    /// If the engine does not provide the method-bind.
    pub unsafe fn out_class_ptrcall<R: FromPtrcall>(
        key: &MethodKey,
        object: sys::GDExtensionObjectPtr,
        frame: CallFrame,
    ) -> R {
        let method_bind = sys::method_bind(key);
        sys::out!("ptrcall {key} on {object:?} with {} arg(s)", frame.len());

        let raw = frame.invoke_raw(R::null_raw(), |args, ret| {
            sys::interface_fn!(object_method_bind_ptrcall)(method_bind.0, object, args, ret);
        });

        R::from_ptrcall(raw)
    }

    /// Calls the builtin method `key` on the value behind `base` (e.g. an `Array`).
    ///
    /// # Safety
    /// - `base` must point to a live value of `key.variant_type`.
    /// - `frame` must hold exactly the parameters of the method, in their ptrcall representation.
    /// - `R` must be the method's return type.
    ///
    /// # Panics
    /// If the engine does not provide the method.
    pub unsafe fn out_builtin_ptrcall<R: FromPtrcall>(
        key: &BuiltinMethodKey,
        base: sys::GDExtensionTypePtr,
        frame: CallFrame,
    ) -> R {
        let method = sys::builtin_method(key);
        let arg_count = frame.len() as i32;
        sys::out!("builtin ptrcall {key} with {arg_count} arg(s)");

        let raw = frame.invoke_raw(R::null_raw(), |args, ret| {
            method(base, args, ret, arg_count);
        });

        R::from_ptrcall(raw)
    }

    /// Calls the vararg method `key` through `object_method_bind_call`.
    ///
    /// `explicit_args` are the declared parameters (e.g. the method name of `Object::call`); `varargs` follow them.
    ///
    /// # Safety
    /// `object` must point to a live instance of `key.class_name` or a subclass.
    pub unsafe fn out_class_varcall(
        key: &MethodKey,
        object: sys::GDExtensionObjectPtr,
        explicit_args: &[Variant],
        varargs: &[Variant],
    ) -> Result<Variant, CallError> {
        let call_ctx = CallContext::outbound(key.class_name, key.method_name);
        let method_bind = sys::method_bind(key);
        sys::out!("varcall {call_ctx} on {object:?}");

        // Bit copies; the Variants in the slices stay the owners.
        let opaques: Vec<sys::OpaqueVariant> = explicit_args
            .iter()
            .chain(varargs)
            .map(Variant::opaque)
            .collect();
        let arg_ptrs: Vec<sys::GDExtensionConstVariantPtr> =
            opaques.iter().map(|opaque| opaque.as_ptr()).collect();

        let mut ret = sys::OpaqueVariant::zeroed();
        let mut err = sys::default_call_error();
        sys::interface_fn!(object_method_bind_call)(
            method_bind.0,
            object,
            arg_ptrs.as_ptr(),
            arg_ptrs.len() as sys::GDExtensionInt,
            ret.as_mut_ptr(),
            &mut err,
        );

        // The engine writes the return slot on failure too.
        let result = Variant::from_opaque(ret);
        CallError::check_out_varcall(&call_ctx, err, explicit_args, varargs)?;

        Ok(result)
    }
}
