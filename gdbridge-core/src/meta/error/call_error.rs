/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::error::Error;
use std::fmt;

use crate::builtin::{Variant, VariantType};
use crate::meta::CallContext;
use crate::sys;

/// Error capable of representing failed function calls.
///
/// This type is returned from _varcall_ functions in the engine API that begin with `try_` prefixes, e.g.
/// [`Object::try_call()`](crate::classes::Object::try_call). _Varcall_ refers to the "variant call" calling convention,
/// meaning that arguments and return values are passed as `Variant` (as opposed to _ptrcall_, which passes direct
/// pointers to native values).
///
/// Allows to inspect the involved class and method via `class_name()` and `method_name()`.
///
/// # Possible error causes
/// The reason is described in the `Display` impl. It follows the engine's call error kinds:
///
/// - **Invalid method**: The method does not exist on the object.
/// - **Failed argument conversion**: An argument has a type the method cannot accept.
/// - **Too many or too few arguments**: The number of arguments does not match the number of parameters.
/// - **Null instance**: The object was freed or never existed.
/// - **Method not const**: A non-const method was called on a const instance.
pub struct CallError {
    // Boxed to keep `Result<Variant, CallError>` small.
    b: Box<InnerCallError>,
}

#[derive(Debug)]
struct InnerCallError {
    class_name: String,
    function_name: String,
    call_expr: String,
    reason: String,
}

impl CallError {
    /// Name of the class whose method failed. **Not** the dynamic type.
    ///
    /// Calling `call()` on a `Gd<Node>` is a call to `Object::call()` (through `Deref`), so the class name is `Object`.
    pub fn class_name(&self) -> Option<&str> {
        if self.b.class_name.is_empty() {
            None
        } else {
            Some(&self.b.class_name)
        }
    }

    /// Name of the function or method that failed.
    pub fn method_name(&self) -> &str {
        &self.b.function_name
    }

    /// Reason without the call expression, e.g. `"method not found"`.
    pub fn reason(&self) -> &str {
        &self.b.reason
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // Constructors returning Result<(), Self>; possible failure

    /// Checks the engine side of a varcall (low-level `sys::GDExtensionCallError`).
    pub(crate) fn check_out_varcall(
        call_ctx: &CallContext,
        err: sys::GDExtensionCallError,
        explicit_args: &[Variant],
        varargs: &[Variant],
    ) -> Result<(), Self> {
        if err.error == sys::GDEXTENSION_CALL_OK {
            return Ok(());
        }

        let mut arg_types = Vec::with_capacity(explicit_args.len() + varargs.len());
        arg_types.extend(explicit_args.iter().map(Variant::get_type));
        arg_types.extend(varargs.iter().map(Variant::get_type));

        let explicit_args_str = join_args(explicit_args);
        let vararg_str = if varargs.is_empty() {
            String::new()
        } else {
            format!(", [va] {}", join_args(varargs))
        };

        let call_expr = format!("{call_ctx}({explicit_args_str}{vararg_str})");

        Err(Self::failed_varcall_inner(
            call_ctx,
            call_expr,
            err,
            &arg_types,
            explicit_args.len(),
        ))
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // Constructors returning Self; guaranteed failure

    fn failed_param_conversion_engine(
        call_ctx: &CallContext,
        param_index: i32,
        actual: VariantType,
        expected: VariantType,
    ) -> Self {
        let reason =
            format!("parameter #{param_index} -- cannot convert from {actual:?} to {expected:?}");

        Self::new(call_ctx, reason)
    }

    fn failed_param_count(call_ctx: &CallContext, arg_count: usize, param_count: usize) -> Self {
        let param_plural = plural(param_count);
        let arg_plural = plural(arg_count);

        Self::new(
            call_ctx,
            format!(
                "function has {param_count} parameter{param_plural}, but received {arg_count} argument{arg_plural}"
            ),
        )
    }

    fn failed_varcall_inner(
        call_ctx: &CallContext,
        call_expr: String,
        err: sys::GDExtensionCallError,
        arg_types: &[VariantType],
        vararg_offset: usize,
    ) -> Self {
        // Reflection-style calls like call("method", ...): varargs are the actual arguments, explicit ones are metadata.
        debug_assert_ne!(err.error, sys::GDEXTENSION_CALL_OK);

        let sys::GDExtensionCallError {
            error,
            argument,
            expected,
        } = err;

        let mut call_error = match error {
            sys::GDEXTENSION_CALL_ERROR_INVALID_METHOD => Self::new(call_ctx, "method not found"),
            sys::GDEXTENSION_CALL_ERROR_INVALID_ARGUMENT => {
                let from = usize::try_from(argument)
                    .ok()
                    .and_then(|arg| arg_types.get(vararg_offset + arg))
                    .copied()
                    .unwrap_or(VariantType::Nil);
                let to = VariantType::try_from_sys(expected as sys::GDExtensionVariantType)
                    .unwrap_or(VariantType::Nil);
                let i = argument + 1;

                Self::failed_param_conversion_engine(call_ctx, i, from, to)
            }
            sys::GDEXTENSION_CALL_ERROR_TOO_MANY_ARGUMENTS
            | sys::GDEXTENSION_CALL_ERROR_TOO_FEW_ARGUMENTS => {
                let arg_count = arg_types.len().saturating_sub(vararg_offset);
                let param_count = expected.max(0) as usize;
                Self::failed_param_count(call_ctx, arg_count, param_count)
            }
            sys::GDEXTENSION_CALL_ERROR_INSTANCE_IS_NULL => Self::new(call_ctx, "instance is null"),
            sys::GDEXTENSION_CALL_ERROR_METHOD_NOT_CONST => {
                Self::new(call_ctx, "method is not const")
            }
            _ => Self::new(call_ctx, format!("unknown reason (error code {error})")),
        };

        call_error.b.call_expr = call_expr;
        call_error
    }

    fn new(call_ctx: &CallContext, reason: impl Into<String>) -> Self {
        let inner = InnerCallError {
            class_name: call_ctx.class_name.to_string(),
            function_name: call_ctx.function_name.to_string(),
            call_expr: format!("{call_ctx}()"),
            reason: reason.into(),
        };

        Self { b: Box::new(inner) }
    }

    /// Describes the error.
    ///
    /// This is the same as the `Display`/`ToString` repr, but without the prefix mentioning that this is a function call
    /// error.
    pub fn message(&self) -> String {
        let InnerCallError {
            call_expr, reason, ..
        } = &*self.b;

        let reason_str = if reason.is_empty() {
            String::new()
        } else {
            format!("\n    Reason: {reason}")
        };

        format!("{call_expr}{reason_str}")
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.message();
        write!(f, "gdbridge function call failed: {message}")
    }
}

impl fmt::Debug for CallError {
    // Delegate to inner box.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.b)
    }
}

impl Error for CallError {}

fn join_args(args: &[Variant]) -> String {
    args.iter()
        .map(|arg| format!("{arg:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    const CTX: CallContext<'static> = CallContext::outbound("Object", "call");

    fn err(error: sys::GDExtensionCallErrorType, argument: i32, expected: i32) -> sys::GDExtensionCallError {
        sys::GDExtensionCallError {
            error,
            argument,
            expected,
        }
    }

    #[test]
    fn method_not_found() {
        let e = CallError::failed_varcall_inner(
            &CTX,
            "Object::call()".to_string(),
            err(sys::GDEXTENSION_CALL_ERROR_INVALID_METHOD, 0, 0),
            &[VariantType::StringName],
            1,
        );

        assert_eq!(e.class_name(), Some("Object"));
        assert_eq!(e.method_name(), "call");
        assert_eq!(e.reason(), "method not found");
        assert_eq!(
            e.to_string(),
            "gdbridge function call failed: Object::call()\n    Reason: method not found"
        );
    }

    #[test]
    fn argument_conversion_names_types() {
        let e = CallError::failed_varcall_inner(
            &CTX,
            String::new(),
            err(
                sys::GDEXTENSION_CALL_ERROR_INVALID_ARGUMENT,
                0,
                VariantType::String.sys(),
            ),
            &[VariantType::StringName, VariantType::Int],
            1,
        );

        assert_eq!(e.reason(), "parameter #1 -- cannot convert from Int to String");
    }

    #[test]
    fn argument_index_out_of_range_falls_back_to_nil() {
        let e = CallError::failed_varcall_inner(
            &CTX,
            String::new(),
            err(sys::GDEXTENSION_CALL_ERROR_INVALID_ARGUMENT, 5, VariantType::Bool.sys()),
            &[],
            0,
        );

        assert_eq!(e.reason(), "parameter #6 -- cannot convert from Nil to Bool");
    }

    #[test]
    fn argument_count_excludes_explicit_args() {
        let too_many = CallError::failed_varcall_inner(
            &CTX,
            String::new(),
            err(sys::GDEXTENSION_CALL_ERROR_TOO_MANY_ARGUMENTS, 0, 0),
            &[VariantType::StringName, VariantType::Int, VariantType::Int],
            1,
        );
        assert_eq!(
            too_many.reason(),
            "function has 0 parameters, but received 2 arguments"
        );

        let too_few = CallError::failed_varcall_inner(
            &CTX,
            String::new(),
            err(sys::GDEXTENSION_CALL_ERROR_TOO_FEW_ARGUMENTS, 0, 1),
            &[VariantType::StringName],
            1,
        );
        assert_eq!(
            too_few.reason(),
            "function has 1 parameter, but received 0 arguments"
        );
    }

    #[test]
    fn other_engine_reasons() {
        let reason = |code| {
            CallError::failed_varcall_inner(&CTX, String::new(), err(code, 0, 0), &[], 0)
                .reason()
                .to_string()
        };

        assert_eq!(reason(sys::GDEXTENSION_CALL_ERROR_INSTANCE_IS_NULL), "instance is null");
        assert_eq!(reason(sys::GDEXTENSION_CALL_ERROR_METHOD_NOT_CONST), "method is not const");
        assert_eq!(reason(99), "unknown reason (error code 99)");
    }
}
