/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ffi::c_char;

use crate as sys;

/// Declares [`GDExtensionInterface`] and its loader from a list of `field: Typedef` pairs.
///
/// The field name doubles as the C symbol passed to `get_proc_address`.
macro_rules! interface_table {
    ( $( $field:ident : $FnTy:ident ),* $(,)? ) => {
        /// Function pointers of the GDExtension interface, resolved once at startup.
        ///
        /// A field is `None` if the running engine does not provide that function.
        #[derive(Copy, Clone)]
        pub struct GDExtensionInterface {
            $( pub $field: sys::$FnTy, )*
        }

        impl GDExtensionInterface {
            /// Resolves every function through `get_proc_address`.
            ///
            /// # Safety
            /// `get_proc_address` must be the pointer handed to the extension entry point, and must return functions
            /// with the signatures declared in `gdextension_interface`.
            pub unsafe fn load(get_proc_address: sys::GDExtensionInterfaceGetProcAddress) -> Self {
                let Some(get_proc_address) = get_proc_address else {
                    panic!("get_proc_address is null; the extension was not loaded by a GDExtension host");
                };

                Self {
                    $(
                        $field: {
                            let name = concat!(stringify!($field), "\0");
                            let fptr = get_proc_address(name.as_ptr() as *const c_char);

                            // Both sides are `Option<unsafe extern "C" fn(..)>`, which have identical layout.
                            std::mem::transmute::<sys::GDExtensionInterfaceFunctionPtr, sys::$FnTy>(fptr)
                        },
                    )*
                }
            }

            /// Names of all functions the engine did not provide.
            pub fn missing_functions(&self) -> Vec<&'static str> {
                let mut missing = Vec::new();
                $(
                    if self.$field.is_none() {
                        missing.push(stringify!($field));
                    }
                )*
                missing
            }
        }
    };
}

interface_table! {
    get_godot_version: GDExtensionInterfaceGetGodotVersion,
    print_error: GDExtensionInterfacePrintError,
    print_warning: GDExtensionInterfacePrintWarning,
    print_script_error: GDExtensionInterfacePrintScriptError,
    variant_new_copy: GDExtensionInterfaceVariantNewCopy,
    variant_new_nil: GDExtensionInterfaceVariantNewNil,
    variant_destroy: GDExtensionInterfaceVariantDestroy,
    variant_get_type: GDExtensionInterfaceVariantGetType,
    variant_stringify: GDExtensionInterfaceVariantStringify,
    get_variant_from_type_constructor: GDExtensionInterfaceGetVariantFromTypeConstructor,
    get_variant_to_type_constructor: GDExtensionInterfaceGetVariantToTypeConstructor,
    variant_get_ptr_constructor: GDExtensionInterfaceVariantGetPtrConstructor,
    variant_get_ptr_destructor: GDExtensionInterfaceVariantGetPtrDestructor,
    variant_get_ptr_builtin_method: GDExtensionInterfaceVariantGetPtrBuiltinMethod,
    string_new_with_utf8_chars_and_len: GDExtensionInterfaceStringNewWithUtf8CharsAndLen,
    string_to_utf8_chars: GDExtensionInterfaceStringToUtf8Chars,
    string_name_new_with_utf8_chars_and_len: GDExtensionInterfaceStringNameNewWithUtf8CharsAndLen,
    array_operator_index: GDExtensionInterfaceArrayOperatorIndex,
    array_operator_index_const: GDExtensionInterfaceArrayOperatorIndexConst,
    dictionary_operator_index: GDExtensionInterfaceDictionaryOperatorIndex,
    object_method_bind_call: GDExtensionInterfaceObjectMethodBindCall,
    object_method_bind_ptrcall: GDExtensionInterfaceObjectMethodBindPtrcall,
    object_destroy: GDExtensionInterfaceObjectDestroy,
    global_get_singleton: GDExtensionInterfaceGlobalGetSingleton,
    object_get_instance_id: GDExtensionInterfaceObjectGetInstanceId,
    object_get_instance_from_id: GDExtensionInterfaceObjectGetInstanceFromId,
    object_cast_to: GDExtensionInterfaceObjectCastTo,
    object_get_class_name: GDExtensionInterfaceObjectGetClassName,
    classdb_construct_object: GDExtensionInterfaceClassdbConstructObject,
    classdb_get_method_bind: GDExtensionInterfaceClassdbGetMethodBind,
    classdb_get_class_tag: GDExtensionInterfaceClassdbGetClassTag,
}

/// Diverging path of [`interface_fn!`](crate::interface_fn), kept out of line.
#[doc(hidden)]
#[cold]
#[track_caller]
pub fn missing_interface_fn(name: &str) -> ! {
    panic!(
        "GDExtension interface function `{name}` is not provided by the running engine; \
        make sure the engine version is compatible with this extension"
    )
}

/// Fetches a function from the loaded interface, panicking if the engine does not provide it.
#[macro_export]
#[doc(hidden)]
macro_rules! interface_fn {
    ($name:ident) => {{
        match unsafe { $crate::get_interface() }.$name {
            Some(f) => f,
            None => $crate::missing_interface_fn(stringify!($name)),
        }
    }};
}
