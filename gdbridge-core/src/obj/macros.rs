/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Declares an engine class and its ptrcall trampolines.
///
/// ```ignore
/// engine_class! {
///     /// Docs for the class.
///     pub struct Node2D {
///         inherits: Node, Object;
///         kind: Instantiable;
///     }
///
///     methods {
///         fn set_position(&mut self, position: Vector2) = 743155724;
///         fn get_position(&self) -> Vector2 = 3341600327;
///     }
/// }
/// ```
///
/// `inherits` lists the direct base first, followed by the remaining ancestors up to `Object`. It is omitted for the
/// root class. `kind` is one of `Instantiable`, `Singleton` or `Abstract`. An optional `class_name: "...";` overrides
/// the engine name, which otherwise is the struct name.
///
/// The invoking module receives:
/// - the class struct with `GodotClass`, `Inherits` and `Deref` impls,
/// - a `method_keys` module with one `MethodKey` constant per method, and `METHOD_KEYS` listing them,
/// - one method per declared method, which packs its arguments into a call-frame and calls the cached method-bind.
///
/// Arguments are taken the way they are declared. A `Gd<T>` parameter taken by value is dropped when the trampoline
/// returns, after the engine took what it needs from the call.
macro_rules! engine_class {
    (
        $( #[$attr:meta] )*
        pub struct $Class:ident {
            $( class_name: $engine_name:literal; )?
            $( inherits: $Base:ident $(, $Ancestor:ident )* ; )?
            kind: $Kind:ident;
        }

        methods {
            $(
                $( #[$method_attr:meta] )*
                fn $method:ident ( $( $signature:tt )* ) $( -> $Ret:ty )? = $hash:literal;
            )*
        }
    ) => {
        $( #[$attr] )*
        #[repr(transparent)]
        pub struct $Class {
            handle: $crate::obj::ClassHandle,
        }

        // SAFETY: `repr(transparent)` over `ClassHandle`.
        unsafe impl $crate::obj::GodotClass for $Class {
            type Base = $crate::obj::engine_class!(@base $( $Base )?);

            const CLASS_NAME: &'static str = $crate::obj::engine_class!(@name $Class $( $engine_name )?);
        }

        $(
            // SAFETY: class hierarchy as declared by the engine.
            unsafe impl $crate::obj::Inherits<$Base> for $Class {}
            $(
                unsafe impl $crate::obj::Inherits<$Ancestor> for $Class {}
            )*

            impl std::ops::Deref for $Class {
                type Target = $Base;

                fn deref(&self) -> &$Base {
                    // SAFETY: both are `repr(transparent)` over `ClassHandle`.
                    unsafe { &*(self as *const Self as *const $Base) }
                }
            }

            impl std::ops::DerefMut for $Class {
                fn deref_mut(&mut self) -> &mut $Base {
                    // SAFETY: see `Deref`.
                    unsafe { &mut *(self as *mut Self as *mut $Base) }
                }
            }
        )?

        $crate::obj::engine_class!(@kind $Class $Kind);

        /// Static keys of the method-binds used by this class.
        pub mod method_keys {
            use $crate::obj::GodotClass as _;

            $(
                #[allow(non_upper_case_globals)]
                pub const $method: $crate::sys::MethodKey =
                    $crate::sys::MethodKey::new(super::$Class::CLASS_NAME, stringify!($method), $hash);
            )*

            pub const METHOD_KEYS: &[$crate::sys::MethodKey] = &[ $( $method ),* ];
        }

        impl $Class {
            $(
                $crate::obj::engine_class!(@method
                    $( #[$method_attr] )*
                    fn $method ( $( $signature )* ) $( -> $Ret )?
                );
            )*
        }
    };

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // Helpers

    (@base) => { $crate::obj::NoBase };
    (@base $Base:ident) => { $Base };

    (@name $Class:ident) => { stringify!($Class) };
    (@name $Class:ident $engine_name:literal) => { $engine_name };

    (@kind $Class:ident Instantiable) => {
        impl $crate::obj::Instantiable for $Class {}
    };
    (@kind $Class:ident Singleton) => {
        impl $crate::obj::Singleton for $Class {
            fn singleton() -> $crate::obj::Gd<Self> {
                $crate::obj::Gd::singleton_by_name(<Self as $crate::obj::GodotClass>::CLASS_NAME)
            }
        }
    };
    (@kind $Class:ident Abstract) => {};

    (@method
        $( #[$method_attr:meta] )*
        fn $method:ident ( &self $(, $param:ident : $ParamTy:ty )* ) $( -> $Ret:ty )?
    ) => {
        $( #[$method_attr] )*
        pub fn $method(&self $(, $param: $ParamTy )*) $( -> $Ret )? {
            let object = self.handle.checked_obj_sys(<Self as $crate::obj::GodotClass>::CLASS_NAME);
            $crate::obj::engine_class!(@call $method, object $(, $param )*)
        }
    };

    (@method
        $( #[$method_attr:meta] )*
        fn $method:ident ( &mut self $(, $param:ident : $ParamTy:ty )* ) $( -> $Ret:ty )?
    ) => {
        $( #[$method_attr] )*
        pub fn $method(&mut self $(, $param: $ParamTy )*) $( -> $Ret )? {
            let object = self.handle.checked_obj_sys(<Self as $crate::obj::GodotClass>::CLASS_NAME);
            $crate::obj::engine_class!(@call $method, object $(, $param )*)
        }
    };

    (@call $method:ident, $object:ident $(, $param:ident )*) => {{
        #[allow(unused_mut)]
        let mut frame = $crate::sys::CallFrame::new();
        $(
            $crate::meta::AsArg::push_arg(&$param, &mut frame);
        )*

        // SAFETY: `object` is alive, and the frame holds the parameters declared for this method-bind.
        unsafe { $crate::meta::Signature::out_class_ptrcall(&method_keys::$method, $object, frame) }
    }};
}

pub(crate) use engine_class;
