/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Printing and logging functionality.

use std::fmt;

use crate::sys;

// https://stackoverflow.com/a/40234666
#[macro_export]
#[doc(hidden)]
macro_rules! inner_function {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        match name.strip_suffix("::f") {
            Some(stripped) => stripped,
            None => name,
        }
    }};
}

#[macro_export]
#[doc(hidden)]
macro_rules! inner_godot_msg {
    ($level:ident; $fmt:literal $(, $args:expr)* $(,)?) => {
        $crate::global::print::forward_message(
            $crate::global::print::MessageLevel::$level,
            format_args!($fmt $(, $args)*),
            $crate::inner_function!(),
            file!(),
            line!(),
        )
    };
}

/// Pushes a warning message to the engine's debugger and to the OS terminal.
///
/// Before the extension is initialized, the message goes to stderr.
#[macro_export]
macro_rules! godot_warn {
    ($fmt:literal $(, $args:expr)* $(,)?) => {
        $crate::inner_godot_msg!(Warning; $fmt $(, $args)*);
    };
}

/// Pushes an error message to the engine's debugger and to the OS terminal.
///
/// Before the extension is initialized, the message goes to stderr.
#[macro_export]
macro_rules! godot_error {
    ($fmt:literal $(, $args:expr)* $(,)?) => {
        $crate::inner_godot_msg!(Error; $fmt $(, $args)*);
    };
}

/// Logs a script error to the engine's debugger and to the OS terminal.
#[macro_export]
macro_rules! godot_script_error {
    ($fmt:literal $(, $args:expr)* $(,)?) => {
        $crate::inner_godot_msg!(ScriptError; $fmt $(, $args)*);
    };
}

#[doc(hidden)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MessageLevel {
    Error,
    Warning,
    ScriptError,
}

impl MessageLevel {
    fn sys_name(self) -> &'static str {
        match self {
            Self::Error => "print_error",
            Self::Warning => "print_warning",
            Self::ScriptError => "print_script_error",
        }
    }
}

#[doc(hidden)]
pub fn forward_message(level: MessageLevel, message: fmt::Arguments, function: &str, file: &str, line: u32) {
    if !sys::is_initialized() {
        eprintln!("[{}] {message}", level.sys_name());
        return;
    }

    let description = sys::to_c_string(&message.to_string());
    let function = sys::to_c_string(function);
    let file = sys::to_c_string(file);

    let print_fn = match level {
        MessageLevel::Error => sys::interface_fn!(print_error),
        MessageLevel::Warning => sys::interface_fn!(print_warning),
        MessageLevel::ScriptError => sys::interface_fn!(print_script_error),
    };

    // SAFETY: all strings are null-terminated and outlive the call.
    unsafe {
        print_fn(
            description.as_ptr(),
            function.as_ptr(),
            file.as_ptr(),
            line as i32,
            false as sys::GDExtensionBool, // whether to create a toast notification in editor
        );
    }
}
