/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Internals used by macros and the entry point. Not part of the public API.

pub use crate::init::__load_library;
pub use crate::sys;

use std::any::Any;

/// Executes `code`. If a panic is thrown, it is caught and an error message is printed to the engine.
///
/// Returns `Err(message)` if a panic occurred, and `Ok(result)` with the result of `code` otherwise.
pub fn handle_panic<E, F, R, S>(error_context: E, code: F) -> Result<R, String>
where
    E: FnOnce() -> S,
    F: FnOnce() -> R + std::panic::UnwindSafe,
    S: std::fmt::Display,
{
    match std::panic::catch_unwind(code) {
        Ok(result) => Ok(result),
        Err(err) => {
            let msg = extract_panic_message(err);
            let formatted = format_panic_message(&msg);
            crate::godot_error!("{}\n{formatted}", error_context());
            Err(msg)
        }
    }
}

pub fn extract_panic_message(err: Box<dyn Any + Send>) -> String {
    if let Some(s) = err.downcast_ref::<&'static str>() {
        s.to_string()
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else {
        format!("(panic of type ID {:?})", err.type_id())
    }
}

fn format_panic_message(msg: &str) -> String {
    // Multi-line messages start on their own line, with every line indented.
    let lbegin = "\n  ";
    let indented = msg.replace('\n', lbegin);

    if indented.len() != msg.len() {
        format!("[panic]{lbegin}{indented}")
    } else {
        format!("[panic]  {msg}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads() {
        let payload = std::panic::catch_unwind(|| panic!("static message")).unwrap_err();
        assert_eq!(extract_panic_message(payload), "static message");

        let payload = std::panic::catch_unwind(|| panic!("formatted {}", 42)).unwrap_err();
        assert_eq!(extract_panic_message(payload), "formatted 42");

        let payload = std::panic::catch_unwind(|| std::panic::panic_any(7_u32)).unwrap_err();
        assert!(extract_panic_message(payload).starts_with("(panic of type ID"));
    }

    #[test]
    fn multiline_messages_are_indented() {
        assert_eq!(format_panic_message("short"), "[panic]  short");
        assert_eq!(format_panic_message("first\nsecond"), "[panic]\n  first\n  second");
    }

    #[test]
    fn handle_panic_returns_message() {
        // Not initialized: the error goes to stderr.
        let result: Result<(), String> = handle_panic(|| "context", || panic!("boom"));
        assert_eq!(result, Err("boom".to_string()));

        let result = handle_panic(|| "context", || 5);
        assert_eq!(result, Ok(5));
    }
}
