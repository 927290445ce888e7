/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ffi::{c_char, CStr};

use gdbridge_ffi as sys;
use sys::Global;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warning,
    ScriptError,
}

/// One message received through the engine's print functions, or emitted by the mock itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub function: String,
    pub file: String,
    pub line: i32,
}

static LOG: Global<Vec<LogEntry>> = Global::default();

pub(crate) fn push(level: LogLevel, message: String) {
    LOG.lock().push(LogEntry {
        level,
        message,
        function: String::new(),
        file: String::new(),
        line: 0,
    });
}

pub(crate) fn engine_error(message: impl Into<String>) {
    push(LogLevel::Error, message.into());
}

/// All messages recorded so far.
pub fn entries() -> Vec<LogEntry> {
    LOG.lock().clone()
}

/// Whether any message of `level` contains `needle`.
pub fn contains(level: LogLevel, needle: &str) -> bool {
    LOG.lock()
        .iter()
        .any(|e| e.level == level && e.message.contains(needle))
}

unsafe fn lossy(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

unsafe fn record(
    level: LogLevel,
    description: *const c_char,
    function: *const c_char,
    file: *const c_char,
    line: i32,
) {
    LOG.lock().push(LogEntry {
        level,
        message: lossy(description),
        function: lossy(function),
        file: lossy(file),
        line,
    });
}

pub(crate) unsafe extern "C" fn print_error(
    description: *const c_char,
    function: *const c_char,
    file: *const c_char,
    line: i32,
    _editor_notify: sys::GDExtensionBool,
) {
    record(LogLevel::Error, description, function, file, line);
}

pub(crate) unsafe extern "C" fn print_warning(
    description: *const c_char,
    function: *const c_char,
    file: *const c_char,
    line: i32,
    _editor_notify: sys::GDExtensionBool,
) {
    record(LogLevel::Warning, description, function, file, line);
}

pub(crate) unsafe extern "C" fn print_script_error(
    description: *const c_char,
    function: *const c_char,
    file: *const c_char,
    line: i32,
    _editor_notify: sys::GDExtensionBool,
) {
    record(LogLevel::ScriptError, description, function, file, line);
}
