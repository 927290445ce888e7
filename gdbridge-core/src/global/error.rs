/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::meta::{AsArg, FromPtrcall};
use crate::sys;
use sys::{CallFrame, GodotFfi};

/// Error code returned by engine methods, such as [`ConfigFile::load()`][crate::classes::ConfigFile::load].
///
/// Codes are passed through unchanged, including values this crate does not know. `Error::OK` signals success.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Error(i32);

impl Error {
    pub const OK: Error = Error(0);
    pub const FAILED: Error = Error(1);
    pub const ERR_UNAVAILABLE: Error = Error(2);
    pub const ERR_UNCONFIGURED: Error = Error(3);
    pub const ERR_UNAUTHORIZED: Error = Error(4);
    pub const ERR_PARAMETER_RANGE_ERROR: Error = Error(5);
    pub const ERR_OUT_OF_MEMORY: Error = Error(6);
    pub const ERR_FILE_NOT_FOUND: Error = Error(7);
    pub const ERR_FILE_BAD_DRIVE: Error = Error(8);
    pub const ERR_FILE_BAD_PATH: Error = Error(9);
    pub const ERR_FILE_NO_PERMISSION: Error = Error(10);
    pub const ERR_FILE_ALREADY_IN_USE: Error = Error(11);
    pub const ERR_FILE_CANT_OPEN: Error = Error(12);
    pub const ERR_FILE_CANT_WRITE: Error = Error(13);
    pub const ERR_FILE_CANT_READ: Error = Error(14);
    pub const ERR_FILE_UNRECOGNIZED: Error = Error(15);
    pub const ERR_FILE_CORRUPT: Error = Error(16);
    pub const ERR_FILE_MISSING_DEPENDENCIES: Error = Error(17);
    pub const ERR_FILE_EOF: Error = Error(18);
    pub const ERR_CANT_OPEN: Error = Error(19);
    pub const ERR_CANT_CREATE: Error = Error(20);
    pub const ERR_QUERY_FAILED: Error = Error(21);
    pub const ERR_ALREADY_IN_USE: Error = Error(22);
    pub const ERR_LOCKED: Error = Error(23);
    pub const ERR_TIMEOUT: Error = Error(24);
    pub const ERR_CANT_CONNECT: Error = Error(25);
    pub const ERR_CANT_RESOLVE: Error = Error(26);
    pub const ERR_CONNECTION_ERROR: Error = Error(27);
    pub const ERR_CANT_ACQUIRE_RESOURCE: Error = Error(28);
    pub const ERR_CANT_FORK: Error = Error(29);
    pub const ERR_INVALID_DATA: Error = Error(30);
    pub const ERR_INVALID_PARAMETER: Error = Error(31);
    pub const ERR_ALREADY_EXISTS: Error = Error(32);
    pub const ERR_DOES_NOT_EXIST: Error = Error(33);
    pub const ERR_DATABASE_CANT_READ: Error = Error(34);
    pub const ERR_DATABASE_CANT_WRITE: Error = Error(35);
    pub const ERR_COMPILATION_FAILED: Error = Error(36);
    pub const ERR_METHOD_NOT_FOUND: Error = Error(37);
    pub const ERR_LINK_FAILED: Error = Error(38);
    pub const ERR_SCRIPT_FAILED: Error = Error(39);
    pub const ERR_CYCLIC_LINK: Error = Error(40);
    pub const ERR_INVALID_DECLARATION: Error = Error(41);
    pub const ERR_DUPLICATE_SYMBOL: Error = Error(42);
    pub const ERR_PARSE_ERROR: Error = Error(43);
    pub const ERR_BUSY: Error = Error(44);
    pub const ERR_SKIP: Error = Error(45);
    pub const ERR_HELP: Error = Error(46);
    pub const ERR_BUG: Error = Error(47);
    pub const ERR_PRINTER_ON_FIRE: Error = Error(48);

    /// Highest code known to this crate.
    pub const MAX: i32 = 48;

    /// Code as the engine reports it.
    pub const fn ord(self) -> i32 {
        self.0
    }

    /// Wraps a raw code. Unknown codes are kept as they are.
    pub const fn from_ord(ord: i32) -> Self {
        Self(ord)
    }

    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }

    /// Upstream name of the constant, e.g. `"ERR_FILE_NOT_FOUND"`. `None` for unknown codes.
    pub fn as_str(self) -> Option<&'static str> {
        let name = match self.0 {
            0 => "OK",
            1 => "FAILED",
            2 => "ERR_UNAVAILABLE",
            3 => "ERR_UNCONFIGURED",
            4 => "ERR_UNAUTHORIZED",
            5 => "ERR_PARAMETER_RANGE_ERROR",
            6 => "ERR_OUT_OF_MEMORY",
            7 => "ERR_FILE_NOT_FOUND",
            8 => "ERR_FILE_BAD_DRIVE",
            9 => "ERR_FILE_BAD_PATH",
            10 => "ERR_FILE_NO_PERMISSION",
            11 => "ERR_FILE_ALREADY_IN_USE",
            12 => "ERR_FILE_CANT_OPEN",
            13 => "ERR_FILE_CANT_WRITE",
            14 => "ERR_FILE_CANT_READ",
            15 => "ERR_FILE_UNRECOGNIZED",
            16 => "ERR_FILE_CORRUPT",
            17 => "ERR_FILE_MISSING_DEPENDENCIES",
            18 => "ERR_FILE_EOF",
            19 => "ERR_CANT_OPEN",
            20 => "ERR_CANT_CREATE",
            21 => "ERR_QUERY_FAILED",
            22 => "ERR_ALREADY_IN_USE",
            23 => "ERR_LOCKED",
            24 => "ERR_TIMEOUT",
            25 => "ERR_CANT_CONNECT",
            26 => "ERR_CANT_RESOLVE",
            27 => "ERR_CONNECTION_ERROR",
            28 => "ERR_CANT_ACQUIRE_RESOURCE",
            29 => "ERR_CANT_FORK",
            30 => "ERR_INVALID_DATA",
            31 => "ERR_INVALID_PARAMETER",
            32 => "ERR_ALREADY_EXISTS",
            33 => "ERR_DOES_NOT_EXIST",
            34 => "ERR_DATABASE_CANT_READ",
            35 => "ERR_DATABASE_CANT_WRITE",
            36 => "ERR_COMPILATION_FAILED",
            37 => "ERR_METHOD_NOT_FOUND",
            38 => "ERR_LINK_FAILED",
            39 => "ERR_SCRIPT_FAILED",
            40 => "ERR_CYCLIC_LINK",
            41 => "ERR_INVALID_DECLARATION",
            42 => "ERR_DUPLICATE_SYMBOL",
            43 => "ERR_PARSE_ERROR",
            44 => "ERR_BUSY",
            45 => "ERR_SKIP",
            46 => "ERR_HELP",
            47 => "ERR_BUG",
            48 => "ERR_PRINTER_ON_FIRE",
            _ => return None,
        };
        Some(name)
    }

    /// `Ok(())` for [`Error::OK`], otherwise `Err(self)`.
    pub fn to_result(self) -> Result<(), Error> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Default for Error {
    fn default() -> Self {
        Self::OK
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "unknown error ({})", self.0),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(name) => write!(f, "Error::{name}"),
            None => write!(f, "Error({})", self.0),
        }
    }
}

impl std::error::Error for Error {}

// Enums travel as 64-bit integers.
impl AsArg for Error {
    fn push_arg(&self, frame: &mut CallFrame) {
        frame.push_raw(i64::from(self.0));
    }
}

impl FromPtrcall for Error {
    type Raw = i64;

    fn null_raw() -> i64 {
        <i64 as GodotFfi>::null_raw()
    }

    unsafe fn from_ptrcall(raw: i64) -> Self {
        Self(raw as i32)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_have_names() {
        assert_eq!(Error::OK.as_str(), Some("OK"));
        assert_eq!(Error::ERR_FILE_NOT_FOUND.ord(), 7);
        assert_eq!(Error::ERR_PARSE_ERROR.as_str(), Some("ERR_PARSE_ERROR"));
        assert_eq!(Error::ERR_PRINTER_ON_FIRE.ord(), Error::MAX);

        for ord in 0..=Error::MAX {
            assert!(Error::from_ord(ord).as_str().is_some(), "code {ord} has no name");
        }
    }

    #[test]
    fn unknown_codes_pass_through() {
        let error = Error::from_ord(1234);

        assert_eq!(error.ord(), 1234);
        assert_eq!(error.as_str(), None);
        assert_eq!(error.to_string(), "unknown error (1234)");
        assert_eq!(error.to_result(), Err(error));
    }

    #[test]
    fn result_conversion() {
        assert_eq!(Error::OK.to_result(), Ok(()));
        assert_eq!(Error::default(), Error::OK);
        assert_eq!(Error::ERR_INVALID_DATA.to_result(), Err(Error::ERR_INVALID_DATA));
    }

    #[test]
    fn display_and_debug() {
        assert_eq!(Error::ERR_FILE_NOT_FOUND.to_string(), "ERR_FILE_NOT_FOUND (7)");
        assert_eq!(format!("{:?}", Error::FAILED), "Error::FAILED");
        assert_eq!(format!("{:?}", Error::from_ord(-3)), "Error(-3)");
    }
}
