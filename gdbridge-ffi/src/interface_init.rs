/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Version detection before the interface table exists.
//!
//! The entry point only receives `get_proc_address`, so the version is read through it directly.

use std::ffi::CStr;

use crate as sys;

/// Oldest engine version whose GDExtension interface provides every function this crate relies on.
pub const MIN_RUNTIME_VERSION: (u32, u32, u32) = (4, 2, 0);

/// Engine version reported by the host, as read at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub string: String,
}

impl RuntimeVersion {
    pub fn triple(&self) -> (u32, u32, u32) {
        (self.major, self.minor, self.patch)
    }

    /// # Safety
    /// `raw.string` must be null or point to a null-terminated C string.
    pub unsafe fn from_sys(raw: &sys::GDExtensionGodotVersion) -> Self {
        let string = if raw.string.is_null() {
            format!("{}.{}.{}", raw.major, raw.minor, raw.patch)
        } else {
            CStr::from_ptr(raw.string).to_string_lossy().into_owned()
        };

        Self {
            major: raw.major,
            minor: raw.minor,
            patch: raw.patch,
            string,
        }
    }
}

/// Reads the engine version through `get_proc_address`, without loading the rest of the interface.
///
/// # Safety
/// `get_proc_address` must be the pointer handed to the extension entry point.
pub unsafe fn read_runtime_version(
    get_proc_address: sys::GDExtensionInterfaceGetProcAddress,
) -> RuntimeVersion {
    let Some(get_proc_address) = get_proc_address else {
        panic!("get_proc_address unexpectedly null");
    };

    let fptr = get_proc_address(sys::c_str(b"get_godot_version\0"));
    let get_godot_version = std::mem::transmute::<
        sys::GDExtensionInterfaceFunctionPtr,
        sys::GDExtensionInterfaceGetGodotVersion,
    >(fptr);

    let Some(get_godot_version) = get_godot_version else {
        sys::missing_interface_fn("get_godot_version")
    };

    let mut raw = std::mem::MaybeUninit::<sys::GDExtensionGodotVersion>::zeroed();
    get_godot_version(raw.as_mut_ptr());

    RuntimeVersion::from_sys(&raw.assume_init())
}

/// Panics if the engine is older than `min_version`.
pub fn ensure_runtime_compatibility(runtime: &RuntimeVersion, min_version: (u32, u32, u32)) {
    // Lexicographical tuple comparison.
    if runtime.triple() < min_version {
        let (major, minor, patch) = min_version;

        panic!(
            "extension requires at least engine version {major}.{minor}.{patch}\n\
            but was loaded by an older engine binary, with version: {}\n\
            \n\
            Update your engine version.\n",
            runtime.string
        );
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    fn version(major: u32, minor: u32, patch: u32) -> RuntimeVersion {
        RuntimeVersion {
            major,
            minor,
            patch,
            string: format!("{major}.{minor}.{patch}.test"),
        }
    }

    #[test]
    fn compatible_versions_pass() {
        ensure_runtime_compatibility(&version(4, 2, 0), MIN_RUNTIME_VERSION);
        ensure_runtime_compatibility(&version(4, 3, 1), MIN_RUNTIME_VERSION);
        ensure_runtime_compatibility(&version(5, 0, 0), MIN_RUNTIME_VERSION);
    }

    #[test]
    #[should_panic(expected = "requires at least engine version 4.2.0")]
    fn older_version_panics() {
        ensure_runtime_compatibility(&version(4, 1, 3), MIN_RUNTIME_VERSION);
    }

    #[test]
    fn version_string_fallback() {
        let raw = sys::GDExtensionGodotVersion {
            major: 4,
            minor: 3,
            patch: 2,
            string: std::ptr::null(),
        };

        let parsed = unsafe { RuntimeVersion::from_sys(&raw) };
        assert_eq!(parsed.string, "4.3.2");
        assert_eq!(parsed.triple(), (4, 3, 2));
    }
}
