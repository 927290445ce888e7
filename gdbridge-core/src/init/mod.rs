/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::registry::{ApiManifest, KeyMismatch};
use crate::{classes, godot_error, godot_warn, ownership, sys};

pub use sys::MIN_RUNTIME_VERSION;

#[doc(hidden)]
pub unsafe fn __load_library<E: ExtensionLibrary>(
    get_proc_address: sys::GDExtensionInterfaceGetProcAddress,
    library: sys::GDExtensionClassLibraryPtr,
    init: *mut sys::GDExtensionInitialization,
) -> sys::GDExtensionBool {
    let init_code = || {
        let config = sys::GdextConfig {
            min_runtime_version: E::min_runtime_version(),
        };

        // Panics if the engine is too old; the panic is reported below and loading fails.
        sys::initialize(get_proc_address, library, config);

        let init_params = sys::GDExtensionInitialization {
            minimum_initialization_level: E::min_level().to_sys(),
            userdata: std::ptr::null_mut(),
            initialize: Some(ffi_initialize_layer::<E>),
            deinitialize: Some(ffi_deinitialize_layer::<E>),
        };

        *init = init_params;
        1
    };

    let ctx = || "error when loading GDExtension library";
    let is_success = crate::private::handle_panic(ctx, init_code);

    is_success.unwrap_or(0)
}

unsafe extern "C" fn ffi_initialize_layer<E: ExtensionLibrary>(
    _userdata: *mut std::ffi::c_void,
    init_level: sys::GDExtensionInitializationLevel,
) {
    let level = InitLevel::from_sys(init_level);
    let ctx = || format!("failed to initialize GDExtension level `{level:?}`");

    // Swallow panics; the engine has no way to react to a failed level.
    let _ = crate::private::handle_panic(ctx, || {
        on_level_init::<E>(level);
        E::on_level_init(level);
    });
}

unsafe extern "C" fn ffi_deinitialize_layer<E: ExtensionLibrary>(
    _userdata: *mut std::ffi::c_void,
    init_level: sys::GDExtensionInitializationLevel,
) {
    let level = InitLevel::from_sys(init_level);
    let ctx = || format!("failed to deinitialize GDExtension level `{level:?}`");

    // User code and internal teardown are guarded separately: a panicking user hook must not prevent the sweep.
    let _ = crate::private::handle_panic(ctx, || E::on_level_deinit(level));
    let _ = crate::private::handle_panic(ctx, || on_level_deinit::<E>(level));
}

/// Internal tasks when a level is loaded. Runs before user code.
fn on_level_init<E: ExtensionLibrary>(level: InitLevel) {
    if level != InitLevel::Core {
        return;
    }

    let keys = classes::compiled_method_keys();

    if let Some(manifest) = E::api_manifest() {
        validate_manifest(&manifest, &keys);
    }

    if E::preload_method_binds() {
        let missing = sys::preload_method_binds(&keys);
        for err in &missing {
            godot_error!("{err}");
        }

        sys::out!(
            "Preloaded {} method-binds, {} missing.",
            keys.len() - missing.len(),
            missing.len()
        );
    }
}

/// Internal tasks when a level is unloaded. Runs after user code.
fn on_level_deinit<E: ExtensionLibrary>(level: InitLevel) {
    if level != InitLevel::Core {
        return;
    }

    match E::leak_policy() {
        LeakPolicy::Sweep => {
            let report = ownership::sweep();
            sys::out!("Shutdown sweep: {report}");
        }
        LeakPolicy::SweepAndWarn => {
            let report = ownership::sweep();
            if !report.is_empty() {
                godot_warn!("handles still alive at shutdown: {report}");
            }
        }
        LeakPolicy::Keep => {
            let forgotten = ownership::forget_all();
            sys::out!("Shutdown: forgot {forgotten} handles");
        }
    }

    // SAFETY: Core is the last level; all engine handles have been released or forgotten above.
    unsafe { sys::deinitialize() };
}

fn validate_manifest(manifest: &ApiManifest, keys: &[sys::MethodKey]) {
    // SAFETY: called during level init, after `sys::initialize()`.
    let runtime = unsafe { sys::runtime_version() };

    if !manifest.is_compatible_with(runtime) {
        let (major, minor, patch) = manifest.version();
        godot_error!(
            "engine {} is older than the API manifest ({major}.{minor}.{patch}); some method-binds may be missing",
            runtime.string
        );
    }

    for mismatch in manifest.check_keys(keys) {
        match mismatch {
            KeyMismatch::Hash { .. } => {
                godot_error!("{mismatch}");
            }
            KeyMismatch::UnknownClass(_) | KeyMismatch::UnknownMethod(_) => {
                godot_warn!("{mismatch}");
            }
        }
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Defines the entry point for a GDExtension Rust library.
///
/// Every library should have exactly one implementation of this trait, exported with [`gdextension_entry!`]. All
/// methods have defaults, so the simplest library is:
///
/// ```no_run
/// # use gdbridge_core::init::*;
/// struct MyExtension;
///
/// unsafe impl ExtensionLibrary for MyExtension {}
///
/// gdbridge_core::gdextension_entry!(MyExtension);
/// ```
///
/// # Safety
/// The library must not use engine handles from other threads after Core deinitialization has started.
///
/// [`gdextension_entry!`]: crate::gdextension_entry
pub unsafe trait ExtensionLibrary {
    /// Lowest level at which the engine should initialize this library.
    fn min_level() -> InitLevel {
        InitLevel::Scene
    }

    /// Custom logic when a certain init-level is loaded.
    ///
    /// Called for every level, in ascending order, after the library's own setup for that level.
    #[allow(unused_variables)]
    fn on_level_init(level: InitLevel) {
        // Nothing by default.
    }

    /// Custom logic when a certain init-level is unloaded.
    ///
    /// Called in descending order. At `Core`, this runs before remaining handles are swept.
    #[allow(unused_variables)]
    fn on_level_deinit(level: InitLevel) {
        // Nothing by default.
    }

    /// What happens with handles Rust still tracks when the library is unloaded.
    fn leak_policy() -> LeakPolicy {
        LeakPolicy::SweepAndWarn
    }

    /// API manifest (the engine's `extension_api.json`) to validate compiled-in method hashes against at Core level.
    ///
    /// Usually the JSON is embedded with `include_str!("extension_api.json")`:
    ///
    /// ```no_run
    /// # use gdbridge_core::registry::ApiManifest;
    /// const API_JSON: &str = r#"{
    ///     "header": { "version_major": 4, "version_minor": 3, "version_patch": 0 },
    ///     "classes": []
    /// }"#;
    ///
    /// fn api_manifest() -> Option<ApiManifest> {
    ///     ApiManifest::from_json(API_JSON).ok()
    /// }
    /// ```
    fn api_manifest() -> Option<ApiManifest> {
        None
    }

    /// Whether to resolve every compiled-in method-bind at Core level.
    ///
    /// Missing binds are then reported in one go at startup, rather than as a panic on first call.
    fn preload_method_binds() -> bool {
        false
    }

    /// Oldest engine version this library accepts. Loading fails on older engines.
    fn min_runtime_version() -> (u32, u32, u32) {
        MIN_RUNTIME_VERSION
    }
}

/// Stage of the engine's initialization process.
pub type InitLevel = sys::InitLevel;

/// Treatment of handles still registered when the library is unloaded.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum LeakPolicy {
    /// Release every owned handle, silently.
    Sweep,

    /// Release every owned handle, and warn through the engine log if there were any.
    #[default]
    SweepAndWarn,

    /// Forget all handles without engine calls. For hosts that tear down their objects on their own.
    Keep,
}

// ----------------------------------------------------------------------------------------------------------------------------------------------

/// Exports the C entry point of an extension library.
///
/// `gdextension_entry!(Ext)` exports `gdext_rust_init`, which is the name expected by default in `.gdextension` files.
/// A different symbol can be chosen with `gdextension_entry!(Ext, my_entry_symbol)`.
#[macro_export]
macro_rules! gdextension_entry {
    ($Ext:ty) => {
        $crate::gdextension_entry!($Ext, gdext_rust_init);
    };

    ($Ext:ty, $entry_point:ident) => {
        #[no_mangle]
        unsafe extern "C" fn $entry_point(
            get_proc_address: $crate::sys::GDExtensionInterfaceGetProcAddress,
            library: $crate::sys::GDExtensionClassLibraryPtr,
            init: *mut $crate::sys::GDExtensionInitialization,
        ) -> $crate::sys::GDExtensionBool {
            $crate::private::__load_library::<$Ext>(get_proc_address, library, init)
        }
    };
}
