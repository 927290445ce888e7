/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Low level bindings to the engine's GDExtension C interface.
//!
//! Provides the raw ABI declarations, the process-wide binding (interface table, builtin lifecycle functions,
//! method-bind and builtin method tables) and the [`CallFrame`] used to invoke both.

#![cfg_attr(test, allow(unused))]

mod binding;
mod builtin_method_table;
mod call_frame;
mod gdextension_interface;
mod global;
mod godot_ffi;
mod init_level;
mod interface;
mod interface_init;
mod lifecycle;
mod method_table;
mod opaque;
mod string_cache;
mod toolbox;
mod variant_type;

pub use binding::*;
pub use builtin_method_table::{
    BuiltinMethodBind, BuiltinMethodError, BuiltinMethodKey, BuiltinMethodTable,
};
pub use call_frame::{CallFrame, FRAME_SLOT_SIZE, MAX_FRAME_ARGS};
pub use gdextension_interface::*;
pub use global::{Global, GlobalGuard};
pub use godot_ffi::GodotFfi;
pub use init_level::InitLevel;
pub use interface::{missing_interface_fn, GDExtensionInterface};
pub use interface_init::{
    ensure_runtime_compatibility, read_runtime_version, RuntimeVersion, MIN_RUNTIME_VERSION,
};
pub use lifecycle::BuiltinLifecycleTable;
pub use method_table::{
    ClassMethodBind, MethodBindError, MethodKey, MethodTable, MethodTableStats,
};
pub use opaque::{
    Opaque, OpaqueArray, OpaqueDictionary, OpaqueString, OpaqueStringName, OpaqueVariant,
};
pub use string_cache::StringCache;
pub use toolbox::*;
pub use variant_type::VariantType;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Startup and shutdown

/// Loads the interface and publishes the global binding.
///
/// # Safety
///
/// - `get_proc_address` and `library` must be the values passed to the extension entry point.
/// - Must not be called again before [`deinitialize`].
pub unsafe fn initialize(
    get_proc_address: GDExtensionInterfaceGetProcAddress,
    library: GDExtensionClassLibraryPtr,
    config: GdextConfig,
) {
    out!("Initialize gdbridge-ffi...");

    let runtime_version = read_runtime_version(get_proc_address);
    ensure_runtime_compatibility(&runtime_version, config.min_runtime_version);
    out!("Engine version: {}", runtime_version.string);

    let interface = GDExtensionInterface::load(get_proc_address);
    let missing = interface.missing_functions();
    if !missing.is_empty() {
        // Not fatal; only calls to these functions will panic.
        out!("Interface functions not provided by engine: {missing:?}");
    }

    let lifecycle = BuiltinLifecycleTable::load(&interface);
    let string_name_new = interface
        .string_name_new_with_utf8_chars_and_len
        .unwrap_or_else(|| missing_interface_fn("string_name_new_with_utf8_chars_and_len"));
    let string_cache = StringCache::new(string_name_new, lifecycle.string_name_destroy);

    initialize_binding(GodotBinding::new(
        interface,
        library,
        lifecycle,
        string_cache,
        runtime_version,
        config,
    ));

    out!("gdbridge-ffi initialized.");
}

/// Forgets all method-binds and drops the global binding.
///
/// # Safety
///
/// No engine handle may be used afterwards, until the next [`initialize`].
pub unsafe fn deinitialize() {
    if !is_initialized() {
        return;
    }

    method_table().clear();
    builtin_method_table().clear();
    clear_string_cache();
    deinitialize_binding();

    out!("gdbridge-ffi deinitialized.");
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Method-binds

/// Cached method-bind for `key`, resolving it through ClassDB on first use.
pub fn try_method_bind(key: &MethodKey) -> Result<ClassMethodBind, MethodBindError> {
    // SAFETY: callers only reach this with an initialized binding; `get_binding()` asserts in debug builds.
    let table = unsafe { method_table() };
    table.get_or_resolve(key, |key| unsafe { resolve_method_bind(key) })
}

/// Like [`try_method_bind`], but panics with an explanatory message.
#[track_caller]
pub fn method_bind(key: &MethodKey) -> ClassMethodBind {
    match try_method_bind(key) {
        Ok(bind) => bind,
        Err(err) => panic!("{err}"),
    }
}

/// Resolves all `keys` up front. Returns the ones the engine does not provide.
pub fn preload_method_binds(keys: &[MethodKey]) -> Vec<MethodBindError> {
    // SAFETY: see `try_method_bind()`.
    let table = unsafe { method_table() };
    table.preload(keys, |key| unsafe { resolve_method_bind(key) })
}

unsafe fn resolve_method_bind(key: &MethodKey) -> GDExtensionMethodBindPtr {
    let class_name = cached_string_name(key.class_name);
    let method_name = cached_string_name(key.method_name);

    interface_fn!(classdb_get_method_bind)(class_name, method_name, key.hash)
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Builtin methods

/// Cached builtin method for `key`, resolving it through the engine on first use.
pub fn try_builtin_method(key: &BuiltinMethodKey) -> Result<BuiltinMethodBind, BuiltinMethodError> {
    // SAFETY: see `try_method_bind()`.
    let table = unsafe { builtin_method_table() };
    table.get_or_resolve(key, |key| unsafe {
        let method_name = cached_string_name(key.method_name);
        interface_fn!(variant_get_ptr_builtin_method)(key.variant_type.sys(), method_name, key.hash)
    })
}

/// Like [`try_builtin_method`], but panics with an explanatory message.
#[track_caller]
pub fn builtin_method(key: &BuiltinMethodKey) -> BuiltinMethodBind {
    match try_builtin_method(key) {
        Ok(method) => method,
        Err(err) => panic!("{err}"),
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Call errors

#[doc(hidden)]
#[inline]
pub fn default_call_error() -> GDExtensionCallError {
    GDExtensionCallError {
        error: GDEXTENSION_CALL_OK,
        argument: -1,
        expected: -1,
    }
}
