/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{
    BuiltinLifecycleTable, BuiltinMethodTable, GDExtensionClassLibraryPtr, GDExtensionInterface, MethodTable,
    RuntimeVersion, StringCache,
};

#[cfg(feature = "experimental-threads")]
mod multi_threaded;
#[cfg(not(feature = "experimental-threads"))]
mod single_threaded;

#[cfg(feature = "experimental-threads")]
use multi_threaded::BindingStorage;
#[cfg(not(feature = "experimental-threads"))]
use single_threaded::BindingStorage;

/// Everything that lives from extension load until Core-level deinit.
pub struct GodotBinding {
    pub(crate) interface: GDExtensionInterface,
    library: ClassLibraryPtr,
    pub(crate) lifecycle: BuiltinLifecycleTable,
    pub(crate) method_table: MethodTable,
    pub(crate) builtin_method_table: BuiltinMethodTable,
    string_cache: Mutex<StringCache>,
    pub(crate) runtime_version: RuntimeVersion,
    pub(crate) config: GdextConfig,
    #[cfg_attr(feature = "experimental-threads", allow(dead_code))]
    pub(super) main_thread: std::thread::ThreadId,
}

impl GodotBinding {
    pub fn new(
        interface: GDExtensionInterface,
        library: GDExtensionClassLibraryPtr,
        lifecycle: BuiltinLifecycleTable,
        string_cache: StringCache,
        runtime_version: RuntimeVersion,
        config: GdextConfig,
    ) -> Self {
        Self {
            interface,
            library: ClassLibraryPtr(library),
            lifecycle,
            method_table: MethodTable::new(),
            builtin_method_table: BuiltinMethodTable::new(),
            string_cache: Mutex::new(string_cache),
            runtime_version,
            config,
            main_thread: std::thread::current().id(),
        }
    }

    pub(crate) fn string_cache(&self) -> MutexGuard<'_, StringCache> {
        self.string_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Settings that the entry point passes down to the binding.
#[derive(Clone, Debug)]
pub struct GdextConfig {
    /// Oldest engine version accepted at load time.
    pub min_runtime_version: (u32, u32, u32),
}

impl Default for GdextConfig {
    fn default() -> Self {
        Self {
            min_runtime_version: crate::MIN_RUNTIME_VERSION,
        }
    }
}

/// Newtype around `GDExtensionClassLibraryPtr` so the binding can be shared when threads are enabled.
struct ClassLibraryPtr(GDExtensionClassLibraryPtr);

// SAFETY: the library pointer is an opaque token that is only passed back to the engine, never dereferenced here.
unsafe impl Sync for ClassLibraryPtr {}
// SAFETY: see `Sync` impl.
unsafe impl Send for ClassLibraryPtr {}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Storage shared by both threading modes

static BINDING: AtomicPtr<GodotBinding> = AtomicPtr::new(ptr::null_mut());

/// Publishes `binding`. Returns `None` if a binding is already present.
fn store(binding: GodotBinding) -> Option<()> {
    let boxed = Box::into_raw(Box::new(binding));

    match BINDING.compare_exchange(ptr::null_mut(), boxed, Ordering::AcqRel, Ordering::Acquire) {
        Ok(_) => Some(()),
        Err(_) => {
            // SAFETY: `boxed` was never published.
            drop(unsafe { Box::from_raw(boxed) });
            None
        }
    }
}

/// Removes the binding, handing ownership back to the caller.
fn take() -> Option<Box<GodotBinding>> {
    let raw = BINDING.swap(ptr::null_mut(), Ordering::AcqRel);

    // SAFETY: only `store()` publishes pointers, each originating from `Box::into_raw`.
    crate::ptr_then(raw, |raw| unsafe { Box::from_raw(raw) })
}

fn load() -> *mut GodotBinding {
    BINDING.load(Ordering::Acquire)
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Public API

/// # Safety
///
/// Must be called once during extension load, before any other function of this module.
pub unsafe fn initialize_binding(binding: GodotBinding) {
    BindingStorage::initialize(binding).expect("binding is already initialized");
}

/// Drops the binding, destroying cached string names.
///
/// Any further engine access before the next [`initialize_binding`] panics (debug) or is UB (release).
///
/// # Safety
/// No references obtained through the getters below may be used afterwards.
pub unsafe fn deinitialize_binding() {
    if let Some(binding) = BindingStorage::deinitialize() {
        drop(binding);
    }
}

pub fn is_initialized() -> bool {
    BindingStorage::is_initialized()
}

/// # Safety
///
/// The binding must have been initialized before calling this function.
///
/// If "experimental-threads" is not enabled, then this must be called from the same thread that the binding was initialized from.
#[inline(always)]
pub unsafe fn get_binding() -> &'static GodotBinding {
    BindingStorage::get_binding_unchecked()
}

/// # Safety
///
/// See [`get_binding`].
#[inline(always)]
pub unsafe fn get_interface() -> &'static GDExtensionInterface {
    &get_binding().interface
}

/// # Safety
///
/// See [`get_binding`].
#[inline(always)]
pub unsafe fn get_library() -> GDExtensionClassLibraryPtr {
    get_binding().library.0
}

/// # Safety
///
/// See [`get_binding`].
#[inline(always)]
pub unsafe fn builtin_lifecycle_api() -> &'static BuiltinLifecycleTable {
    &get_binding().lifecycle
}

/// # Safety
///
/// See [`get_binding`].
#[inline(always)]
pub unsafe fn method_table() -> &'static MethodTable {
    &get_binding().method_table
}

/// # Safety
///
/// See [`get_binding`].
#[inline(always)]
pub unsafe fn builtin_method_table() -> &'static BuiltinMethodTable {
    &get_binding().builtin_method_table
}

/// # Safety
///
/// See [`get_binding`].
pub unsafe fn runtime_version() -> &'static RuntimeVersion {
    &get_binding().runtime_version
}

/// # Safety
///
/// See [`get_binding`].
pub unsafe fn config() -> &'static GdextConfig {
    &get_binding().config
}

/// Engine `StringName` for `name`, valid until Core-level deinit.
///
/// # Safety
///
/// See [`get_binding`].
pub unsafe fn cached_string_name(name: &'static str) -> crate::GDExtensionConstStringNamePtr {
    get_binding().string_cache().fetch(name)
}

/// Destroys all cached string names.
///
/// # Safety
///
/// See [`get_binding`]. No pointer returned by [`cached_string_name`] may be used afterwards.
pub unsafe fn clear_string_cache() {
    get_binding().string_cache().clear();
}
