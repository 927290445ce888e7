/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! In-process engine stand-in for integration tests.
//!
//! Implements the subset of the GDExtension interface used by `gdbridge`, backed by a small object world with the
//! classes `Object`, `RefCounted`, `Resource`, `ConfigFile`, `Node`, `Node2D` and the `ClassDB` singleton, plus the
//! `Array` and `Dictionary` containers. Reference counting follows the engine's rules, so tests can observe leaks and
//! double frees through the inspection functions below.

mod containers;
mod interface;
mod log;
mod methods;
mod strings;
mod variant;
mod world;

use std::sync::atomic::{AtomicUsize, Ordering};

use gdbridge_ffi as sys;

pub use containers::live_containers;
pub use interface::{get_proc_address, set_reported_version};
pub use log::{contains as log_contains, entries as log_entries, LogEntry, LogLevel};
pub use strings::live_strings;

pub(crate) static METHOD_BIND_LOOKUPS: AtomicUsize = AtomicUsize::new(0);

static LIBRARY_TOKEN: u8 = 0;

/// Library pointer to pass to the extension entry point.
pub fn library() -> sys::GDExtensionClassLibraryPtr {
    &LIBRARY_TOKEN as *const u8 as sys::GDExtensionClassLibraryPtr
}

/// Current reference count of a RefCounted object, or `None` if the object is dead or not RefCounted.
pub fn reference_count(instance_id: u64) -> Option<i64> {
    let world = world::world();
    world
        .objects
        .get(&instance_id)
        .filter(|obj| obj.class.ref_counted)
        .map(|obj| obj.refcount)
}

pub fn is_alive(instance_id: u64) -> bool {
    world::world().objects.contains_key(&instance_id)
}

/// Number of objects not yet destroyed, singletons included.
pub fn live_objects() -> usize {
    world::world().objects.len()
}

pub fn object_class(instance_id: u64) -> Option<&'static str> {
    world::world().objects.get(&instance_id).map(|obj| obj.class.name)
}

/// How often the extension asked for a method-bind through `classdb_get_method_bind`.
pub fn method_bind_lookups() -> usize {
    METHOD_BIND_LOOKUPS.load(Ordering::SeqCst)
}

/// How often the extension asked for a builtin method through `variant_get_ptr_builtin_method`.
pub fn builtin_method_lookups() -> usize {
    containers::BUILTIN_METHOD_LOOKUPS.load(Ordering::SeqCst)
}

/// Registers a virtual file that `ConfigFile.load()` can read.
pub fn write_file(path: &str, contents: &str) {
    world::world()
        .files
        .insert(path.to_string(), contents.to_string());
}
