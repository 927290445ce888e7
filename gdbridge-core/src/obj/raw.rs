/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Object pointers as stored in the handle registry, and the reference-counting calls on them.

use crate::classes::ref_counted::method_keys;
use crate::meta::Signature;
use crate::obj::InstanceId;
use crate::ownership::Handle;
use crate::sys;

/// Object pointer together with the ID it had when Rust obtained it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RawObject {
    pub ptr: sys::GDExtensionObjectPtr,
    pub id: InstanceId,
}

impl RawObject {
    /// Whether the engine still knows the object under the same ID and address.
    pub fn is_alive(self) -> bool {
        // SAFETY: lookup by ID is valid for any ID, including freed ones.
        let current = unsafe { sys::interface_fn!(object_get_instance_from_id)(self.id.to_u64()) };
        current == self.ptr
    }
}

/// Registry kind for engine objects.
///
/// Only RefCounted objects are registered as owned. Releasing one gives up its reference, and destroys the object if
/// that was the last one.
pub enum ObjectHandle {}

// SAFETY: `release()` gives up exactly the reference Rust held.
unsafe impl Handle for ObjectHandle {
    type Raw = RawObject;
    const KIND: &'static str = "Object";

    unsafe fn release(raw: RawObject) {
        // Engine already unloaded; nothing left to release.
        if !sys::is_initialized() || !raw.id.is_ref_counted() {
            return;
        }

        if unreference(raw.ptr) {
            sys::interface_fn!(object_destroy)(raw.ptr);
        }
    }
}

/// # Safety
/// `ptr` must point to a live object.
pub(crate) unsafe fn instance_id_of(ptr: sys::GDExtensionConstObjectPtr) -> Option<InstanceId> {
    InstanceId::try_from_u64(sys::interface_fn!(object_get_instance_id)(ptr))
}

/// Completes construction of a RefCounted object; afterwards the caller holds exactly one reference.
///
/// # Safety
/// `ptr` must point to a live, freshly constructed RefCounted object.
pub(crate) unsafe fn init_ref(ptr: sys::GDExtensionObjectPtr) -> bool {
    Signature::out_class_ptrcall(&method_keys::init_ref, ptr, sys::CallFrame::new())
}

/// # Safety
/// `ptr` must point to a live RefCounted object.
pub(crate) unsafe fn reference(ptr: sys::GDExtensionObjectPtr) -> bool {
    Signature::out_class_ptrcall(&method_keys::reference, ptr, sys::CallFrame::new())
}

/// Returns `true` if the last reference was dropped and the caller must destroy the object.
///
/// # Safety
/// `ptr` must point to a live RefCounted object, on which the caller holds a reference.
pub(crate) unsafe fn unreference(ptr: sys::GDExtensionObjectPtr) -> bool {
    Signature::out_class_ptrcall(&method_keys::unreference, ptr, sys::CallFrame::new())
}
