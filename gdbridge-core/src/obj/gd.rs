/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};

use crate::builtin::{GString, StringName};
use crate::classes::Object;
use crate::obj::raw::{self, ObjectHandle, RawObject};
use crate::obj::{GodotClass, Inherits, Instantiable, InstanceId};
use crate::ownership::Pointer;
use crate::sys;
use sys::interface_fn;

// ----------------------------------------------------------------------------------------------------------------------------------------------
// ClassHandle

/// Registry handle stored inside every engine class struct.
///
/// All class structs and [`Gd`] are `repr(transparent)` over this type, which lets `Gd<T>` dereference to `T`, and `T`
/// to its base class.
#[repr(transparent)]
pub(crate) struct ClassHandle {
    pointer: Pointer<ObjectHandle>,
}

impl ClassHandle {
    fn new(pointer: Pointer<ObjectHandle>) -> Self {
        Self { pointer }
    }

    /// Raw object as registered.
    ///
    /// # Panics
    /// If the handle was released or swept.
    #[track_caller]
    pub(crate) fn raw(&self) -> RawObject {
        self.pointer.get()
    }

    /// Object pointer for an engine call on `class_name`.
    ///
    /// # Panics
    /// If the handle is stale. In debug builds, also if the engine destroyed the object in the meantime.
    #[track_caller]
    pub(crate) fn checked_obj_sys(&self, class_name: &str) -> sys::GDExtensionObjectPtr {
        let raw = self.raw();

        if cfg!(debug_assertions) && !raw.is_alive() {
            panic!("{class_name} instance {} was freed", raw.id);
        }

        raw.ptr
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Gd

/// Smart pointer to an engine object of class `T`.
///
/// # Memory management
///
/// - For **RefCounted** classes, each `Gd` holds one reference. Cloning takes another one, dropping gives it back, and
///   the object is destroyed together with the last reference (on either side of the boundary).
/// - For **manually managed** classes like `Node`, a `Gd` only observes the object. It is destroyed through
///   [`free()`][Self::free], or by whoever owns it in the engine, for example a parent node.
///
/// Every `Gd` is tracked by the [handle registry](crate::ownership), so handles still held when the extension unloads
/// are released deterministically.
///
/// # Dereferencing
///
/// `Gd<T>` dereferences to `T`, which exposes the engine methods of `T`. Class structs in turn dereference to their base
/// class, so `Gd<Node2D>` offers the methods of `Node2D`, `Node` and `Object`.
#[repr(transparent)]
pub struct Gd<T: GodotClass> {
    handle: ClassHandle,
    _marker: PhantomData<*const T>,
}

impl<T: GodotClass> Gd<T> {
    /// Constructs a new object of class `T` through ClassDB.
    ///
    /// RefCounted objects start with one reference, held by the returned `Gd`. Manually managed objects must be
    /// [freed][Self::free] or handed over to the engine.
    ///
    /// # Panics
    /// If the engine cannot construct the class.
    pub fn new() -> Self
    where
        T: Instantiable,
    {
        // SAFETY: the cached name stays valid during the call.
        let ptr = unsafe { interface_fn!(classdb_construct_object)(sys::cached_string_name(T::CLASS_NAME)) };

        // SAFETY: `ptr` is null or a freshly constructed object of class `T`.
        unsafe { Self::from_new_object(ptr) }
            .unwrap_or_else(|| panic!("failed to construct object of class {}", T::CLASS_NAME))
    }

    /// Looks up the given instance ID and returns the associated object, if possible.
    ///
    /// If no such instance ID is registered, or if the dynamic type of the object behind that instance ID is not
    /// compatible with `T`, then `None` is returned. On success, a RefCounted object gains a reference.
    pub fn try_from_instance_id(instance_id: InstanceId) -> Option<Self> {
        // SAFETY: lookup by ID is valid for any ID.
        let ptr = unsafe { interface_fn!(object_get_instance_from_id)(instance_id.to_u64()) };

        // SAFETY: `ptr` is null or a live object.
        let object = unsafe { Gd::<Object>::from_obj_sys_retain(ptr)? };
        object.owned_cast::<T>().ok()
    }

    /// ⚠️ Looks up the given instance ID and returns the associated object.
    ///
    /// # Panics
    /// If no such instance ID is registered, or if the dynamic type of the object behind that instance ID
    /// is not compatible with `T`.
    #[track_caller]
    pub fn from_instance_id(instance_id: InstanceId) -> Self {
        Self::try_from_instance_id(instance_id).unwrap_or_else(|| {
            panic!(
                "Instance ID {} does not belong to a valid object of class '{}'",
                instance_id,
                T::CLASS_NAME
            )
        })
    }

    /// Instance ID of the object, as known when the handle was created.
    ///
    /// # Panics
    /// If the handle was swept at shutdown.
    pub fn instance_id(&self) -> InstanceId {
        self.handle.raw().id
    }

    /// Checks if this smart pointer points to a live object.
    ///
    /// Accessing a dead object panics in a defined manner, so this is rarely needed outside of diagnostics.
    pub fn is_instance_valid(&self) -> bool {
        self.handle
            .pointer
            .try_get()
            .is_some_and(RawObject::is_alive)
    }

    /// Excludes this handle from the shutdown sweep.
    ///
    /// A pinned RefCounted object keeps its reference when the library unloads, so the object survives a reload and
    /// the `Gd` stays usable once the library is initialized again. Returns `false` if the handle was already swept.
    pub fn pin(&self) -> bool {
        self.handle.pointer.pin()
    }

    /// **Upcast:** convert into a smart pointer to a base class. Always succeeds.
    pub fn upcast<Base>(self) -> Gd<Base>
    where
        Base: GodotClass,
        T: Inherits<Base>,
    {
        self.reinterpret()
    }

    /// **Downcast:** try to convert into a smart pointer to a derived class.
    ///
    /// If `T`'s dynamic type is not `Derived` or one of its subclasses, the original pointer is returned in `Err`.
    pub fn try_cast<Derived>(self) -> Result<Gd<Derived>, Self>
    where
        Derived: GodotClass + Inherits<T>,
    {
        self.owned_cast()
    }

    /// ⚠️ **Downcast:** convert into a smart pointer to a derived class. Panics on error.
    ///
    /// # Panics
    /// If the class' dynamic type is not `Derived` or one of its subclasses.
    #[track_caller]
    pub fn cast<Derived>(self) -> Gd<Derived>
    where
        Derived: GodotClass + Inherits<T>,
    {
        self.owned_cast().unwrap_or_else(|from_obj| {
            panic!(
                "downcast from {from} to {to} failed; instance {from_obj:?}",
                from = T::CLASS_NAME,
                to = Derived::CLASS_NAME,
            )
        })
    }

    /// Destroy the manually-managed engine object.
    ///
    /// Consumes this smart pointer. Other `Gd` pointers to the same object become invalid; using them panics.
    ///
    /// # Panics
    /// - When the object is RefCounted (possible through `Gd<Object>`).
    /// - When the object has already been destroyed.
    #[track_caller]
    pub fn free(self) {
        let raw = self.handle.raw();

        assert!(
            !raw.id.is_ref_counted(),
            "called free() on {self:?}, which points to a RefCounted dynamic type; \
            free() is only supported for manually managed types"
        );
        assert!(raw.is_alive(), "called free() on already destroyed object {self:?}");

        let this = ManuallyDrop::new(self);
        this.handle.pointer.end();

        // SAFETY: alive as checked above, and not RefCounted.
        unsafe { interface_fn!(object_destroy)(raw.ptr) };
    }

    /// Name of the object's dynamic class, as reported by the engine.
    pub fn dynamic_class_string(&self) -> GString {
        let ptr = self.obj_sys();
        let mut known = false;

        // SAFETY: the engine writes a new name into the uninitialized slot, and reports whether it did.
        let name = unsafe {
            StringName::new_with_uninit(|dst| {
                known = interface_fn!(object_get_class_name)(ptr, sys::get_library(), dst) != 0;
            })
        };

        if known {
            GString::from(&name)
        } else {
            GString::from(T::CLASS_NAME)
        }
    }

    #[doc(hidden)]
    #[track_caller]
    pub fn obj_sys(&self) -> sys::GDExtensionObjectPtr {
        self.handle.checked_obj_sys(T::CLASS_NAME)
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // Construction from engine pointers

    /// Adopts an object pointer returned by the engine. RefCounted objects keep the reference count unchanged.
    ///
    /// # Safety
    /// `ptr` must be null or point to a live object of class `T` (or derived). For RefCounted objects, the caller must
    /// hand over one reference.
    #[doc(hidden)]
    pub unsafe fn from_obj_sys(ptr: sys::GDExtensionObjectPtr) -> Option<Self> {
        if ptr.is_null() {
            return None;
        }

        let id = raw::instance_id_of(ptr)?;
        let raw = RawObject { ptr, id };

        let pointer = if id.is_ref_counted() {
            Pointer::new(raw)
        } else {
            Pointer::borrowed(raw)
        };

        sys::out!("adopt {} instance {id}", T::CLASS_NAME);
        Some(Self::from_handle(ClassHandle::new(pointer)))
    }

    /// Like [`from_obj_sys()`][Self::from_obj_sys], but takes a new reference on RefCounted objects.
    ///
    /// # Safety
    /// `ptr` must be null or point to a live object of class `T` (or derived).
    pub(crate) unsafe fn from_obj_sys_retain(ptr: sys::GDExtensionObjectPtr) -> Option<Self> {
        if ptr.is_null() {
            return None;
        }

        if raw::instance_id_of(ptr)?.is_ref_counted() {
            raw::reference(ptr);
        }
        Self::from_obj_sys(ptr)
    }

    /// # Safety
    /// `ptr` must be null or a freshly constructed object.
    unsafe fn from_new_object(ptr: sys::GDExtensionObjectPtr) -> Option<Self> {
        if ptr.is_null() {
            return None;
        }

        if raw::instance_id_of(ptr)?.is_ref_counted() {
            raw::init_ref(ptr);
        }
        Self::from_obj_sys(ptr)
    }

    /// Engine-owned singleton, registered as borrowed.
    pub(crate) fn singleton_by_name(name: &'static str) -> Self {
        // SAFETY: the cached name stays valid during the call.
        let ptr = unsafe { interface_fn!(global_get_singleton)(sys::cached_string_name(name)) };
        assert!(!ptr.is_null(), "singleton {name} is not available");

        // SAFETY: `ptr` is a live object that the engine keeps alive.
        let id = unsafe { raw::instance_id_of(ptr) }
            .unwrap_or_else(|| panic!("singleton {name} has no instance ID"));

        let pointer = Pointer::borrowed(RawObject { ptr, id });
        Self::from_handle(ClassHandle::new(pointer))
    }

    fn from_handle(handle: ClassHandle) -> Self {
        Self {
            handle,
            _marker: PhantomData,
        }
    }

    // ------------------------------------------------------------------------------------------------------------------------------------------
    // Casts

    /// Same object, different static type. Moves the registry slot over.
    fn reinterpret<U: GodotClass>(self) -> Gd<U> {
        let this = ManuallyDrop::new(self);
        Gd::from_handle(ClassHandle::new(this.handle.pointer))
    }

    /// Checked cast to any class. Returns `self` unchanged on failure.
    pub(crate) fn owned_cast<U: GodotClass>(self) -> Result<Gd<U>, Self> {
        if T::inherits::<U>() {
            return Ok(self.reinterpret());
        }

        let ptr = self.obj_sys();

        // SAFETY: `ptr` is alive; the class tag is only compared, never dereferenced.
        let cast = unsafe {
            let class_tag = interface_fn!(classdb_get_class_tag)(sys::cached_string_name(U::CLASS_NAME));
            interface_fn!(object_cast_to)(ptr, class_tag)
        };

        if cast.is_null() {
            Err(self)
        } else {
            Ok(self.reinterpret())
        }
    }
}

impl Gd<Object> {
    /// Constructs an object of a class known only at runtime.
    ///
    /// Returns `None` if the class does not exist or cannot be instantiated.
    pub fn new_by_class_name(class_name: &str) -> Option<Self> {
        let class_name = StringName::from(class_name);
        let opaque = class_name.opaque();

        // SAFETY: `class_name` outlives the call.
        let ptr = unsafe { interface_fn!(classdb_construct_object)(opaque.as_ptr()) };

        // SAFETY: `ptr` is null or a freshly constructed object.
        unsafe { Self::from_new_object(ptr) }
    }
}

impl<T: GodotClass> Deref for Gd<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: `Gd<T>` and `T` are both `repr(transparent)` over `ClassHandle`.
        unsafe { &*(self as *const Self as *const T) }
    }
}

impl<T: GodotClass> DerefMut for Gd<T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: see `Deref`.
        unsafe { &mut *(self as *mut Self as *mut T) }
    }
}

impl<T: GodotClass> Clone for Gd<T> {
    fn clone(&self) -> Self {
        let raw = self.handle.raw();

        let pointer = if raw.id.is_ref_counted() {
            // SAFETY: checked alive through `obj_sys()`.
            unsafe { raw::reference(self.obj_sys()) };
            Pointer::new(raw)
        } else {
            Pointer::borrowed(raw)
        };

        Self::from_handle(ClassHandle::new(pointer))
    }
}

impl<T: GodotClass> Drop for Gd<T> {
    fn drop(&mut self) {
        self.handle.pointer.release();
    }
}

impl<T: GodotClass> PartialEq for Gd<T> {
    /// ⚠️ Returns whether two `Gd` pointers point to the same object.
    fn eq(&self, other: &Self) -> bool {
        let id = |gd: &Self| gd.handle.pointer.try_get().map(|raw| raw.id);
        id(self).is_some() && id(self) == id(other)
    }
}

impl<T: GodotClass> Eq for Gd<T> {}

impl<T: GodotClass> fmt::Debug for Gd<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.handle.pointer.try_get() {
            Some(raw) => write!(f, "Gd {{ id: {}, class: {} }}", raw.id, T::CLASS_NAME),
            None => write!(f, "Gd {{ <released>, class: {} }}", T::CLASS_NAME),
        }
    }
}
