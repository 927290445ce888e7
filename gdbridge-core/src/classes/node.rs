/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::builtin::StringName;
use crate::classes::Object;
use crate::meta::{AsArg, FromPtrcall};
use crate::obj::{engine_class, Gd};
use crate::sys::CallFrame;

engine_class! {
    /// Element of the scene tree. Manually managed: a node lives until it is freed, usually together with its parent.
    pub struct Node {
        inherits: Object;
        kind: Instantiable;
    }

    methods {
        /// Adds `node` as the last child.
        ///
        /// Takes the handle by value: from now on the parent owns the child, and the handle is released when the call
        /// returns. Look the child up again through [`get_child()`][Self::get_child] to keep using it.
        fn add_child(&mut self, node: Gd<Node>, force_readable_name: bool, internal: InternalMode) = 3863233950;

        fn get_child_count(&self, include_internal: bool) -> i32 = 894402480;

        /// Child at `index`. Negative indices count from the end. Out-of-bounds indices return `None`.
        fn get_child(&self, index: i32, include_internal: bool) -> Option<Gd<Node>> = 541253412;

        fn get_parent(&self) -> Option<Gd<Node>> = 3160264692;

        fn set_name(&mut self, name: &StringName) = 3304788590;

        fn get_name(&self) -> StringName = 2002593661;
    }
}

/// Where [`Node::add_child()`] places a child among its siblings.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[repr(i32)]
pub enum InternalMode {
    /// Regular child.
    #[default]
    Disabled = 0,

    /// Internal child, placed before all regular children.
    Front = 1,

    /// Internal child, placed after all regular children.
    Back = 2,
}

impl InternalMode {
    pub fn ord(self) -> i32 {
        self as i32
    }

    pub fn try_from_ord(ord: i32) -> Option<Self> {
        match ord {
            0 => Some(Self::Disabled),
            1 => Some(Self::Front),
            2 => Some(Self::Back),
            _ => None,
        }
    }
}

impl AsArg for InternalMode {
    fn push_arg(&self, frame: &mut CallFrame) {
        frame.push_raw(i64::from(self.ord()));
    }
}

impl FromPtrcall for InternalMode {
    type Raw = i64;

    fn null_raw() -> i64 {
        0
    }

    unsafe fn from_ptrcall(raw: i64) -> Self {
        i32::try_from(raw)
            .ok()
            .and_then(Self::try_from_ord)
            .unwrap_or_default()
    }
}
