/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Meta-information and marshaling for out-calls into the engine.

mod as_arg;
mod signature;

pub mod error;

pub use as_arg::{AsArg, FromPtrcall};
pub use signature::Signature;

use std::fmt;

/// Information about the function being called, used in error messages.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CallContext<'a> {
    pub(crate) class_name: &'a str,
    pub(crate) function_name: &'a str,
}

impl<'a> CallContext<'a> {
    /// Call from Rust into a method of an engine class.
    pub const fn outbound(class_name: &'a str, function_name: &'a str) -> Self {
        Self {
            class_name,
            function_name,
        }
    }

    pub fn class_name(&self) -> &str {
        self.class_name
    }

    pub fn function_name(&self) -> &str {
        self.function_name
    }
}

impl fmt::Display for CallContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.class_name, self.function_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_context_display() {
        let ctx = CallContext::outbound("Node", "add_child");
        assert_eq!(ctx.to_string(), "Node::add_child");
        assert_eq!(ctx.class_name(), "Node");
        assert_eq!(ctx.function_name(), "add_child");
    }
}
