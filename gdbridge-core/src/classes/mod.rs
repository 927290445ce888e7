/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Engine classes, declared with the `engine_class!` wrapper pattern.
//!
//! Each module declares one class and exposes the static keys of its method-binds in `method_keys`.

pub mod class_db;
pub mod config_file;
pub mod node;
pub mod node_2d;
pub mod object;
pub mod ref_counted;
pub mod resource;

pub use class_db::ClassDb;
pub use config_file::ConfigFile;
pub use node::Node;
pub use node_2d::Node2D;
pub use object::Object;
pub use ref_counted::RefCounted;
pub use resource::Resource;

use crate::sys::MethodKey;

/// Every method-bind key compiled into this crate, in class order.
///
/// Used to validate against an API manifest and to preload binds at startup.
pub fn compiled_method_keys() -> Vec<MethodKey> {
    let per_class: [&[MethodKey]; 7] = [
        object::method_keys::METHOD_KEYS,
        ref_counted::method_keys::METHOD_KEYS,
        resource::method_keys::METHOD_KEYS,
        node::method_keys::METHOD_KEYS,
        node_2d::method_keys::METHOD_KEYS,
        config_file::method_keys::METHOD_KEYS,
        class_db::method_keys::METHOD_KEYS,
    ];

    let mut keys: Vec<MethodKey> = per_class.concat();
    keys.insert(object::method_keys::METHOD_KEYS.len(), object::CALL);
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiled_keys_are_unique() {
        let keys = compiled_method_keys();
        assert_eq!(keys.len(), 32);

        for (i, key) in keys.iter().enumerate() {
            let duplicate = keys[i + 1..]
                .iter()
                .any(|other| other.class_name == key.class_name && other.method_name == key.method_name);
            assert!(!duplicate, "{key} declared twice");
        }
    }

    #[test]
    fn keys_carry_engine_names() {
        assert_eq!(class_db::method_keys::class_exists.class_name, "ClassDB");
        assert_eq!(node_2d::method_keys::rotate.class_name, "Node2D");
        assert_eq!(object::CALL.hash, 3400424181);
        assert_eq!(ref_counted::method_keys::init_ref.method_name, "init_ref");
    }
}
