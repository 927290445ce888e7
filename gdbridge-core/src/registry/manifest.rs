/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Subset of the engine's `extension_api.json`, used to validate compiled-in method keys at startup.

// Some fields are never read. Declaring them still checks that the input conforms to the expected shape.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use crate::sys::{MethodKey, RuntimeVersion};

// ----------------------------------------------------------------------------------------------------------------------------------------------
// JSON models

#[derive(Deserialize, Debug)]
struct JsonExtensionApi {
    header: JsonHeader,
    #[serde(default)]
    classes: Vec<JsonClass>,
    #[serde(default)]
    singletons: Vec<JsonSingleton>,
}

#[derive(Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct JsonHeader {
    pub version_major: u32,
    pub version_minor: u32,
    pub version_patch: u32,
    #[serde(default)]
    pub version_full_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct JsonClass {
    pub name: String,
    #[serde(default)]
    pub is_refcounted: bool,
    #[serde(default)]
    pub is_instantiable: bool,
    pub inherits: Option<String>,
    #[serde(default)]
    pub methods: Vec<JsonClassMethod>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct JsonClassMethod {
    pub name: String,
    #[serde(default)]
    pub is_vararg: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_virtual: bool,
    /// Absent for virtual methods, which have no bind.
    pub hash: Option<i64>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct JsonSingleton {
    pub name: String,
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Errors

/// The API manifest could not be loaded.
#[derive(Debug)]
pub enum ManifestError {
    /// Not valid JSON, or not shaped like `extension_api.json`.
    Parse(serde_json::Error),

    /// The same class appears twice.
    DuplicateClass(String),
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid API manifest: {err}"),
            Self::DuplicateClass(class) => write!(f, "invalid API manifest: class `{class}` declared twice"),
        }
    }
}

impl std::error::Error for ManifestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::DuplicateClass(_) => None,
        }
    }
}

impl From<serde_json::Error> for ManifestError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Manifest

/// Mismatch between a compiled-in method key and the manifest.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KeyMismatch {
    UnknownClass(MethodKey),
    UnknownMethod(MethodKey),
    /// The method exists, but under a different hash (usually a changed signature).
    Hash { key: MethodKey, manifest_hash: i64 },
}

impl fmt::Display for KeyMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownClass(key) => write!(f, "class {} not in API manifest (needed by {key})", key.class_name),
            Self::UnknownMethod(key) => write!(f, "method {key} not in API manifest"),
            Self::Hash { key, manifest_hash } => {
                write!(f, "method {key} has hash {manifest_hash} in API manifest")
            }
        }
    }
}

/// Queryable view of `extension_api.json`.
#[derive(Debug)]
pub struct ApiManifest {
    header: JsonHeader,
    classes: HashMap<String, JsonClass>,
    singletons: Vec<String>,
}

impl ApiManifest {
    /// Parses the JSON text of an `extension_api.json` file. Unknown fields are ignored.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        let api: JsonExtensionApi = serde_json::from_str(json)?;

        let mut classes = HashMap::with_capacity(api.classes.len());
        for class in api.classes {
            if classes.contains_key(&class.name) {
                return Err(ManifestError::DuplicateClass(class.name));
            }
            classes.insert(class.name.clone(), class);
        }

        Ok(Self {
            header: api.header,
            classes,
            singletons: api.singletons.into_iter().map(|s| s.name).collect(),
        })
    }

    pub fn header(&self) -> &JsonHeader {
        &self.header
    }

    /// `(major, minor, patch)` of the engine that produced the manifest.
    pub fn version(&self) -> (u32, u32, u32) {
        let h = &self.header;
        (h.version_major, h.version_minor, h.version_patch)
    }

    /// Whether `runtime` is at least the manifest's version.
    pub fn is_compatible_with(&self, runtime: &RuntimeVersion) -> bool {
        runtime.triple() >= self.version()
    }

    pub fn class(&self, class_name: &str) -> Option<&JsonClass> {
        self.classes.get(class_name)
    }

    pub fn singletons(&self) -> &[String] {
        &self.singletons
    }

    pub fn is_singleton(&self, class_name: &str) -> bool {
        self.singletons.iter().any(|s| s == class_name)
    }

    /// Methods declared directly on `class_name` (not inherited). Empty for unknown classes.
    pub fn methods(&self, class_name: &str) -> &[JsonClassMethod] {
        self.class(class_name).map_or(&[], |c| c.methods.as_slice())
    }

    /// Hash of `class_name::method_name`, looked up along the inheritance chain.
    pub fn method_hash(&self, class_name: &str, method_name: &str) -> Option<i64> {
        self.find_method(class_name, method_name).and_then(|m| m.hash)
    }

    /// `None` for unknown classes.
    pub fn is_refcounted(&self, class_name: &str) -> Option<bool> {
        self.class(class_name).map(|c| c.is_refcounted)
    }

    /// Whether `class_name` is `base_name` or derives from it. Unknown classes inherit from nothing.
    pub fn inherits(&self, class_name: &str, base_name: &str) -> bool {
        self.ancestry(class_name).any(|c| c.name == base_name)
    }

    /// Compares `keys` against the manifest and returns every key that does not match.
    pub fn check_keys(&self, keys: &[MethodKey]) -> Vec<KeyMismatch> {
        keys.iter()
            .filter_map(|key| {
                if self.class(key.class_name).is_none() {
                    return Some(KeyMismatch::UnknownClass(*key));
                }

                match self.find_method(key.class_name, key.method_name) {
                    None => Some(KeyMismatch::UnknownMethod(*key)),
                    Some(method) => match method.hash {
                        Some(hash) if hash == key.hash => None,
                        Some(hash) => Some(KeyMismatch::Hash {
                            key: *key,
                            manifest_hash: hash,
                        }),
                        None => Some(KeyMismatch::UnknownMethod(*key)),
                    },
                }
            })
            .collect()
    }

    fn find_method(&self, class_name: &str, method_name: &str) -> Option<&JsonClassMethod> {
        self.ancestry(class_name)
            .find_map(|c| c.methods.iter().find(|m| m.name == method_name))
    }

    /// `class_name` followed by its ancestors. Stops on unknown names and on cycles.
    fn ancestry<'a>(&'a self, class_name: &str) -> impl Iterator<Item = &'a JsonClass> + 'a {
        let mut current = self.class(class_name);
        let mut remaining = self.classes.len();

        std::iter::from_fn(move || {
            let class = current.filter(|_| remaining > 0)?;
            remaining -= 1;
            current = class.inherits.as_deref().and_then(|base| self.class(base));
            Some(class)
        })
    }
}

// ----------------------------------------------------------------------------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "header": {
            "version_major": 4,
            "version_minor": 3,
            "version_patch": 0,
            "version_status": "stable",
            "version_full_name": "Godot Engine v4.3.stable.official"
        },
        "builtin_classes": [],
        "classes": [
            {
                "name": "Object",
                "is_refcounted": false,
                "is_instantiable": true,
                "api_type": "core",
                "methods": [
                    { "name": "get_class", "is_const": true, "is_vararg": false, "is_static": false, "is_virtual": false, "hash": 201670096 },
                    { "name": "call", "is_const": false, "is_vararg": true, "is_static": false, "is_virtual": false, "hash": 3400424181 }
                ]
            },
            {
                "name": "RefCounted",
                "is_refcounted": true,
                "is_instantiable": true,
                "inherits": "Object",
                "methods": [
                    { "name": "init_ref", "is_vararg": false, "hash": 2240911060 }
                ]
            },
            {
                "name": "Resource",
                "is_refcounted": true,
                "is_instantiable": true,
                "inherits": "RefCounted",
                "methods": [
                    { "name": "_setup_local_to_scene", "is_virtual": true }
                ]
            }
        ],
        "singletons": [ { "name": "ClassDB", "type": "ClassDB" } ]
    }"#;

    fn manifest() -> ApiManifest {
        ApiManifest::from_json(JSON).expect("valid manifest")
    }

    #[test]
    fn header_and_classes() {
        let m = manifest();

        assert_eq!(m.version(), (4, 3, 0));
        assert_eq!(m.header().version_full_name, "Godot Engine v4.3.stable.official");
        assert_eq!(m.is_refcounted("Resource"), Some(true));
        assert_eq!(m.is_refcounted("Object"), Some(false));
        assert_eq!(m.is_refcounted("Node"), None);
        assert!(m.is_singleton("ClassDB"));
        assert_eq!(m.methods("Object").len(), 2);
        assert!(m.methods("Object")[1].is_vararg);
        assert!(m.methods("Node").is_empty());
    }

    #[test]
    fn inheritance_chain() {
        let m = manifest();

        assert!(m.inherits("Resource", "Object"));
        assert!(m.inherits("Resource", "Resource"));
        assert!(!m.inherits("Object", "Resource"));
        assert!(!m.inherits("Node", "Object"));
    }

    #[test]
    fn hashes_are_inherited() {
        let m = manifest();

        assert_eq!(m.method_hash("Resource", "get_class"), Some(201670096));
        assert_eq!(m.method_hash("RefCounted", "init_ref"), Some(2240911060));
        assert_eq!(m.method_hash("Resource", "_setup_local_to_scene"), None);
        assert_eq!(m.method_hash("Object", "init_ref"), None);
    }

    #[test]
    fn key_check_reports_mismatches() {
        let m = manifest();
        let good = MethodKey::new("Resource", "get_class", 201670096);
        let stale = MethodKey::new("Object", "get_class", 1);
        let unknown_method = MethodKey::new("Object", "frobnicate", 5);
        let unknown_class = MethodKey::new("Node", "get_name", 2002593661);

        let mismatches = m.check_keys(&[good, stale, unknown_method, unknown_class]);

        assert_eq!(
            mismatches,
            vec![
                KeyMismatch::Hash {
                    key: stale,
                    manifest_hash: 201670096
                },
                KeyMismatch::UnknownMethod(unknown_method),
                KeyMismatch::UnknownClass(unknown_class),
            ]
        );
    }

    #[test]
    fn runtime_compatibility() {
        let m = manifest();
        let runtime = |major, minor, patch| RuntimeVersion {
            major,
            minor,
            patch,
            string: String::new(),
        };

        assert!(m.is_compatible_with(&runtime(4, 3, 0)));
        assert!(m.is_compatible_with(&runtime(4, 4, 1)));
        assert!(!m.is_compatible_with(&runtime(4, 2, 9)));
    }

    #[test]
    fn invalid_input() {
        let err = ApiManifest::from_json("{ \"classes\": [] }").expect_err("header is missing");
        assert!(matches!(err, ManifestError::Parse(_)));
        assert!(err.to_string().starts_with("invalid API manifest"));

        let duplicate = r#"{ "header": { "version_major": 4, "version_minor": 2, "version_patch": 0 },
            "classes": [ { "name": "Object" }, { "name": "Object" } ] }"#;
        let err = ApiManifest::from_json(duplicate).expect_err("duplicate class");
        assert_eq!(err.to_string(), "invalid API manifest: class `Object` declared twice");
    }
}
