/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::error::Error;
use std::fmt;

use crate::builtin::{Variant, VariantType};

/// Represents errors that can occur when converting values from the engine.
///
/// The offending value is rendered to text when the error is created, so the error holds no engine handles and can be
/// sent across threads or outlive the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertError {
    kind: ErrorKind,
    value: Option<String>,
}

impl ConvertError {
    /// Construct with a user-defined message.
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Custom(user_message.into()),
            value: None,
        }
    }

    pub(crate) fn bad_type(expected: VariantType, variant: &Variant) -> Self {
        Self {
            kind: ErrorKind::BadType {
                expected,
                actual: variant.get_type(),
            },
            value: Some(format!("{variant:?}")),
        }
    }

    pub(crate) fn bad_value(message: impl Into<String>, variant: &Variant) -> Self {
        Self {
            kind: ErrorKind::BadValue(message.into()),
            value: Some(format!("{variant:?}")),
        }
    }

    pub(crate) fn wrong_class(expected: &str, actual: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::WrongClass {
                expected: expected.to_string(),
                actual: actual.into(),
            },
            value: None,
        }
    }

    pub(crate) fn null_object() -> Self {
        Self {
            kind: ErrorKind::NullObject,
            value: None,
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Textual form of the value that failed to convert, if one was recorded.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(value) = &self.value {
            write!(f, ": {value}")?;
        }

        Ok(())
    }
}

impl Error for ConvertError {}

/// Description of what went wrong in a conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The variant holds a different type than the one requested.
    BadType {
        expected: VariantType,
        actual: VariantType,
    },

    /// The object exists, but is not an instance of the requested class.
    WrongClass { expected: String, actual: String },

    /// The type matches, but the value is outside the target's domain (e.g. integer overflow).
    BadValue(String),

    /// The variant holds a null or freed object.
    NullObject,

    /// User-defined message.
    Custom(String),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadType { expected, actual } => {
                write!(f, "expected type `{expected:?}`, got `{actual:?}`")
            }
            Self::WrongClass { expected, actual } => {
                write!(f, "expected class `{expected}`, got `{actual}`")
            }
            Self::BadValue(message) => write!(f, "{message}"),
            Self::NullObject => write!(f, "`Gd` cannot be null"),
            Self::Custom(message) => write!(f, "{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_without_value() {
        assert_eq!(ConvertError::null_object().to_string(), "`Gd` cannot be null");
        assert_eq!(
            ConvertError::wrong_class("Node", "RefCounted").to_string(),
            "expected class `Node`, got `RefCounted`"
        );
        assert_eq!(ConvertError::new("custom").to_string(), "custom");
    }

    #[test]
    fn display_with_value() {
        let err = ConvertError {
            kind: ErrorKind::BadType {
                expected: VariantType::Int,
                actual: VariantType::String,
            },
            value: Some("\"seven\"".to_string()),
        };

        assert_eq!(
            err.to_string(),
            "expected type `Int`, got `String`: \"seven\""
        );
        assert_eq!(err.value(), Some("\"seven\""));
    }
}
