//! Validated string values used by the entity model.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A value that failed its format constraint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FieldError {
    pub message: &'static str,
}

macro_rules! validated_string {
    ($(#[$meta:meta])* $name:ident, $pattern:literal, $message:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub const MESSAGE_CONSTRAINTS: &'static str = $message;

            pub fn is_valid(value: &str) -> bool {
                static PATTERN: Lazy<Regex> =
                    Lazy::new(|| Regex::new($pattern).expect("field pattern compiles"));
                PATTERN.is_match(value)
            }

            pub fn new(value: impl Into<String>) -> Result<Self, FieldError> {
                let value = value.into();
                if !Self::is_valid(&value) {
                    return Err(FieldError {
                        message: Self::MESSAGE_CONSTRAINTS,
                    });
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = FieldError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

const LABEL_CONSTRAINTS: &str = "The only valid characters are: letters (A-Z, a-z), digits (0-9), underscores (_), hyphens (-)";

validated_string!(
    /// A student's full name; also the student's identity.
    Name,
    r"^[\p{Alphabetic}\p{Nd}][\p{Alphabetic}\p{Nd} ]*$",
    "Names should only contain alphanumeric characters and spaces, and it should not be blank"
);

validated_string!(
    Phone,
    r"^\d{3,}$",
    "Phone numbers should only contain numbers, and it should be at least 3 digits long"
);

validated_string!(
    Email,
    r"^[A-Za-z0-9]+([+_.-][A-Za-z0-9]+)*@([A-Za-z0-9]+(-[A-Za-z0-9]+)*\.)*[A-Za-z0-9]+(-[A-Za-z0-9]+)*[A-Za-z0-9]$",
    "Emails should be of the format local-part@domain, where the local-part is alphanumeric with \
     +_.- separators and the domain is made of period-separated alphanumeric labels"
);

validated_string!(
    Address,
    r"^\S.*$",
    "Addresses can take any values, and it should not be blank"
);

validated_string!(
    /// Identity of a tutorial.
    TutorialName,
    r"^[A-Za-z0-9_-]+$",
    LABEL_CONSTRAINTS
);

validated_string!(
    /// Identity of an assignment within its tutorial.
    AssignmentName,
    r"^[A-Za-z0-9_-]+$",
    LABEL_CONSTRAINTS
);
