//! Extension URI validation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

// scheme ":" opaque-part, e.g. `custom:weather:1` or `aplext:backstack:10`.
static EXTENSION_URI_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:[^\s]+$").expect("extension uri pattern is valid")
});

/// Validated extension URI.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExtensionUri(String);

impl ExtensionUri {
    /// Parses and validates one extension URI.
    ///
    /// Surrounding whitespace is trimmed; inner whitespace is rejected.
    pub fn parse(value: &str) -> Result<Self, UriError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(UriError::Empty);
        }
        if !EXTENSION_URI_PATTERN.is_match(trimmed) {
            return Err(UriError::Malformed(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Scheme part before the first `:`.
    pub fn scheme(&self) -> &str {
        self.0.split(':').next().unwrap_or_default()
    }
}

impl Display for ExtensionUri {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ExtensionUri {
    type Error = UriError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ExtensionUri> for String {
    fn from(value: ExtensionUri) -> Self {
        value.0
    }
}

/// Extension URI parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriError {
    Empty,
    Malformed(String),
}

impl Display for UriError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "extension uri must not be empty"),
            Self::Malformed(value) => write!(f, "extension uri is malformed: {value}"),
        }
    }
}

impl Error for UriError {}
