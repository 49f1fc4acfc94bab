//! Closed extension error code set.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Error codes carried in failure documents as `errorCode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum ExtensionErrorCode {
    None,
    InvalidMessage,
    UnknownUri,
    Exception,
    FailedCommand,
    InvalidExtensionSchema,
}

impl ExtensionErrorCode {
    /// Stable wire integer.
    pub fn code(self) -> i64 {
        match self {
            Self::None => 0,
            Self::InvalidMessage => 1,
            Self::UnknownUri => 2,
            Self::Exception => 3,
            Self::FailedCommand => 4,
            Self::InvalidExtensionSchema => 5,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::InvalidMessage),
            2 => Some(Self::UnknownUri),
            3 => Some(Self::Exception),
            4 => Some(Self::FailedCommand),
            5 => Some(Self::InvalidExtensionSchema),
            _ => None,
        }
    }

    /// Symbolic name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "kErrorNone",
            Self::InvalidMessage => "kErrorInvalidMessage",
            Self::UnknownUri => "kErrorUnknownURI",
            Self::Exception => "kErrorException",
            Self::FailedCommand => "kErrorFailedCommand",
            Self::InvalidExtensionSchema => "kErrorInvalidExtensionSchema",
        }
    }
}

impl Display for ExtensionErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.as_str(), self.code())
    }
}

impl From<ExtensionErrorCode> for i64 {
    fn from(value: ExtensionErrorCode) -> Self {
        value.code()
    }
}

impl TryFrom<i64> for ExtensionErrorCode {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_code(value).ok_or_else(|| format!("unknown extension error code: {value}"))
    }
}
