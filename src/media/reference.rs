use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{FramemarkError, FramemarkResult};

/// Prefix that marks a reference held only in the local durable store.
pub const VOLATILE_PREFIX: &str = "local-pending:";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// Where a piece of media lives.
///
/// Serialized as a plain string: persisted references verbatim, volatile ones as
/// `local-pending:<name>`.
pub enum MediaRef {
    /// Opaque storage path or URL.
    Persisted(String),
    /// Artifact name resolvable only through the local durable store.
    Volatile(String),
}

impl MediaRef {
    /// Parse a stored string. Empty input is rejected.
    pub fn parse(raw: &str) -> FramemarkResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(FramemarkError::validation("media reference is empty"));
        }
        match raw.strip_prefix(VOLATILE_PREFIX) {
            Some("") => Err(FramemarkError::validation(
                "volatile media reference has no name",
            )),
            Some(name) => Ok(Self::Volatile(name.to_owned())),
            None => Ok(Self::Persisted(raw.to_owned())),
        }
    }

    pub fn persisted(path: impl Into<String>) -> Self {
        Self::Persisted(path.into())
    }

    pub fn volatile(name: impl Into<String>) -> Self {
        Self::Volatile(name.into())
    }

    pub fn is_volatile(&self) -> bool {
        matches!(self, Self::Volatile(_))
    }

    /// Path/URL for persisted references, artifact name for volatile ones.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Persisted(s) | Self::Volatile(s) => s,
        }
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Persisted(path) => f.write_str(path),
            Self::Volatile(name) => write!(f, "{VOLATILE_PREFIX}{name}"),
        }
    }
}

impl FromStr for MediaRef {
    type Err = FramemarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for MediaRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for MediaRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/reference.rs"]
mod tests;
