//! Canonical content identifiers.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier of backend-owned content (videos, materials, quizzes, courses).
///
/// The backend and the push channel do not agree on a primitive type for
/// identifiers - the same video id can arrive as a JSON string in one payload
/// and as a number in the next. Every id is therefore normalized to a string
/// at the boundary where it first enters the process, and compared only in
/// that form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ContentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for ContentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Str(String),
            Num(serde_json::Number),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Str(s) => ContentId(s),
            Repr::Num(n) => ContentId(n.to_string()),
        })
    }
}
