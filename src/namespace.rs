// Copyright 2025 Cowboy AI, LLC.

//! CIM namespace normalization.
//!
//! A namespace is a slash-separated name identifying a scope within a
//! CIMOM, e.g. `root/cimv2`. Leading/trailing slashes are stripped and
//! repeated internal slashes collapsed before the namespace is emitted on
//! the wire or compared for equality.

use crate::error::{WbemError, WbemResult};

/// A normalized CIM namespace: non-empty, no leading/trailing `/`, no
/// repeated internal `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(String);

impl Namespace {
    /// Normalize `raw`: strip leading/trailing slashes, collapse repeated
    /// internal slashes. Rejects a namespace that normalizes to empty.
    pub fn normalize(raw: &str) -> WbemResult<Self> {
        let collapsed = raw
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        if collapsed.is_empty() {
            return Err(WbemError::model("namespace is empty after normalization"));
        }
        Ok(Namespace(collapsed))
    }

    /// The normalized namespace as it should appear on the wire, e.g.
    /// `root/cimv2`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `/`-delimited segments of this namespace, e.g.
    /// `["root", "cimv2"]`.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Namespace {
    type Err = WbemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Namespace::normalize(s)
    }
}
