//! Verification slips handed from a history list to a print preview.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which identity document a slip renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlipKind {
    /// Bank Verification Number result.
    Bvn,
    /// National Identification Number result.
    Nin,
}

impl std::fmt::Display for SlipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bvn => write!(f, "BVN"),
            Self::Nin => write!(f, "NIN"),
        }
    }
}

/// A verification result paired with the print template that renders it.
///
/// Held in memory only; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlipPayload {
    /// Verification result as returned by the API.
    pub data: Value,
    /// Print template tag (e.g. `"premium"`, `"standard"`).
    pub layout: String,
}

impl SlipPayload {
    /// Create a slip payload.
    pub fn new(data: Value, layout: impl Into<String>) -> Self {
        Self {
            data,
            layout: layout.into(),
        }
    }
}
