//! Reference data records and identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a subject (the customer being investigated).
///
/// Opaque key; the built-in tables use phone numbers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub String);

impl SubjectId {
    /// Create a subject ID from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SubjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of a service zone.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub String);

impl ZoneId {
    /// Create a zone ID from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Customer record looked up by [`SubjectId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Name shown in the request event.
    pub display_name: String,
    /// Free-form location label.
    pub location: String,
    /// Zone the subject is served from.
    pub zone: ZoneId,
    /// Remaining data allowance in GB.
    pub remaining_quota_gb: f64,
}

/// Outage status of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneStatus {
    /// An outage incident is open for the zone.
    Active,
    /// No outage.
    None,
}

impl fmt::Display for ZoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("ACTIVE"),
            Self::None => f.write_str("NONE"),
        }
    }
}

/// Service area record looked up by [`ZoneId`].
///
/// `incident_id` is present exactly when `status` is [`ZoneStatus::Active`];
/// [`ReferenceData`](crate::ReferenceData) rejects tables that break this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Human-readable area name.
    pub area: String,
    /// Current outage status.
    pub status: ZoneStatus,
    /// Open incident, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_id: Option<String>,
    /// Number of affected customers.
    #[serde(default)]
    pub affected: u32,
}

impl Zone {
    /// Whether an outage is currently open in this zone.
    #[must_use]
    pub fn has_outage(&self) -> bool {
        self.status == ZoneStatus::Active
    }
}

/// Monotonic counter identifying one sequencer execution.
///
/// Every run request receives a fresh token; a run whose captured token is
/// no longer the latest one is stale and must not touch shared state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RunToken(pub u64);

impl RunToken {
    /// The token before any run has been issued.
    pub const NONE: Self = Self(0);

    /// The token that follows this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Whether this token was issued to a run.
    #[must_use]
    pub fn is_issued(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for RunToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run#{}", self.0)
    }
}
