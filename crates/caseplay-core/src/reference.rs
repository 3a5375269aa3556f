//! Subject and zone lookup tables.
//!
//! Reference data is loaded once, validated, and then only read. The
//! built-in tables are embedded as TOML; an alternative table with the same
//! schema can be loaded from disk:
//!
//! ```toml
//! [subjects."+447700900123"]
//! display_name = "James Walker"
//! location = "Camden"
//! zone = "Z7"
//! remaining_quota_gb = 12.4
//!
//! [zones.Z7]
//! area = "North London"
//! status = "active"
//! incident_id = "INC-7712"
//! affected = 186
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ReplayError, ReplayResult};
use crate::types::{Subject, SubjectId, Zone, ZoneId, ZoneStatus};

/// Embedded demo tables.
const BUILTIN_TOML: &str = include_str!("reference.toml");

/// Maximum accepted reference data file size (1 MB).
const MAX_REFERENCE_FILE_SIZE: u64 = 1_048_576;

/// Immutable subject and zone tables.
///
/// Subjects are kept in identifier order, which is also the order autoplay
/// cycles through them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    /// Subject table.
    #[serde(default)]
    subjects: BTreeMap<SubjectId, Subject>,
    /// Zone table.
    #[serde(default)]
    zones: BTreeMap<ZoneId, Zone>,
}

impl ReferenceData {
    /// The embedded demo tables.
    ///
    /// # Errors
    ///
    /// Returns an error only if the embedded document is malformed.
    pub fn builtin() -> ReplayResult<Self> {
        Self::from_toml_str(BUILTIN_TOML, "<builtin>")
    }

    /// Parse and validate tables from a TOML document.
    ///
    /// `origin` names the document in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::ParseError`] for malformed TOML or any
    /// validation error from [`ReferenceData::validate`].
    pub fn from_toml_str(content: &str, origin: &str) -> ReplayResult<Self> {
        let data: Self = toml::from_str(content).map_err(|e| ReplayError::ParseError {
            path: origin.to_owned(),
            source: e,
        })?;
        data.validate()?;
        debug!(
            origin,
            subjects = data.subjects.len(),
            zones = data.zones.len(),
            "loaded reference data"
        );
        Ok(data)
    }

    /// Load and validate tables from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is too large, fails to
    /// parse, or fails validation.
    pub fn load(path: &Path) -> ReplayResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ReplayError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.len() as u64 > MAX_REFERENCE_FILE_SIZE {
            return Err(ReplayError::InvalidReferenceData {
                entry: path.display().to_string(),
                reason: format!(
                    "file is {} bytes, exceeding the {MAX_REFERENCE_FILE_SIZE} byte limit",
                    content.len()
                ),
            });
        }

        Self::from_toml_str(&content, &path.display().to_string())
    }

    /// Build tables from already-constructed records.
    ///
    /// # Errors
    ///
    /// Returns any validation error from [`ReferenceData::validate`].
    pub fn from_tables(
        subjects: impl IntoIterator<Item = (SubjectId, Subject)>,
        zones: impl IntoIterator<Item = (ZoneId, Zone)>,
    ) -> ReplayResult<Self> {
        let data = Self {
            subjects: subjects.into_iter().collect(),
            zones: zones.into_iter().collect(),
        };
        data.validate()?;
        Ok(data)
    }

    /// Check the table invariants.
    ///
    /// - at least one subject exists
    /// - every subject's zone exists
    /// - every quota is finite and non-negative
    /// - a zone has an incident id exactly when its status is active
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> ReplayResult<()> {
        if self.subjects.is_empty() {
            return Err(ReplayError::InvalidReferenceData {
                entry: "subjects".to_owned(),
                reason: "at least one subject is required".to_owned(),
            });
        }

        for (id, zone) in &self.zones {
            match (zone.status, &zone.incident_id) {
                (ZoneStatus::Active, None) => {
                    return Err(ReplayError::InvalidReferenceData {
                        entry: format!("zones.{id}"),
                        reason: "active zone must carry an incident_id".to_owned(),
                    });
                },
                (ZoneStatus::None, Some(_)) => {
                    return Err(ReplayError::InvalidReferenceData {
                        entry: format!("zones.{id}"),
                        reason: "zone without an outage must not carry an incident_id".to_owned(),
                    });
                },
                _ => {},
            }
        }

        for (id, subject) in &self.subjects {
            if !self.zones.contains_key(&subject.zone) {
                return Err(ReplayError::UnknownZone {
                    subject: id.to_string(),
                    zone: subject.zone.to_string(),
                });
            }
            if !subject.remaining_quota_gb.is_finite() || subject.remaining_quota_gb < 0.0 {
                return Err(ReplayError::InvalidReferenceData {
                    entry: format!("subjects.{id}"),
                    reason: "remaining_quota_gb must be a finite non-negative number".to_owned(),
                });
            }
        }

        Ok(())
    }

    /// Look up a subject.
    #[must_use]
    pub fn subject(&self, id: &SubjectId) -> Option<&Subject> {
        self.subjects.get(id)
    }

    /// Look up a zone.
    #[must_use]
    pub fn zone(&self, id: &ZoneId) -> Option<&Zone> {
        self.zones.get(id)
    }

    /// Look up a subject together with its zone.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::UnknownSubject`] if the subject is not in the
    /// table. Validated tables never produce [`ReplayError::UnknownZone`].
    pub fn resolve(&self, id: &SubjectId) -> ReplayResult<(&Subject, &Zone)> {
        let subject = self
            .subject(id)
            .ok_or_else(|| ReplayError::unknown_subject(id.as_str()))?;
        let zone = self.zone(&subject.zone).ok_or_else(|| ReplayError::UnknownZone {
            subject: id.to_string(),
            zone: subject.zone.to_string(),
        })?;
        Ok((subject, zone))
    }

    /// Whether the subject exists.
    #[must_use]
    pub fn contains(&self, id: &SubjectId) -> bool {
        self.subjects.contains_key(id)
    }

    /// Subjects in identifier order.
    pub fn subjects(&self) -> impl Iterator<Item = (&SubjectId, &Subject)> {
        self.subjects.iter()
    }

    /// Number of subjects.
    #[must_use]
    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    /// First subject in identifier order.
    #[must_use]
    pub fn first_subject(&self) -> Option<&SubjectId> {
        self.subjects.keys().next()
    }

    /// Subject that follows `current` in round-robin order.
    ///
    /// Wraps around at the end of the table. An unknown `current` yields the
    /// first subject. With exactly two subjects this alternates.
    #[must_use]
    pub fn next_subject_after(&self, current: &SubjectId) -> Option<&SubjectId> {
        self.subjects
            .range::<SubjectId, _>((
                std::ops::Bound::Excluded(current),
                std::ops::Bound::Unbounded,
            ))
            .next()
            .map(|(id, _)| id)
            .or_else(|| self.first_subject())
    }
}
