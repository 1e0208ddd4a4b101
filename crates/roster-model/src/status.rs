//! Health status of a registered application.
//!
//! A status is an open vocabulary: the well-known tags `UP`, `DOWN`,
//! `OFFLINE` and `UNKNOWN` are just the common cases, and a health
//! endpoint may report any string it likes. The timestamp records when
//! the determination was made; equality deliberately ignores it so that
//! "did the status change" checks don't fire on periodic re-confirmation.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A point-in-time health determination for an application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusInfo {
    /// The status tag, uppercased (e.g. "UP", "DOWN", "OFFLINE").
    status: String,
    /// Millisecond epoch timestamp of the determination.
    timestamp: u64,
}

impl StatusInfo {
    /// A status with an arbitrary tag. The tag is uppercased.
    pub fn of(status: &str) -> Self {
        Self {
            status: status.to_uppercase(),
            timestamp: now_millis(),
        }
    }

    pub fn up() -> Self {
        Self::of("UP")
    }

    pub fn down() -> Self {
        Self::of("DOWN")
    }

    pub fn offline() -> Self {
        Self::of("OFFLINE")
    }

    pub fn unknown() -> Self {
        Self::of("UNKNOWN")
    }

    /// The status tag.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Millisecond epoch timestamp of the determination.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Copy of this status with the given timestamp (for tests and
    /// staleness bookkeeping).
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Equality is by tag only — a re-confirmed status with a newer
/// timestamp is still the "same" status.
impl PartialEq for StatusInfo {
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status
    }
}

impl Eq for StatusInfo {}

/// Current time as milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
