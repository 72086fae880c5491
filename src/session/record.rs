//! Persisted record model
//!
//! A record is one persisted tab-like unit waiting to be restored into a
//! live object. Records carry enough metadata (last-known URL, incognito
//! bit, merge provenance) to support predicate lookup without
//! materializing the payload.

use std::fmt;

use crc32fast::Hasher;

use super::errors::{SessionError, SessionResult};

/// Stable identifier for a persisted record.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct RecordId(u64);

impl RecordId {
    /// Creates a `RecordId` from a raw numeric value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque serialized state for one record.
///
/// A payload may be empty, or carry a checksum that no longer matches its
/// bytes. Both make the record permanently unrestorable: a tolerated
/// content-loss mode after an abnormal shutdown, not a fault. Unusable
/// payloads are dropped silently during restore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPayload {
    bytes: Vec<u8>,
    checksum: Option<u32>,
}

impl RecordPayload {
    /// Payload without integrity metadata.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            checksum: None,
        }
    }

    /// Payload with an expected CRC32 checksum.
    pub fn with_checksum(bytes: Vec<u8>, checksum: u32) -> Self {
        Self {
            bytes,
            checksum: Some(checksum),
        }
    }

    /// The empty (unrestorable) payload.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Raw payload bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Expected checksum, if one was persisted.
    pub fn checksum(&self) -> Option<u32> {
        self.checksum
    }

    /// Whether this payload can be materialized at all.
    ///
    /// Empty bytes or a checksum mismatch mean the record is dropped
    /// during restore without an error.
    pub fn is_usable(&self) -> bool {
        if self.bytes.is_empty() {
            return false;
        }
        match self.checksum {
            None => true,
            Some(expected) => compute_checksum(&self.bytes) == expected,
        }
    }
}

/// Computes a CRC32 checksum over the provided data.
///
/// Deterministic: the same input always produces the same output.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Formats a CRC32 checksum as `crc32:xxxxxxxx` (lowercase hex, zero-padded).
pub fn format_checksum(checksum: u32) -> String {
    format!("crc32:{:08x}", checksum)
}

/// Parses a `crc32:xxxxxxxx` string back to a u32.
pub fn parse_checksum(s: &str) -> SessionResult<u32> {
    let hex = s
        .strip_prefix("crc32:")
        .ok_or_else(|| SessionError::InvalidChecksum(s.to_string()))?;

    if hex.len() != 8 {
        return Err(SessionError::InvalidChecksum(s.to_string()));
    }

    u32::from_str_radix(hex, 16).map_err(|_| SessionError::InvalidChecksum(s.to_string()))
}

/// One persisted tab-like unit.
#[derive(Debug, Clone)]
pub struct PersistedRecord {
    /// Stable identifier carried across restore episodes.
    pub id: RecordId,
    /// Last-known URL; supports targeted lookup without materialization.
    pub url: String,
    /// Whether the record belongs to the incognito model.
    pub is_incognito: bool,
    /// Whether the record arrived via a cross-instance merge.
    pub from_merge: bool,
    /// Group handle into the snapshot's grouping metadata.
    pub group: Option<u64>,
    /// Opaque serialized state; may be unusable.
    pub payload: RecordPayload,
}

impl PersistedRecord {
    /// Record with the given id and url and a usable placeholder payload.
    ///
    /// Convenience for constructing records whose payload content is
    /// irrelevant to the caller (the dev CLI and tests).
    pub fn new(id: RecordId, url: impl Into<String>, payload: RecordPayload) -> Self {
        Self {
            id,
            url: url.into(),
            is_incognito: false,
            from_merge: false,
            group: None,
            payload,
        }
    }
}
