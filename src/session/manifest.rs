//! Session manifest structure and serialization
//!
//! The manifest is the dev-tool JSON description of a captured session,
//! used by the CLI and tests to construct snapshots. It is NOT the
//! production persistence format; that format and its I/O are owned by the
//! external snapshot subsystem.
//!
//! Format:
//! ```json
//! {
//!   "captured_at": "2026-02-04T11:30:00Z",
//!   "active_index": 3,
//!   "groups": [{"id": 1, "title": "work", "collapsed": false}],
//!   "records": [
//!     {
//!       "id": 17,
//!       "url": "https://example.com",
//!       "payload": "c3RhdGU=",
//!       "checksum": "crc32:3120fd4b"
//!     }
//!   ],
//!   "format_version": 1
//! }
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{SessionError, SessionResult};
use super::record::{parse_checksum, PersistedRecord, RecordId, RecordPayload};
use super::snapshot::{Snapshot, TabGroup};

/// Manifest format version supported by this build.
pub const MANIFEST_FORMAT_VERSION: u8 = 1;

/// One record entry in a session manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordEntry {
    /// Stable record identifier.
    pub id: u64,

    /// Last-known URL.
    pub url: String,

    /// Whether the record belongs to the incognito model.
    #[serde(default)]
    pub is_incognito: bool,

    /// Whether the record arrived via a cross-instance merge.
    #[serde(default)]
    pub from_merge: bool,

    /// Group handle into `groups`.
    #[serde(default)]
    pub group: Option<u64>,

    /// Base64-encoded payload bytes; absent or empty means the record is
    /// unrestorable and will be dropped during restore.
    #[serde(default)]
    pub payload: Option<String>,

    /// Expected payload checksum (format: `crc32:xxxxxxxx`).
    #[serde(default)]
    pub checksum: Option<String>,
}

/// One group entry in a session manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupEntry {
    /// Group handle referenced by record entries.
    pub id: u64,

    /// User-visible title.
    pub title: String,

    /// Whether the group was collapsed when captured.
    #[serde(default)]
    pub collapsed: bool,
}

/// Session manifest: the authoritative dev-tool session descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionManifest {
    /// Capture timestamp (RFC3339).
    pub captured_at: DateTime<Utc>,

    /// Index of the foregrounded record when captured; may be out of range.
    #[serde(default)]
    pub active_index: Option<usize>,

    /// Grouping metadata.
    #[serde(default)]
    pub groups: Vec<GroupEntry>,

    /// Records in original index order.
    pub records: Vec<RecordEntry>,

    /// Manifest format version (always 1).
    pub format_version: u8,
}

impl SessionManifest {
    /// Loads a manifest from a JSON file.
    pub fn load(path: &Path) -> SessionResult<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| SessionError::io_error_at_path(path, e))?;

        let manifest: SessionManifest = serde_json::from_str(&content)?;

        if manifest.format_version != MANIFEST_FORMAT_VERSION {
            return Err(SessionError::UnsupportedVersion(manifest.format_version));
        }

        Ok(manifest)
    }

    /// Writes the manifest to a JSON file.
    pub fn save(&self, path: &Path) -> SessionResult<()> {
        let json = serde_json::to_string_pretty(self)?;

        let mut file = File::create(path).map_err(|e| SessionError::io_error_at_path(path, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| SessionError::io_error_at_path(path, e))?;

        Ok(())
    }

    /// Converts the manifest into a snapshot ready for delivery to a
    /// restore coordinator.
    ///
    /// Malformed base64 payloads and malformed checksum strings are
    /// manifest errors (the dev file itself is broken); a payload whose
    /// checksum merely mismatches its bytes converts cleanly and is later
    /// dropped by the restore pass as unusable.
    pub fn into_snapshot(self) -> SessionResult<Snapshot> {
        let mut records = Vec::with_capacity(self.records.len());

        for entry in self.records {
            let bytes = match &entry.payload {
                None => Vec::new(),
                Some(encoded) => {
                    STANDARD
                        .decode(encoded)
                        .map_err(|e| SessionError::InvalidPayload {
                            id: entry.id,
                            reason: e.to_string(),
                        })?
                }
            };

            let payload = match &entry.checksum {
                None => RecordPayload::new(bytes),
                Some(s) => RecordPayload::with_checksum(bytes, parse_checksum(s)?),
            };

            records.push(PersistedRecord {
                id: RecordId::new(entry.id),
                url: entry.url,
                is_incognito: entry.is_incognito,
                from_merge: entry.from_merge,
                group: entry.group,
                payload,
            });
        }

        let groups = self
            .groups
            .into_iter()
            .map(|g| TabGroup {
                id: g.id,
                title: g.title,
                collapsed: g.collapsed,
            })
            .collect();

        Ok(Snapshot::new(records, self.active_index, groups))
    }
}
