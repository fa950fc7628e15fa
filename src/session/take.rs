//! Recorded takes and the in-memory take store

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{PinchError, Result};

/// A finished recording
///
/// Metadata serializes to JSON; the encoded payload does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Take {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub sample_rate: u32,
    pub channels: usize,
    pub frames: usize,
    pub mime_type: String,
    /// Hex SHA-256 of the payload
    pub sha256: String,
    #[serde(skip)]
    pub payload: Vec<u8>,
}

impl Take {
    pub fn new(payload: Vec<u8>, mime_type: &str, sample_rate: u32, channels: usize, frames: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            sample_rate,
            channels,
            frames,
            mime_type: mime_type.to_string(),
            sha256: payload_digest(&payload),
            payload,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / self.sample_rate as f64
    }

    /// Suggested download name, e.g. `take-20260101-120000.wav`
    pub fn file_name(&self) -> String {
        let ext = match self.mime_type.as_str() {
            "audio/wav" => "wav",
            _ => "bin",
        };
        format!("take-{}.{}", self.created_at.format("%Y%m%d-%H%M%S"), ext)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.payload)?;
        Ok(())
    }
}

/// Hex SHA-256 of encoded audio
pub fn payload_digest(payload: &[u8]) -> String {
    format!("{:x}", Sha256::digest(payload))
}

/// Takes recorded during a session, oldest first
#[derive(Debug, Clone, Default)]
pub struct TakeStore {
    takes: Vec<Take>,
}

impl TakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, take: Take) {
        self.takes.push(take);
    }

    pub fn get(&self, id: Uuid) -> Option<&Take> {
        self.takes.iter().find(|t| t.id == id)
    }

    pub fn require(&self, id: Uuid) -> Result<&Take> {
        self.get(id).ok_or_else(|| PinchError::TakeNotFound { id: id.to_string() })
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Take> {
        let idx = self.takes.iter().position(|t| t.id == id)?;
        Some(self.takes.remove(idx))
    }

    pub fn latest(&self) -> Option<&Take> {
        self.takes.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Take> {
        self.takes.iter()
    }

    pub fn len(&self) -> usize {
        self.takes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.takes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn take(bytes: &[u8]) -> Take {
        Take::new(bytes.to_vec(), "audio/wav", 48000, 2, 24000)
    }

    #[test]
    fn test_digest_is_stable() {
        let a = take(b"abc");
        let b = take(b"abc");
        assert_ne!(a.id, b.id);
        assert_eq!(a.sha256, b.sha256);
        assert_eq!(
            a.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(a.duration_secs(), 0.5);
    }

    #[test]
    fn test_store_lookup() {
        let mut store = TakeStore::new();
        let first = take(b"one");
        let second = take(b"two");
        let (first_id, second_id) = (first.id, second.id);
        store.insert(first);
        store.insert(second);

        assert_eq!(store.len(), 2);
        assert_eq!(store.latest().map(|t| t.id), Some(second_id));
        assert!(store.get(first_id).is_some());
        assert!(store.remove(first_id).is_some());
        assert!(store.get(first_id).is_none());

        let err = store.require(first_id).unwrap_err();
        assert_eq!(err.error_code(), "TAKE_NOT_FOUND");
    }

    #[test]
    fn test_metadata_json_skips_payload() {
        let t = take(b"payload");
        let json = serde_json::to_value(&t).unwrap();
        assert!(json.get("payload").is_none());
        assert_eq!(json["sha256"], t.sha256);
        assert!(t.file_name().starts_with("take-"));
        assert!(t.file_name().ends_with(".wav"));
    }

    #[test]
    fn test_write_payload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.wav");
        let t = take(b"RIFF");
        t.write_to(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"RIFF");
    }
}
