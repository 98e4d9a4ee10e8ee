//! Persistence of the segmentation thresholds.
//!
//! The record is three little-endian `i32`s — min size, max size, edge
//! threshold — written verbatim. How the bytes reach non-volatile storage is
//! the store implementation's business.

use crate::{
    error::{TargetingError, TargetingResult},
    segmentation::SegmentationParams,
};
use std::path::{Path, PathBuf};

/// Encoded record length in bytes.
pub const RECORD_LEN: usize = 12;

/// Fixed-layout encoding of [`SegmentationParams`].
pub fn encode_record(params: &SegmentationParams) -> [u8; RECORD_LEN] {
    let mut out = [0u8; RECORD_LEN];
    out[0..4].copy_from_slice(&params.min_object_size.to_le_bytes());
    out[4..8].copy_from_slice(&params.max_object_size.to_le_bytes());
    out[8..12].copy_from_slice(&params.edge_call_threshold.to_le_bytes());
    out
}

/// Decode a record produced by [`encode_record`].
pub fn decode_record(bytes: &[u8]) -> TargetingResult<SegmentationParams> {
    if bytes.len() != RECORD_LEN {
        return Err(TargetingError::RecordLength {
            expected: RECORD_LEN,
            actual: bytes.len(),
        });
    }
    let field = |i: usize| {
        let mut word = [0u8; 4];
        word.copy_from_slice(&bytes[i * 4..i * 4 + 4]);
        i32::from_le_bytes(word)
    };
    Ok(SegmentationParams {
        min_object_size: field(0),
        max_object_size: field(1),
        edge_call_threshold: field(2),
    })
}

/// Save/restore pair for the segmentation record.
pub trait ParameterStore {
    fn save(&mut self, params: &SegmentationParams) -> TargetingResult<()>;

    /// `Ok(None)` if nothing was ever saved.
    fn restore(&self) -> TargetingResult<Option<SegmentationParams>>;
}

/// In-memory store; holds the encoded bytes like a flash page would.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    record: Option<[u8; RECORD_LEN]>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw record bytes, if saved.
    pub fn record(&self) -> Option<&[u8; RECORD_LEN]> {
        self.record.as_ref()
    }
}

impl ParameterStore for MemoryStore {
    fn save(&mut self, params: &SegmentationParams) -> TargetingResult<()> {
        self.record = Some(encode_record(params));
        Ok(())
    }

    fn restore(&self) -> TargetingResult<Option<SegmentationParams>> {
        self.record.as_ref().map(|r| decode_record(r)).transpose()
    }
}

/// Record kept in a single file.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ParameterStore for FileStore {
    fn save(&mut self, params: &SegmentationParams) -> TargetingResult<()> {
        std::fs::write(&self.path, encode_record(params))?;
        tracing::info!(path = %self.path.display(), "segmentation parameters saved");
        Ok(())
    }

    fn restore(&self) -> TargetingResult<Option<SegmentationParams>> {
        match std::fs::read(&self.path) {
            Ok(bytes) => decode_record(&bytes).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
