use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Band type id of the centromeric stalk, drawn shorter than other bands.
pub const STALK_TYPE: &str = "band:stalk";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("segment {id}: start {start} is after stop {stop}")]
    InvertedSegment { id: String, start: u64, stop: u64 },
}

/// One annotated sub-region of a segment (a cytogenetic band).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandFeature {
    /// Band name, e.g. `p36.33`.
    pub id: String,
    /// Categorical type, e.g. `band:gpos50` or `band:stalk`.
    pub type_id: String,
    pub start_bp: u64,
    pub end_bp: u64,
}

impl BandFeature {
    pub fn new(id: impl Into<String>, type_id: impl Into<String>, start_bp: u64, end_bp: u64) -> Self {
        Self {
            id: id.into(),
            type_id: type_id.into(),
            start_bp,
            end_bp,
        }
    }

    pub fn is_stalk(&self) -> bool {
        self.type_id == STALK_TYPE
    }
}

/// A loaded chromosome: its extent and its ordered bands.
///
/// Built once per `(segment, assembly)` load and never patched; a reload
/// replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenomeSegmentModel {
    pub id: String,
    pub start: u64,
    pub stop: u64,
    bands: Vec<BandFeature>,
}

impl GenomeSegmentModel {
    /// Validate the extent and sort bands by start position.
    ///
    /// Individual band problems (reversed or out-of-segment ranges) are left
    /// in place; the layout rejects them one band at a time.
    pub fn new(
        id: impl Into<String>,
        start: u64,
        stop: u64,
        mut bands: Vec<BandFeature>,
    ) -> Result<Self, ModelError> {
        let id = id.into();
        if start > stop {
            return Err(ModelError::InvertedSegment { id, start, stop });
        }
        bands.sort_by_key(|b| b.start_bp);
        Ok(Self {
            id,
            start,
            stop,
            bands,
        })
    }

    pub fn bands(&self) -> &[BandFeature] {
        &self.bands
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Length in base pairs.
    pub fn length(&self) -> u64 {
        self.stop - self.start
    }
}
