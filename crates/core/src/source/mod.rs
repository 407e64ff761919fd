//! Annotation data sources.
//!
//! The view only needs [`AnnotationSource`]; how a segment is fetched
//! (HTTP, file, fixture) is the implementor's business.

pub mod das;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::{GenomeSegmentModel, ModelError};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("reading annotation data: {0}")]
    Io(#[from] std::io::Error),
    #[error("decoding annotation JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("response has no segment for {0}")]
    EmptySegment(String),
    #[error("feature {feature}: {field} is not a base-pair position: {value:?}")]
    InvalidNumber {
        feature: String,
        field: &'static str,
        value: String,
    },
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("annotation source unavailable: {0}")]
    Unavailable(String),
}

/// Fetches the band model of one segment for one assembly.
pub trait AnnotationSource {
    fn fetch_segment(
        &self,
        segment_id: &str,
        assembly: u32,
    ) -> Result<GenomeSegmentModel, SourceError>;
}

impl<F> AnnotationSource for F
where
    F: Fn(&str, u32) -> Result<GenomeSegmentModel, SourceError>,
{
    fn fetch_segment(
        &self,
        segment_id: &str,
        assembly: u32,
    ) -> Result<GenomeSegmentModel, SourceError> {
        self(segment_id, assembly)
    }
}

/// Reads saved DAS feature responses from disk.
///
/// Looks for `{dir}/GRCh{assembly}/{segment}.json` first, then
/// `{dir}/{segment}.json`.
#[derive(Debug, Clone)]
pub struct DasFileSource {
    dir: PathBuf,
}

impl DasFileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, segment_id: &str, assembly: u32) -> PathBuf {
        let file = format!("{segment_id}.json");
        let versioned = self.dir.join(format!("GRCh{assembly}")).join(&file);
        if versioned.is_file() {
            versioned
        } else {
            self.dir.join(file)
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl AnnotationSource for DasFileSource {
    fn fetch_segment(
        &self,
        segment_id: &str,
        assembly: u32,
    ) -> Result<GenomeSegmentModel, SourceError> {
        let path = self.path_for(segment_id, assembly);
        log::debug!("reading segment {segment_id} from {}", path.display());
        let data = std::fs::read(&path)?;
        das::parse_das_features(&data)
    }
}
