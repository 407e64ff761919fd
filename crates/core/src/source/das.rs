use serde::Deserialize;

use super::SourceError;
use crate::model::{BandFeature, GenomeSegmentModel};

const ENSEMBL_DAS_ROOT: &str = "http://www.ensembl.org/das";

/// Karyotype DAS source for a human assembly, e.g. `GRCh37`.
pub fn das_source_url(assembly: u32) -> String {
    format!("{ENSEMBL_DAS_ROOT}/Homo_sapiens.GRCh{assembly}.karyotype")
}

/// Features request for one segment.
pub fn das_features_url(segment_id: &str, assembly: u32) -> String {
    format!("{}/features?segment={segment_id}", das_source_url(assembly))
}

#[derive(Deserialize)]
struct DasResponse {
    #[serde(rename = "GFF")]
    gff: Gff,
}

#[derive(Deserialize)]
struct Gff {
    #[serde(rename = "SEGMENT", default)]
    segments: Vec<DasSegment>,
}

#[derive(Deserialize)]
struct DasSegment {
    id: String,
    start: DasNumber,
    stop: DasNumber,
    #[serde(rename = "FEATURE", default)]
    features: Vec<DasFeature>,
}

#[derive(Deserialize)]
struct DasFeature {
    id: String,
    #[serde(rename = "TYPE")]
    kind: DasType,
    #[serde(rename = "START")]
    start: DasNumber,
    #[serde(rename = "END")]
    end: DasNumber,
}

#[derive(Deserialize)]
struct DasType {
    id: String,
}

/// DAS JSON renderings disagree on how positions are written: a bare
/// number, a numeric string, or an XML-ish node with `textContent`.
#[derive(Deserialize)]
#[serde(untagged)]
enum DasNumber {
    Int(u64),
    Text(String),
    Node {
        #[serde(rename = "textContent")]
        text_content: String,
    },
}

impl DasNumber {
    fn to_bp(&self, feature: &str, field: &'static str) -> Result<u64, SourceError> {
        let text = match self {
            DasNumber::Int(n) => return Ok(*n),
            DasNumber::Text(s) | DasNumber::Node { text_content: s } => s.trim(),
        };
        text.parse().map_err(|_| SourceError::InvalidNumber {
            feature: feature.to_string(),
            field,
            value: text.to_string(),
        })
    }
}

/// Parse a DAS `features` response (JSON form) into a segment model.
///
/// Only the first segment is used. An empty `SEGMENT` list is
/// [`SourceError::EmptySegment`]; a segment with no features is a valid,
/// empty model. A feature with an unreadable position is skipped with a
/// warning and the other features are kept.
pub fn parse_das_features(data: &[u8]) -> Result<GenomeSegmentModel, SourceError> {
    let response: DasResponse = serde_json::from_slice(data)?;
    let Some(segment) = response.gff.segments.into_iter().next() else {
        return Err(SourceError::EmptySegment("response".into()));
    };

    let start = segment.start.to_bp(&segment.id, "start")?;
    let stop = segment.stop.to_bp(&segment.id, "stop")?;

    let bands = segment
        .features
        .into_iter()
        .filter_map(|f| {
            let bounds = f
                .start
                .to_bp(&f.id, "START")
                .and_then(|start| Ok((start, f.end.to_bp(&f.id, "END")?)));
            match bounds {
                Ok((start_bp, end_bp)) => Some(BandFeature {
                    start_bp,
                    end_bp,
                    type_id: f.kind.id,
                    id: f.id,
                }),
                Err(err) => {
                    log::warn!("segment {}: skipping band: {err}", segment.id);
                    None
                }
            }
        })
        .collect();

    Ok(GenomeSegmentModel::new(segment.id, start, stop, bands)?)
}
