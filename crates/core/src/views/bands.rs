use chromovis_protocol::{HitTarget, Point, Rect, RenderCommand, SharedStr, TextAlign, ThemeToken};
use thiserror::Error;

use super::{LABEL_BASELINE, STALK_HEIGHT_FACTOR, STALK_SPACING};
use crate::mapper::CoordinateMapper;
use crate::model::BandFeature;

const LABEL_FONT_SIZE: f64 = 11.0;

/// Per-band data problems. A rejected band is left out of the layout; the
/// bands after it are laid out normally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("band {id}: end {end_bp} precedes start {start_bp}")]
    InvalidBandRange { id: String, start_bp: u64, end_bp: u64 },
    #[error("band {id}: [{start_bp}, {end_bp}] lies outside the segment [{seg_start}, {seg_stop}]")]
    OutOfSegment {
        id: String,
        start_bp: u64,
        end_bp: u64,
        seg_start: u64,
        seg_stop: u64,
    },
}

/// Render geometry for one accepted band.
#[derive(Debug, Clone, PartialEq)]
pub struct BandGeometry {
    /// Position of the band in the source sequence.
    pub index: usize,
    pub id: SharedStr,
    pub start_bp: u64,
    pub end_bp: u64,
    pub x: f64,
    pub width: f64,
    pub height: f64,
    pub y: f64,
    /// `type_id` with `:` turned into a space, e.g. `band gpos50`.
    pub style_class: SharedStr,
    pub token: ThemeToken,
}

impl BandGeometry {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Laid-out bands plus the ones that were refused.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandLayout {
    pub geometries: Vec<BandGeometry>,
    pub rejected: Vec<LayoutError>,
}

impl BandLayout {
    /// Lay out `bands` on `mapper`.
    ///
    /// Stalk bands are drawn at 80% height and pushed down by
    /// [`STALK_SPACING`]; every other type fills the track.
    pub fn layout(
        bands: &[BandFeature],
        mapper: &CoordinateMapper,
        track_height: f64,
        vertical_padding: f64,
    ) -> Self {
        let (seg_start, seg_stop) = mapper.domain();
        let mut layout = Self {
            geometries: Vec::with_capacity(bands.len()),
            rejected: Vec::new(),
        };

        for (index, band) in bands.iter().enumerate() {
            if band.end_bp < band.start_bp {
                layout.reject(LayoutError::InvalidBandRange {
                    id: band.id.clone(),
                    start_bp: band.start_bp,
                    end_bp: band.end_bp,
                });
                continue;
            }
            if (band.start_bp as f64) < seg_start || (band.end_bp as f64) > seg_stop {
                layout.reject(LayoutError::OutOfSegment {
                    id: band.id.clone(),
                    start_bp: band.start_bp,
                    end_bp: band.end_bp,
                    seg_start: seg_start as u64,
                    seg_stop: seg_stop as u64,
                });
                continue;
            }

            let x = mapper.to_pixel(band.start_bp as f64);
            let width = (mapper.to_pixel(band.end_bp as f64) - x).max(0.0);
            let (height, y) = if band.is_stalk() {
                (track_height * STALK_HEIGHT_FACTOR, vertical_padding + STALK_SPACING)
            } else {
                (track_height, vertical_padding)
            };

            layout.geometries.push(BandGeometry {
                index,
                id: SharedStr::from(band.id.as_str()),
                start_bp: band.start_bp,
                end_bp: band.end_bp,
                x,
                width,
                height,
                y,
                style_class: SharedStr::from(band.type_id.replace(':', " ")),
                token: ThemeToken::for_band_type(&band.type_id),
            });
        }

        layout
    }

    fn reject(&mut self, err: LayoutError) {
        log::warn!("skipping band: {err}");
        self.rejected.push(err);
    }

    pub fn get(&self, index: usize) -> Option<&BandGeometry> {
        self.geometries.iter().find(|g| g.index == index)
    }

    /// The band whose drawn rectangle contains `(x, y)`.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&BandGeometry> {
        self.geometries.iter().find(|g| g.rect().contains(x, y))
    }

    pub fn render(&self) -> Vec<RenderCommand> {
        self.geometries
            .iter()
            .map(|g| RenderCommand::DrawRect {
                rect: g.rect(),
                color: g.token,
                border_color: None,
                tooltip: Some(g.id.clone()),
                class: Some(g.style_class.clone()),
                hit: Some(HitTarget::Band(g.index)),
            })
            .collect()
    }
}

/// Text shown above the track while a band is hovered.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverLabel {
    pub text: SharedStr,
    pub x: f64,
}

impl HoverLabel {
    pub fn for_band(geometry: &BandGeometry) -> Self {
        Self {
            text: geometry.id.clone(),
            x: geometry.x,
        }
    }

    pub fn render(&self) -> RenderCommand {
        RenderCommand::DrawText {
            position: Point::new(self.x, LABEL_BASELINE),
            text: self.text.clone(),
            color: ThemeToken::LabelText,
            font_size: LABEL_FONT_SIZE,
            align: TextAlign::Left,
            class: Some("band-lbl".into()),
        }
    }
}
