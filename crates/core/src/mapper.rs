//! Genomic base-pair to pixel mapping.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{GenomeSegmentModel, Width};

/// Length of chromosome 1 (GRCh38). Relative scaling draws every segment
/// against this, so widgets for different chromosomes share one scale.
pub const REFERENCE_LENGTH_BP: u64 = 248_956_422;

#[derive(Debug, Error, PartialEq)]
pub enum MapperError {
    #[error("segment {0} has no bands")]
    EmptyModel(String),
    #[error("container width {0} is not a usable pixel width")]
    InvalidWidth(f64),
}

/// How genomic length turns into drawn width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalingMode {
    /// Width proportional to `domain_stop / reference_len`.
    Relative,
    /// Always fill the container.
    Absolute,
}

impl ScalingMode {
    pub fn from_rel_size(rel_size: bool) -> Self {
        if rel_size { Self::Relative } else { Self::Absolute }
    }
}

/// Monotonic linear transform from `[domain_start, domain_stop]` bp onto
/// `[0, range_max]` px. Never mutated; rebuild it when the model, width, or
/// scaling mode changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateMapper {
    domain_start: f64,
    domain_stop: f64,
    range_max: f64,
}

impl CoordinateMapper {
    /// Build a mapper for a domain.
    ///
    /// `measure` is only called for [`Width::Inherit`] and must return the
    /// container's rendered width. A negative upper bound (container smaller
    /// than the padding) collapses the range to zero.
    pub fn build(
        domain_start: u64,
        domain_stop: u64,
        width: Width,
        measure: impl FnOnce() -> f64,
        mode: ScalingMode,
        reference_len_bp: u64,
        padding_px: f64,
    ) -> Result<Self, MapperError> {
        let container = match width {
            Width::Pixels(px) => px,
            Width::Inherit => measure(),
        };
        if !container.is_finite() || container < 0.0 {
            return Err(MapperError::InvalidWidth(container));
        }

        let range_max = match mode {
            ScalingMode::Relative if reference_len_bp > 0 => {
                (domain_stop as f64 / reference_len_bp as f64) * container - padding_px
            }
            ScalingMode::Relative | ScalingMode::Absolute => container - padding_px,
        };

        Ok(Self::from_parts(domain_start, domain_stop, range_max.max(0.0)))
    }

    /// Build the mapper for a loaded segment, refusing segments without bands.
    pub fn for_segment(
        model: &GenomeSegmentModel,
        width: Width,
        measure: impl FnOnce() -> f64,
        mode: ScalingMode,
        padding_px: f64,
    ) -> Result<Self, MapperError> {
        if model.is_empty() {
            return Err(MapperError::EmptyModel(model.id.clone()));
        }
        Self::build(
            model.start,
            model.stop,
            width,
            measure,
            mode,
            REFERENCE_LENGTH_BP,
            padding_px,
        )
    }

    pub fn from_parts(domain_start: u64, domain_stop: u64, range_max: f64) -> Self {
        Self {
            domain_start: domain_start as f64,
            domain_stop: domain_stop as f64,
            range_max,
        }
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.domain_start, self.domain_stop)
    }

    pub fn range_max(&self) -> f64 {
        self.range_max
    }

    /// Map a base-pair position to x. Interpolates through the normalized
    /// position so both domain ends land exactly on `0` and `range_max`.
    pub fn to_pixel(&self, bp: f64) -> f64 {
        let span = self.domain_stop - self.domain_start;
        if span <= 0.0 {
            return 0.0;
        }
        let t = (bp - self.domain_start) / span;
        t * self.range_max
    }

    /// Inverse of [`to_pixel`](Self::to_pixel), clamped to the domain.
    pub fn to_bp(&self, px: f64) -> f64 {
        if self.range_max <= 0.0 {
            return self.domain_start;
        }
        let t = (px / self.range_max).clamp(0.0, 1.0);
        self.domain_start + t * (self.domain_stop - self.domain_start)
    }

    /// Clamp an x coordinate to the drawable range.
    pub fn clamp_px(&self, px: f64) -> f64 {
        px.clamp(0.0, self.range_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn no_measure() -> f64 {
        0.0
    }

    #[test]
    fn absolute_fills_width_minus_padding() {
        let m = CoordinateMapper::build(
            1,
            50_000_000,
            Width::Pixels(1000.0),
            no_measure,
            ScalingMode::Absolute,
            REFERENCE_LENGTH_BP,
            30.0,
        )
        .unwrap();
        assert_eq!(m.range_max(), 970.0);
        assert_eq!(m.to_pixel(1.0), 0.0);
        assert_eq!(m.to_pixel(50_000_000.0), 970.0);
    }

    #[test]
    fn relative_with_reference_equal_to_stop_matches_absolute() {
        let m = CoordinateMapper::build(
            0,
            5_000,
            Width::Pixels(800.0),
            no_measure,
            ScalingMode::Relative,
            5_000,
            30.0,
        )
        .unwrap();
        assert_eq!(m.range_max(), 770.0);
    }

    #[test]
    fn relative_scales_against_reference() {
        let half = REFERENCE_LENGTH_BP / 2;
        let m = CoordinateMapper::build(
            0,
            half,
            Width::Pixels(1000.0),
            no_measure,
            ScalingMode::Relative,
            REFERENCE_LENGTH_BP,
            30.0,
        )
        .unwrap();
        assert!((m.range_max() - 470.0).abs() < 1e-6);
    }

    #[test]
    fn inherit_reads_measured_width() {
        let m = CoordinateMapper::build(
            0,
            100,
            Width::Inherit,
            || 430.0,
            ScalingMode::Absolute,
            REFERENCE_LENGTH_BP,
            30.0,
        )
        .unwrap();
        assert_eq!(m.range_max(), 400.0);
    }

    #[test]
    fn narrow_container_collapses_to_zero() {
        let m = CoordinateMapper::build(
            0,
            100,
            Width::Pixels(10.0),
            no_measure,
            ScalingMode::Absolute,
            REFERENCE_LENGTH_BP,
            30.0,
        )
        .unwrap();
        assert_eq!(m.range_max(), 0.0);
        assert_eq!(m.to_pixel(100.0), 0.0);
    }

    #[test]
    fn rejects_nan_width() {
        let err = CoordinateMapper::build(
            0,
            100,
            Width::Inherit,
            || f64::NAN,
            ScalingMode::Absolute,
            REFERENCE_LENGTH_BP,
            30.0,
        );
        assert!(matches!(err, Err(MapperError::InvalidWidth(_))));
    }

    #[test]
    fn empty_segment_is_refused() {
        let model = GenomeSegmentModel::new("Y", 1, 57_227_415, Vec::new()).unwrap();
        let err = CoordinateMapper::for_segment(
            &model,
            Width::Pixels(800.0),
            no_measure,
            ScalingMode::Relative,
            30.0,
        );
        assert_eq!(err, Err(MapperError::EmptyModel("Y".into())));
    }

    #[test]
    fn inverse_clamps_to_domain() {
        let m = CoordinateMapper::from_parts(0, 1000, 900.0);
        assert_eq!(m.to_bp(-50.0), 0.0);
        assert_eq!(m.to_bp(950.0), 1000.0);
        assert_eq!(m.to_bp(450.0), 500.0);
    }

    proptest! {
        #[test]
        fn monotone_with_exact_endpoints(
            start in 0u64..10_000_000,
            len in 1u64..300_000_000,
            width in 31.0f64..4000.0,
            a in 0.0f64..1.0,
            b in 0.0f64..1.0,
        ) {
            let stop = start + len;
            let m = CoordinateMapper::build(
                start,
                stop,
                Width::Pixels(width),
                no_measure,
                ScalingMode::Absolute,
                REFERENCE_LENGTH_BP,
                30.0,
            )
            .unwrap();
            prop_assert_eq!(m.to_pixel(start as f64), 0.0);
            prop_assert_eq!(m.to_pixel(stop as f64), m.range_max());

            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let bp_lo = start as f64 + lo * len as f64;
            let bp_hi = start as f64 + hi * len as f64;
            prop_assert!(m.to_pixel(bp_lo) <= m.to_pixel(bp_hi));
        }
    }
}
