pub mod axis;
pub mod bands;

/// Vertical padding above the band track, and the horizontal space kept
/// free at the right edge.
pub const PADDING: f64 = 30.0;
/// Baseline of the hover label.
pub const LABEL_BASELINE: f64 = 24.0;
/// Gap between the band track and the axis; also the selector overhang.
pub const AXIS_SPACING: f64 = 4.0;
/// Extra downward offset of stalk bands.
pub const STALK_SPACING: f64 = 3.0;
/// Stalk bands are drawn at this fraction of the track height.
pub const STALK_HEIGHT_FACTOR: f64 = 0.8;
