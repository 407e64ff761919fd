pub mod config;
pub mod segment;

pub use config::{ConfigError, Mode, ViewConfig, Width};
pub use segment::{BandFeature, GenomeSegmentModel, ModelError, STALK_TYPE};
