pub mod mapper;
pub mod model;
pub mod selection;
pub mod source;
pub mod svg;
pub mod view;
pub mod views;

pub use mapper::{CoordinateMapper, MapperError, ScalingMode};
pub use model::{BandFeature, GenomeSegmentModel, Mode, ViewConfig, Width};
pub use selection::{SelectionRange, SelectionRegistry, SelectorEvent, SelectorRef, SelectorSnapshot};
pub use view::{ChromosomeView, LoadTicket, ViewError, ViewState};
