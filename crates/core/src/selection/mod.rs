//! User-drawn selection ranges and the registry that shares them across views.

pub mod range;
pub mod registry;

pub use range::{BrushHandle, RefreshHook, SelectionRange, SelectorId, SelectorRef, SelectorSnapshot};
pub use registry::{SelectionRegistry, SelectorEvent};
