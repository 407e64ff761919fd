use serde::{Deserialize, Serialize};

use crate::shared_str::SharedStr;
use crate::theme::ThemeToken;
use crate::types::{HitTarget, Point, Rect};

/// A single, stateless render instruction.
///
/// A chromosome view emits a `Vec<RenderCommand>` per render pass. Backends
/// consume the list in order; each command carries everything it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Draw a filled rectangle with an optional tooltip, style class, and
    /// hit target for pointer routing.
    DrawRect {
        rect: Rect,
        color: ThemeToken,
        border_color: Option<ThemeToken>,
        tooltip: Option<SharedStr>,
        class: Option<SharedStr>,
        hit: Option<HitTarget>,
    },

    /// Draw a text string at a position.
    DrawText {
        position: Point,
        text: SharedStr,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
        class: Option<SharedStr>,
    },

    /// Draw a line segment.
    DrawLine {
        from: Point,
        to: Point,
        color: ThemeToken,
        width: f64,
    },

    /// Translate all subsequent commands until the matching `PopTransform`.
    PushTransform { translate: Point },

    /// Pop the most recent transform.
    PopTransform,

    /// Begin a logical group (the axis, one selector). Backends may map
    /// this to a layer or a `<g>` element.
    BeginGroup {
        id: SharedStr,
        class: Option<SharedStr>,
    },

    /// End the current group.
    EndGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}
