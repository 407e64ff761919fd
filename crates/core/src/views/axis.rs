use chromovis_protocol::{Point, RenderCommand, SharedStr, TextAlign, ThemeToken};

use crate::mapper::CoordinateMapper;

const TICK_HEIGHT: f64 = 6.0;
const FONT_SIZE: f64 = 10.0;
const LABEL_OFFSET_Y: f64 = 18.0;
const MIN_TICK_SPACING_PX: f64 = 80.0;

/// Render a bottom-oriented base-pair axis below the band track.
///
/// `offset_y` is where the axis line sits; ticks hang below it with SI
/// labels (`50M`, `1.5k`).
pub fn render_bp_axis(mapper: &CoordinateMapper, offset_y: f64) -> Vec<RenderCommand> {
    let (start, stop) = mapper.domain();
    let width = mapper.range_max();
    if stop <= start || width <= 0.0 {
        return Vec::new();
    }

    let step = nice_step(stop - start, width);
    let mut commands = Vec::with_capacity(32);

    commands.push(RenderCommand::BeginGroup {
        id: "bp-axis".into(),
        class: Some("bp-axis".into()),
    });
    commands.push(RenderCommand::PushTransform {
        translate: Point::new(0.0, offset_y),
    });

    commands.push(RenderCommand::DrawLine {
        from: Point::new(0.0, 0.0),
        to: Point::new(width, 0.0),
        color: ThemeToken::AxisLine,
        width: 1.0,
    });

    for bp in ticks(start, stop, step) {
        let x = mapper.to_pixel(bp);
        commands.push(RenderCommand::DrawLine {
            from: Point::new(x, 0.0),
            to: Point::new(x, TICK_HEIGHT),
            color: ThemeToken::AxisLine,
            width: 1.0,
        });
        commands.push(RenderCommand::DrawText {
            position: Point::new(x, LABEL_OFFSET_Y),
            text: SharedStr::from(format_si(bp)),
            color: ThemeToken::AxisText,
            font_size: FONT_SIZE,
            align: TextAlign::Center,
            class: None,
        });
    }

    commands.push(RenderCommand::PopTransform);
    commands.push(RenderCommand::EndGroup);
    commands
}

/// Tick positions: multiples of `step` inside `[start, stop]`.
fn ticks(start: f64, stop: f64, step: f64) -> impl Iterator<Item = f64> {
    let first = (start / step).ceil() as i64;
    let last = (stop / step).floor() as i64;
    (first..=last).map(move |i| i as f64 * step)
}

/// A 1-2-5 step giving roughly one tick per [`MIN_TICK_SPACING_PX`].
fn nice_step(span_bp: f64, width_px: f64) -> f64 {
    let target_count = (width_px / MIN_TICK_SPACING_PX).max(2.0);
    let raw = span_bp / target_count;
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let factor = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    factor * magnitude
}

/// SI-prefixed label with trailing zeros trimmed.
fn format_si(value: f64) -> String {
    const PREFIXES: [(f64, &str); 3] = [(1e9, "G"), (1e6, "M"), (1e3, "k")];

    let abs = value.abs();
    for (scale, suffix) in PREFIXES {
        if abs >= scale {
            return format!("{}{suffix}", trim_number(value / scale));
        }
    }
    trim_number(value)
}

fn trim_number(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}
