//! SVG renderer: converts `RenderCommand` lists into standalone SVG strings.

use std::fmt::Write;

use chromovis_protocol::{RenderCommand, TextAlign, ThemeToken};

/// Render a list of commands as an SVG document string.
///
/// `width` and `height` define the SVG viewBox dimensions. Groups become
/// `<g>` elements and transforms nest as translated `<g>` elements.
pub fn render_svg(commands: &[RenderCommand], width: f64, height: f64) -> String {
    let mut svg = String::with_capacity(commands.len() * 160);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:system-ui,-apple-system,sans-serif;font-size:11px">"#,
    );
    let _ = write!(
        svg,
        r#"<rect width="{width}" height="{height}" fill="{}"/>"#,
        resolve_color(ThemeToken::Background),
    );

    let mut open = 0usize;
    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                color,
                border_color,
                tooltip,
                class,
                ..
            } => {
                let _ = write!(
                    svg,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}""#,
                    rect.x,
                    rect.y,
                    rect.w,
                    rect.h,
                    resolve_color(*color),
                );
                if let Some(border) = border_color {
                    let _ = write!(svg, r#" stroke="{}""#, resolve_color(*border));
                }
                push_class(&mut svg, class.as_deref());
                match tooltip {
                    Some(tip) => {
                        let _ = write!(svg, "><title>{}</title></rect>", escape_xml(tip));
                    }
                    None => svg.push_str("/>"),
                }
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width: line_width,
            } => {
                let _ = write!(
                    svg,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{line_width}"/>"#,
                    from.x,
                    from.y,
                    to.x,
                    to.y,
                    resolve_color(*color),
                );
            }
            RenderCommand::DrawText {
                text,
                position,
                color,
                font_size,
                align,
                class,
            } => {
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                let _ = write!(
                    svg,
                    r#"<text x="{}" y="{}" fill="{}" font-size="{font_size}" text-anchor="{anchor}""#,
                    position.x,
                    position.y,
                    resolve_color(*color),
                );
                push_class(&mut svg, class.as_deref());
                let _ = write!(svg, ">{}</text>", escape_xml(text));
            }
            RenderCommand::PushTransform { translate } => {
                let _ = write!(
                    svg,
                    r#"<g transform="translate({},{})">"#,
                    translate.x, translate.y
                );
                open += 1;
            }
            RenderCommand::BeginGroup { id, class } => {
                let _ = write!(svg, r#"<g id="{}""#, escape_xml(id));
                push_class(&mut svg, class.as_deref());
                svg.push('>');
                open += 1;
            }
            RenderCommand::PopTransform | RenderCommand::EndGroup => {
                if open > 0 {
                    svg.push_str("</g>");
                    open -= 1;
                }
            }
        }
    }

    // Unbalanced command lists still produce well-formed output.
    for _ in 0..open {
        svg.push_str("</g>");
    }
    svg.push_str("</svg>");
    svg
}

fn push_class(svg: &mut String, class: Option<&str>) {
    if let Some(class) = class {
        let _ = write!(svg, r#" class="{}""#, escape_xml(class));
    }
}

fn resolve_color(token: ThemeToken) -> &'static str {
    match token {
        ThemeToken::BandGneg => "#ffffff",
        ThemeToken::BandGpos25 => "#c8c8c8",
        ThemeToken::BandGpos50 => "#969696",
        ThemeToken::BandGpos75 => "#646464",
        ThemeToken::BandGpos100 => "#000000",
        ThemeToken::BandAcen => "#a0522d",
        ThemeToken::BandGvar => "#dcdcdc",
        ThemeToken::BandStalk => "#708090",
        ThemeToken::BandOther => "#bbbbbb",
        ThemeToken::AxisLine => "#333333",
        ThemeToken::AxisText | ThemeToken::LabelText => "#1a1a2e",
        ThemeToken::SelectorFill => "rgba(70,130,180,0.3)",
        ThemeToken::SelectorBorder => "#4682b4",
        ThemeToken::SelectorHandle => "rgba(70,130,180,0.6)",
        ThemeToken::Background => "#ffffff",
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromovis_protocol::{HitTarget, Point, Rect};

    #[test]
    fn basic_svg_output() {
        let commands = vec![RenderCommand::DrawRect {
            rect: Rect::new(10.0, 30.0, 100.0, 20.0),
            color: ThemeToken::BandGpos100,
            border_color: None,
            tooltip: Some("q21.1".into()),
            class: Some("band gpos100".into()),
            hit: Some(HitTarget::Band(0)),
        }];
        let svg = render_svg(&commands, 800.0, 80.0);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r#"class="band gpos100""#));
        assert!(svg.contains("<title>q21.1</title>"));
        assert!(svg.contains("#000000"));
    }

    #[test]
    fn groups_and_transforms_nest() {
        let commands = vec![
            RenderCommand::BeginGroup {
                id: "chr1svg".into(),
                class: None,
            },
            RenderCommand::PushTransform {
                translate: Point::new(0.0, 26.0),
            },
            RenderCommand::PopTransform,
            RenderCommand::EndGroup,
        ];
        let svg = render_svg(&commands, 100.0, 80.0);
        assert!(svg.contains(r#"<g id="chr1svg"><g transform="translate(0,26)"></g></g>"#));
    }

    #[test]
    fn unbalanced_groups_are_closed() {
        let commands = vec![RenderCommand::BeginGroup {
            id: "a".into(),
            class: None,
        }];
        let svg = render_svg(&commands, 10.0, 10.0);
        assert!(svg.ends_with("</g></svg>"));
    }

    #[test]
    fn escapes_xml_entities() {
        let commands = vec![RenderCommand::DrawText {
            position: Point::new(0.0, 24.0),
            text: "p<1>&q".into(),
            color: ThemeToken::LabelText,
            font_size: 11.0,
            align: TextAlign::Left,
            class: None,
        }];
        let svg = render_svg(&commands, 400.0, 100.0);
        assert!(svg.contains("p&lt;1&gt;&amp;q"));
    }
}
