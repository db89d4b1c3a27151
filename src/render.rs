use crate::fonts::TextMeasure;
use crate::links::LinkKind;
use crate::model::Gender;
use crate::theme::Palette;
use crate::view::TreeView;
use crate::xml::escape_xml;

const LABEL_FONT_SIZE: f32 = 12.0;
const CAPTION_FONT_SIZE: f32 = 16.0;
const LINK_WIDTH: f32 = 1.5;
const HIGHLIGHT_WIDTH: f32 = 3.0;
const ARCH_RISE: f32 = 26.0;
const ELLIPSIS: &str = "…";

/// Render the laid-out scene to inner SVG content plus its total size.
/// Callers wrap the result in an `<svg>` envelope with the palette background.
pub fn render_tree(
    view: &TreeView,
    palette: &Palette,
    measure: &mut dyn TextMeasure,
) -> (String, f32, f32) {
    let radius = view.config().node_radius;
    let pad = radius * 3.0;
    let highlight = view.highlight();
    let people = view.people();

    let Some(bounds) = view.bounds() else {
        return (String::new(), pad * 2.0, pad * 2.0);
    };

    let offset_x = pad - bounds.min_x;
    // Extra headroom above the top row for arches.
    let offset_y = pad + ARCH_RISE - bounds.min_y;
    let caption_height = if highlight.label.is_some() {
        CAPTION_FONT_SIZE * 2.5
    } else {
        0.0
    };
    let width = bounds.width() + pad * 2.0;
    let height = bounds.height() + pad * 2.0 + ARCH_RISE + caption_height;

    let text_color = palette.readable_text_color();
    let mut svg = String::new();

    // Connectors underneath the nodes.
    for link in view.links() {
        let emphasized = highlight
            .edges
            .iter()
            .any(|(a, b)| link.connects(a, b));
        let stroke = if emphasized {
            &palette.accent_color
        } else {
            &palette.link_color
        };
        let stroke_width = if emphasized {
            HIGHLIGHT_WIDTH
        } else {
            LINK_WIDTH
        };
        let (fx, fy) = (link.from.0 + offset_x, link.from.1 + offset_y);
        let (tx, ty) = (link.to.0 + offset_x, link.to.1 + offset_y);

        match link.kind {
            LinkKind::ChildDrop => {
                let mid_y = (fy + ty) / 2.0;
                svg.push_str(&format!(
                    r#"<path d="M {:.2} {:.2} C {:.2} {:.2}, {:.2} {:.2}, {:.2} {:.2}" fill="none" stroke="{}" stroke-width="{:.2}" />"#,
                    fx, fy, fx, mid_y, tx, mid_y, tx, ty, stroke, stroke_width,
                ));
            }
            LinkKind::SpouseArch => {
                let peak_y = fy.min(ty) - ARCH_RISE;
                svg.push_str(&format!(
                    r#"<path d="M {:.2} {:.2} Q {:.2} {:.2} {:.2} {:.2}" fill="none" stroke="{}" stroke-width="{:.2}" />"#,
                    fx,
                    fy,
                    (fx + tx) / 2.0,
                    peak_y,
                    tx,
                    ty,
                    stroke,
                    stroke_width,
                ));
            }
            LinkKind::SpouseBar | LinkKind::UnionBar => {
                let dash = if link.kind == LinkKind::UnionBar {
                    r#" stroke-dasharray="4 3""#
                } else {
                    ""
                };
                svg.push_str(&format!(
                    r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{:.2}"{} />"#,
                    fx, fy, tx, ty, stroke, stroke_width, dash,
                ));
            }
        }
    }

    let primary = match view.selection() {
        crate::kinship::Selection::Single(id) => Some(id.as_str()),
        crate::kinship::Selection::PathDisplayed { primary, .. } => Some(primary.as_str()),
        crate::kinship::Selection::Idle => None,
    };

    for person in &people {
        let (cx, cy) = (person.x + offset_x, person.y + offset_y);
        let on_path = highlight.people.iter().any(|id| id == &person.id);
        let stroke = if on_path {
            &palette.accent_color
        } else {
            match person.gender {
                Gender::Male => &palette.male_stroke_color,
                Gender::Female => &palette.female_stroke_color,
                Gender::Unknown => &palette.node_stroke_color,
            }
        };
        let stroke_width = if on_path { HIGHLIGHT_WIDTH } else { 2.0 };

        svg.push_str(&format!(
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" stroke="{}" stroke-width="{:.2}" />"#,
            cx, cy, radius, palette.node_fill_color, stroke, stroke_width,
        ));
        if primary == Some(person.id.as_str()) {
            svg.push_str(&format!(
                r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="none" stroke="{}" stroke-width="1.5" />"#,
                cx,
                cy,
                radius + 4.0,
                palette.accent_color,
            ));
        }

        let label = ellipsize(&person.name, radius * 3.0, measure);
        let (label_width, _) = measure.measure_text(&label, LABEL_FONT_SIZE, false);
        svg.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="{:.2}" fill="{}">{}</text>"#,
            cx - label_width / 2.0,
            cy + radius + LABEL_FONT_SIZE + 2.0,
            LABEL_FONT_SIZE,
            text_color,
            escape_xml(&label),
        ));
    }

    if let Some(label) = &highlight.label {
        let (label_width, _) = measure.measure_text(label, CAPTION_FONT_SIZE, true);
        svg.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="{:.2}" font-weight="700" fill="{}">{}</text>"#,
            (width - label_width) / 2.0,
            height - CAPTION_FONT_SIZE,
            CAPTION_FONT_SIZE,
            palette.caption_color,
            escape_xml(label),
        ));
    }

    (svg, width, height)
}

/// Trim a name to the given pixel budget, appending an ellipsis when cut.
fn ellipsize(name: &str, max_width: f32, measure: &mut dyn TextMeasure) -> String {
    let (full_width, _) = measure.measure_text(name, LABEL_FONT_SIZE, false);
    if full_width <= max_width {
        return name.to_string();
    }

    let mut trimmed: String = name.to_string();
    while !trimmed.is_empty() {
        trimmed.pop();
        let candidate = format!("{}{}", trimmed.trim_end(), ELLIPSIS);
        let (candidate_width, _) = measure.measure_text(&candidate, LABEL_FONT_SIZE, false);
        if candidate_width <= max_width {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

/// Wrap inner content in a standalone SVG document with the palette background.
pub fn wrap_svg(inner: &str, width: f32, height: f32, palette: &Palette) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {:.2} {:.2}" width="{:.2}" height="{:.2}"><rect width="100%" height="100%" fill="{}" />{}</svg>"#,
        width, height, width, height, palette.background_color, inner,
    )
}
