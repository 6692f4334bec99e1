//! Swatch legends drawn into a scene.

use super::text::truncate_to_width;
use crate::color::Rgb;
use crate::scene::{Anchor, Role, Scene, Shape, Style};

/// One legend row.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendItem {
    pub label: String,
    pub color: Rgb,
    /// Colored text instead of a swatch (for the "selected countries" list).
    pub text_only: bool,
}

impl LegendItem {
    pub fn swatch(label: impl Into<String>, color: Rgb) -> Self {
        Self {
            label: label.into(),
            color,
            text_only: false,
        }
    }

    pub fn colored_text(label: impl Into<String>, color: Rgb) -> Self {
        Self {
            label: label.into(),
            color,
            text_only: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendLayout {
    pub x: f64,
    pub y: f64,
    pub max_width: f64,
    pub font_px: f64,
    pub row_height: f64,
}

/// Draw a vertical legend with an optional heading. Returns the y below the last row.
pub fn draw_legend(scene: &mut Scene, heading: &str, items: &[LegendItem], layout: LegendLayout) -> f64 {
    let mut y = layout.y;
    if !heading.is_empty() {
        scene.text("legend-title", (layout.x, y), heading, layout.font_px + 2.0, Anchor::Start);
        y += layout.row_height * 1.3;
    }
    let swatch = layout.font_px;
    for item in items {
        let (text_x, room) = if item.text_only {
            (layout.x, layout.max_width)
        } else {
            scene.push(
                Role::Legend,
                "legend-swatch",
                Shape::Rect {
                    x: layout.x,
                    y: y - swatch * 0.85,
                    w: swatch,
                    h: swatch,
                },
                Style::fill(item.color),
            );
            (layout.x + swatch + 6.0, layout.max_width - swatch - 6.0)
        };
        let label = truncate_to_width(&item.label, layout.font_px, room);
        let id = scene.text("legend-label", (text_x, y), label, layout.font_px, Anchor::Start);
        if item.text_only
            && let Some(m) = scene.mark_mut(id)
        {
            m.style = Style::fill(item.color);
        }
        y += layout.row_height;
    }
    y
}
