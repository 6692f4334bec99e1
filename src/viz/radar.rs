//! Radar chart: one radial path per selected country, one spoke per year.

use super::legend::{LegendItem, LegendLayout, draw_legend};
use super::util::format_fixed;
use crate::color::{Rgb, category_color};
use crate::config::VizConfig;
use crate::models::Dataset;
use crate::scale::PolarGrid;
use crate::scene::{Anchor, Role, Scene, Shape, Style, TooltipContent};
use crate::selection::{ALL, SelectionState};

/// Width reserved right of the chart for the list of checked countries.
pub const LEGEND_WIDTH: f64 = 200.0;

/// Upper end of the radial domain: the largest value of the active entities,
/// 0 when none of them has a value.
pub fn domain_max(dataset: &Dataset, active: &[&str]) -> f64 {
    dataset.max_value_of(active.iter().copied()).unwrap_or(0.0)
}

/// Build the radar scene for the active entities.
///
/// `checked` are the literal checkbox values (including `All`) listed in the
/// legend. Missing values are drawn at the center. The radial domain is
/// `[0, max]` over the active entities only.
pub fn build_radar(
    dataset: &Dataset,
    selection: &SelectionState,
    checked: &[String],
    cfg: &VizConfig,
) -> Scene {
    let rc = &cfg.radar;
    let years = cfg.years.years();
    let outer_w = rc.width + rc.margin.left + rc.margin.right;
    let outer_h = rc.height + rc.margin.top + rc.margin.bottom;
    let center = (
        rc.width / 2.0 + rc.margin.left,
        rc.height / 2.0 + rc.margin.top,
    );
    let grid = PolarGrid {
        keys: years.len(),
        radius: rc.width.min(rc.height) / 2.0,
    };
    let at = |i: usize, r: f64| {
        let (dx, dy) = grid.point(i, r);
        (center.0 + dx, center.1 + dy)
    };

    let mut scene = Scene::new(
        outer_w + LEGEND_WIDTH,
        outer_h,
        "Sales of anti-bacterial drugs",
    );

    for level in 0..rc.levels {
        let r = grid.radius / rc.levels as f64 * (level + 1) as f64;
        scene.push(
            Role::Grid,
            "grid-circle",
            Shape::Circle { center, r },
            Style::stroke(Rgb::GRID, 1.0).dashed(2.0, 2.0),
        );
    }
    for (i, year) in years.iter().enumerate() {
        scene.push(
            Role::Axis,
            "axis",
            Shape::Line {
                from: center,
                to: at(i, grid.radius),
            },
            Style::stroke(Rgb::GRID, 2.0),
        );
        let (lx, ly) = at(i, grid.radius + 10.0);
        // Vertically center the label on its anchor point.
        scene.text(
            "axis-label",
            (lx, ly + 0.35 * 12.0),
            year.to_string(),
            12.0,
            Anchor::Middle,
        );
    }

    let names = dataset.names();
    let active = selection.resolve(&names);
    let max_value = domain_max(dataset, &active);
    log::debug!("radar: {} active entities, max {max_value}", active.len());

    for name in &active {
        let Some(series) = dataset.entity(name) else {
            continue;
        };
        let color = category_color(dataset.position(name).unwrap_or(0));
        let points: Vec<(i32, f64)> = series
            .points(&years)
            .iter()
            .map(|p| (p.year, p.value_or_zero()))
            .collect();
        let outline: Vec<(f64, f64)> = points
            .iter()
            .enumerate()
            .map(|(i, (_, v))| at(i, grid.radius_of(*v, max_value)))
            .collect();
        scene.push_for(
            name,
            Role::Series,
            "line",
            Shape::Path {
                points: outline.clone(),
                closed: false,
            },
            Style::stroke(color, 2.0).with_fill(color, rc.fill_opacity),
        );
        for ((year, value), pos) in points.iter().zip(outline) {
            let id = scene.push_for(
                name,
                Role::Marker,
                "dot",
                Shape::Circle {
                    center: pos,
                    r: rc.dot_radius,
                },
                Style::fill(color),
            );
            scene.attach_tooltip(
                id,
                TooltipContent {
                    lines: vec![
                        format!("Country: {name}"),
                        format!("Year: {year}"),
                        format!(
                            "Value: ${} Million (USD)",
                            format_fixed(*value, 1, &cfg.locale)
                        ),
                    ],
                    offset: (5, -28),
                },
            );
        }
    }

    let items: Vec<LegendItem> = checked
        .iter()
        .map(|v| {
            let color = match dataset.position(v) {
                Some(i) if v != ALL => category_color(i),
                _ => Rgb::BLACK,
            };
            LegendItem::colored_text(v.as_str(), color)
        })
        .collect();
    draw_legend(
        &mut scene,
        "Selected countries",
        &items,
        LegendLayout {
            x: outer_w + 10.0,
            y: rc.margin.top,
            max_width: LEGEND_WIDTH - 20.0,
            font_px: 13.0,
            row_height: 18.0,
        },
    );
    scene
}
