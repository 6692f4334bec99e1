//! Choropleth world map colored by TB incidence for one year.

use super::legend::{LegendItem, LegendLayout, draw_legend};
use super::util::format_plain;
use crate::color::{Rgb, parse_or};
use crate::config::{MapConfig, VizConfig};
use crate::geo::{ChoroplethData, LonLat};
use crate::scale::{Mercator, ThresholdScale};
use crate::scene::{Anchor, Highlight, Point, Role, Scene, Shape, Style, TooltipContent};

/// Threshold scale from the map settings. Unparseable colors fall back to the no-data gray.
pub fn threshold_scale(cfg: &MapConfig) -> ThresholdScale {
    let no_data = parse_or(&cfg.no_data_color, Rgb::GRID);
    let colors = cfg.colors.iter().map(|c| parse_or(c, no_data)).collect();
    ThresholdScale::new(cfg.breakpoints.clone(), colors, no_data)
}

pub fn projection(cfg: &MapConfig) -> Mercator {
    Mercator {
        scale: cfg.scale,
        translate: (cfg.width / 2.0, cfg.height / 2.0 + cfg.offset_y),
    }
}

/// Project a ring, keeping consecutive longitudes within 180° of each other so
/// rings crossing the antimeridian do not smear across the whole canvas.
fn project_ring(m: &Mercator, ring: &[LonLat]) -> Vec<Point> {
    let mut out = Vec::with_capacity(ring.len());
    let mut prev: Option<f64> = None;
    for &(lon, lat) in ring {
        let mut lon = lon;
        if let Some(p) = prev {
            while lon - p > 180.0 {
                lon -= 360.0;
            }
            while p - lon > 180.0 {
                lon += 360.0;
            }
        }
        prev = Some(lon);
        out.push(m.project((lon, lat)));
    }
    out
}

fn incidence_line(value: Option<f64>, locale: &str) -> String {
    // Zero reads as missing, the same as in the fill color.
    match value.filter(|v| *v != 0.0) {
        Some(v) => format!("Incidence: {} per 100,000 people", format_plain(v, locale)),
        None => "Incidence: No data per 100,000 people".to_string(),
    }
}

/// Build the map for `year`. Regions without a value are drawn in the no-data color.
pub fn build_choropleth(data: &ChoroplethData, year: i32, cfg: &VizConfig) -> Scene {
    let mc = &cfg.map;
    let scale = threshold_scale(mc);
    let mercator = projection(mc);
    let mut scene = Scene::new(mc.width, mc.height, format!("TB incidence {year}"));
    scene.highlight = Some(Highlight {
        stroke: Rgb::BLACK,
        stroke_width: 2.0,
    });

    scene.push(
        Role::Background,
        "sea",
        Shape::Rect {
            x: 0.0,
            y: 0.0,
            w: mc.width,
            h: mc.height,
        },
        Style::fill(parse_or(&mc.sea_color, Rgb::WHITE)),
    );

    let mut no_data = 0usize;
    for region in &data.regions {
        let value = data.value(region, year);
        let fill = scale.color(value);
        if fill == scale.no_data() {
            no_data += 1;
        }
        let rings: Vec<Vec<Point>> = region
            .polygons
            .iter()
            .flatten()
            .map(|r| project_ring(&mercator, r))
            .filter(|r| r.len() >= 3)
            .collect();
        if rings.is_empty() {
            continue;
        }
        let id = scene.push_for(
            &region.code,
            Role::Series,
            "country",
            Shape::Rings(rings),
            Style::stroke(Rgb::BLACK, mc.stroke_width).with_fill(fill, 1.0),
        );
        scene.attach_tooltip(
            id,
            TooltipContent {
                lines: vec![
                    format!("Country: {}", region.name),
                    incidence_line(value, &cfg.locale),
                ],
                offset: (10, 10),
            },
        );
    }
    log::debug!(
        "map {year}: {} regions, {no_data} without data",
        data.regions.len()
    );

    // Band 0 only holds values below the first breakpoint; with a ramp starting
    // at zero those are never drawn.
    let first = mc.breakpoints.first().copied().unwrap_or(0.0);
    let skip = usize::from(first <= 0.0);
    let mut items: Vec<LegendItem> = scale
        .colors()
        .iter()
        .enumerate()
        .skip(skip)
        .map(|(i, c)| {
            let label = match scale.band_floor(i) {
                Some(floor) => format!("≥ {}", format_plain(floor, &cfg.locale)),
                None => format!("< {}", format_plain(first, &cfg.locale)),
            };
            LegendItem::swatch(label, *c)
        })
        .collect();
    items.push(LegendItem::swatch("No data", scale.no_data()));
    let row_height = 18.0;
    draw_legend(
        &mut scene,
        "Per 100,000 people",
        &items,
        LegendLayout {
            x: 20.0,
            y: mc.height - 20.0 - row_height * (items.len() as f64 + 1.3),
            max_width: 160.0,
            font_px: 12.0,
            row_height,
        },
    );
    scene.text(
        "title",
        (mc.width / 2.0, 30.0),
        format!("Tuberculosis incidence, {year}"),
        20.0,
        Anchor::Middle,
    );
    scene
}
