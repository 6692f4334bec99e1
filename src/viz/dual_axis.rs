//! Dual-axis time series: TB incidence (left axis) against drug sales (right
//! axis) for one country.

use super::legend::{LegendItem, LegendLayout, draw_legend};
use super::util::{format_fixed, format_plain, tick_label, tick_step};
use crate::color::{Rgb, parse_or};
use crate::config::{DomainPolicy, VizConfig};
use crate::error::{Result, VizError};
use crate::models::{MergedRecord, SeriesPoint};
use crate::scale::{LinearScale, TimeScale};
use crate::scene::{Anchor, Point, Role, Scene, Shape, Style, TooltipContent};

/// `[0, max]` upper bounds of the incidence and sales axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueDomains {
    pub incidence: f64,
    pub sales: f64,
}

/// Compute the axis domains for `active` under the given policy.
pub fn value_domains(records: &[MergedRecord], active: &MergedRecord, policy: DomainPolicy) -> ValueDomains {
    match policy {
        DomainPolicy::Active => ValueDomains {
            incidence: active.max_incidence().unwrap_or(0.0).max(0.0),
            sales: active.max_sales().unwrap_or(0.0).max(0.0),
        },
        DomainPolicy::Global => ValueDomains {
            incidence: max_of(records.iter().map(MergedRecord::max_incidence)),
            sales: max_of(records.iter().map(MergedRecord::max_sales)),
        },
    }
}

fn max_of(values: impl Iterator<Item = Option<f64>>) -> f64 {
    values.flatten().fold(0.0, f64::max)
}

struct Measure<'a> {
    class: &'static str,
    color: Rgb,
    points: &'a [SeriesPoint],
    scale: LinearScale,
    label: fn(f64, &str) -> String,
}

fn incidence_tip(v: f64, locale: &str) -> String {
    format!("TB Cases: {}", format_plain(v, locale))
}

fn sales_tip(v: f64, locale: &str) -> String {
    format!("Sales: ${} Million", format_fixed(v, 1, locale))
}

/// Build the chart for the record named `selected`.
///
/// Fails with [`VizError::UnknownOption`] when no merged record has that name.
pub fn build_dual_axis(records: &[MergedRecord], selected: &str, cfg: &VizConfig) -> Result<Scene> {
    let active = records
        .iter()
        .find(|r| r.name() == selected)
        .ok_or_else(|| VizError::UnknownOption(selected.to_string()))?;
    let dc = &cfg.dual;
    let m = dc.margin;
    let (w, h) = (dc.width - m.left - m.right, dc.height - m.top - m.bottom);
    let origin = |x: f64, y: f64| -> Point { (m.left + x, m.top + y) };

    let domains = value_domains(records, active, dc.domain);
    let x = TimeScale::years(cfg.years.start, cfg.years.end, (0.0, w));
    let y_tb = LinearScale::new((0.0, domains.incidence), (h, 0.0));
    let y_sales = LinearScale::new((0.0, domains.sales), (h, 0.0));
    log::debug!(
        "dual axis {selected}: incidence max {}, sales max {}",
        domains.incidence,
        domains.sales
    );

    let mut scene = Scene::new(dc.width, dc.height, format!("TB incidence and drug sales: {selected}"));
    let axis = Style::stroke(Rgb::BLACK, 1.0);

    // x axis
    scene.push(Role::Axis, "x-axis", Shape::Line { from: origin(0.0, h), to: origin(w, h) }, axis.clone());
    for year in cfg.years.years() {
        let px = x.map(year);
        scene.push(Role::Axis, "tick", Shape::Line { from: origin(px, h), to: origin(px, h + 6.0) }, axis.clone());
        scene.text("tick-label", origin(px, h + 20.0), year.to_string(), 10.0, Anchor::Middle);
    }

    // y axes, left then right
    for (scale, at_x, dir, anchor) in [(y_tb, 0.0, -1.0, Anchor::End), (y_sales, w, 1.0, Anchor::Start)] {
        scene.push(Role::Axis, "y-axis", Shape::Line { from: origin(at_x, 0.0), to: origin(at_x, h) }, axis.clone());
        let ticks = scale.ticks(10);
        let step = tick_step(&ticks);
        for t in ticks {
            let py = scale.map(t);
            scene.push(
                Role::Axis,
                "tick",
                Shape::Line { from: origin(at_x, py), to: origin(at_x + dir * 6.0, py) },
                axis.clone(),
            );
            scene.text(
                "tick-label",
                origin(at_x + dir * 9.0, py + 3.5),
                tick_label(t, step, &cfg.locale),
                10.0,
                anchor,
            );
        }
    }

    scene.text("axis-title", origin(w / 2.0, h + 40.0), "Year", 12.0, Anchor::Middle);
    for (x_off, text) in [
        (-50.0, "TB Cases"),
        (-30.0, "(Per 100,000 Population)"),
        (w + 60.0, "Sales of Anti-Bacterial Drugs"),
        (w + 80.0, "($ Million USD)"),
    ] {
        scene.push(
            Role::Label,
            "axis-title",
            Shape::Text {
                at: origin(x_off, h / 2.0),
                text: text.to_string(),
                size: 12.0,
                anchor: Anchor::Middle,
                rotate: -90.0,
            },
            Style::fill(Rgb::BLACK),
        );
    }

    let measures = [
        Measure {
            class: "TB",
            color: parse_or(&dc.incidence_color, Rgb::new(70, 130, 180)),
            points: &active.incidence,
            scale: y_tb,
            label: incidence_tip,
        },
        Measure {
            class: "Sales",
            color: parse_or(&dc.sales_color, Rgb::new(255, 0, 0)),
            points: &active.sales,
            scale: y_sales,
            label: sales_tip,
        },
    ];
    for measure in &measures {
        let placed: Vec<(i32, f64, Point)> = measure
            .points
            .iter()
            .filter(|p| cfg.years.contains(p.year))
            .map(|p| {
                let v = p.value_or_zero();
                (p.year, v, origin(x.map(p.year), measure.scale.map(v)))
            })
            .collect();
        scene.push_for(
            selected,
            Role::Series,
            &format!("line{}", measure.class),
            Shape::Path {
                points: placed.iter().map(|(_, _, p)| *p).collect(),
                closed: false,
            },
            Style::stroke(measure.color, dc.line_width),
        );
        for (year, v, at) in placed {
            let id = scene.push_for(
                selected,
                Role::Marker,
                &format!("dot{}", measure.class),
                Shape::Circle { center: at, r: dc.dot_radius },
                Style::fill(measure.color),
            );
            scene.attach_tooltip(
                id,
                TooltipContent {
                    lines: vec![
                        selected.to_string(),
                        format!("Year: {year}"),
                        (measure.label)(v, &cfg.locale),
                    ],
                    offset: (5, -28),
                },
            );
        }
    }

    draw_legend(
        &mut scene,
        "",
        &[
            LegendItem::swatch("TB Cases", measures[0].color),
            LegendItem::swatch("Sales", measures[1].color),
        ],
        LegendLayout {
            x: m.left + 10.0,
            y: m.top + 10.0,
            max_width: 150.0,
            font_px: 11.0,
            row_height: 16.0,
        },
    );
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Entity;

    fn record(name: &str, tb: &[(i32, Option<f64>)], sales: &[(i32, Option<f64>)]) -> MergedRecord {
        let pts = |v: &[(i32, Option<f64>)]| -> Vec<SeriesPoint> {
            v.iter().map(|(y, v)| SeriesPoint::new(*y, *v)).collect()
        };
        MergedRecord {
            entity: Entity::new(name),
            incidence: pts(tb),
            sales: pts(sales),
        }
    }

    #[test]
    fn domains_follow_policy() {
        let a = record("A", &[(2010, Some(10.0))], &[(2010, Some(3.0))]);
        let b = record("B", &[(2010, Some(40.0))], &[(2010, None)]);
        let all = vec![a.clone(), b];
        let active = value_domains(&all, &a, DomainPolicy::Active);
        assert_eq!(active, ValueDomains { incidence: 10.0, sales: 3.0 });
        let global = value_domains(&all, &a, DomainPolicy::Global);
        assert_eq!(global, ValueDomains { incidence: 40.0, sales: 3.0 });
    }

    #[test]
    fn sales_tooltip_has_one_decimal() {
        assert_eq!(sales_tip(12.345, "en"), "Sales: $12.3 Million");
        assert_eq!(incidence_tip(7.0, "en"), "TB Cases: 7");
    }
}
