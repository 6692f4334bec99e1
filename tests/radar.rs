use tbviz::config::VizConfig;
use tbviz::models::{Dataset, Entity, YearRange};
use tbviz::scene::{Role, Shape};
use tbviz::selection::{ALL, CheckboxSelection};
use tbviz::viz::radar::domain_max;
use tbviz::viz::build_radar;

fn sample() -> (Dataset, VizConfig) {
    let mut ds = Dataset::new();
    ds.upsert(Entity::new("A"), 2010, Some(10.0));
    ds.upsert(Entity::new("A"), 2011, Some(20.0));
    ds.upsert(Entity::new("B"), 2010, Some(5.0));
    ds.upsert(Entity::new("B"), 2011, Some(15.0));
    let cfg = VizConfig {
        years: YearRange::new(2010, 2011),
        ..VizConfig::default()
    };
    (ds, cfg)
}

#[test]
fn one_series_per_checked_country() {
    let (ds, cfg) = sample();
    let mut cb = CheckboxSelection::new();
    cb.set("B", true);
    let scene = build_radar(&ds, &cb.state(), cb.checked_values(), &cfg);

    assert_eq!(scene.series_entities(), ["B"]);
    assert_eq!(scene.marks_with_role(Role::Marker).count(), 2);
    // the domain follows the active countries only
    assert_eq!(domain_max(&ds, &["B"]), 15.0);
    assert_eq!(ds.max_value_of(["B"]), Some(15.0));
    assert_eq!(domain_max(&ds, &["A", "B"]), 20.0);
}

#[test]
fn all_box_matches_every_box_checked() {
    let (ds, cfg) = sample();
    let mut all = CheckboxSelection::new();
    all.set(ALL, true);
    let mut each = CheckboxSelection::new();
    each.set("A", true);
    each.set("B", true);

    let a = build_radar(&ds, &all.state(), all.checked_values(), &cfg);
    let b = build_radar(&ds, &each.state(), each.checked_values(), &cfg);
    assert_eq!(a.series_entities(), b.series_entities());
    assert_eq!(a.series_entities(), ["A", "B"]);
    let series = |s: &tbviz::Scene| -> Vec<Shape> {
        s.marks_with_role(Role::Series).map(|m| m.shape.clone()).collect()
    };
    assert_eq!(series(&a), series(&b));
}

#[test]
fn largest_value_touches_the_outer_circle() {
    let (ds, cfg) = sample();
    let scene = build_radar(&ds, &CheckboxSelection::new().state(), &[], &cfg);
    let outer = scene
        .marks_with_role(Role::Grid)
        .filter_map(|m| match m.shape {
            Shape::Circle { r, .. } => Some(r),
            _ => None,
        })
        .fold(0.0, f64::max);
    let center = (
        cfg.radar.width / 2.0 + cfg.radar.margin.left,
        cfg.radar.height / 2.0 + cfg.radar.margin.top,
    );
    let tip = scene
        .marks_with_role(Role::Marker)
        .find(|m| {
            m.entity.as_deref() == Some("A")
                && scene.tooltip(m.id).is_some_and(|t| t.lines[1] == "Year: 2011")
        })
        .unwrap();
    let Shape::Circle { center: c, .. } = tip.shape else {
        panic!("marker is a circle");
    };
    let dist = ((c.0 - center.0).powi(2) + (c.1 - center.1).powi(2)).sqrt();
    assert!((dist - outer).abs() < 1e-6, "{dist} vs {outer}");
    assert_eq!(
        scene.tooltip(tip.id).unwrap().lines[2],
        "Value: $20.0 Million (USD)"
    );
}
