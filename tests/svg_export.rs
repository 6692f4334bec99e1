use tbviz::config::{TooltipConfig, VizConfig};
use tbviz::models::{Dataset, Entity, YearRange};
use tbviz::render::{save_scene, svg::to_svg_string};
use tbviz::selection::SelectionState;
use tbviz::viz::build_radar;

fn radar_scene() -> tbviz::Scene {
    let mut ds = Dataset::new();
    ds.upsert(Entity::new("Côte d'Ivoire"), 2010, Some(1234.56));
    ds.upsert(Entity::new("Peru & Co"), 2011, Some(7.0));
    let cfg = VizConfig {
        years: YearRange::new(2010, 2011),
        ..VizConfig::default()
    };
    build_radar(&ds, &SelectionState::AllEntities, &[], &cfg)
}

#[test]
fn markers_carry_their_tooltip_text() {
    let tooltip = TooltipConfig {
        fade_in_ms: 150,
        hide_after_ms: 700,
    };
    let svg = to_svg_string(&radar_scene(), &tooltip);
    assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert!(svg.contains(r#"class="dot interactive""#));
    assert!(svg.contains("&#10;Year: 2010&#10;Value: $1,234.6 Million (USD)\""));
    assert!(svg.contains("<title>Country: Peru &amp; Co"));
    assert!(svg.contains(r#"data-dx="5" data-dy="-28""#));
    assert!(svg.contains("transition: opacity 150ms"));
    assert!(svg.contains("}, 700);"));
    // grid and axes are not interactive
    assert!(svg.contains(r#"class="grid-circle" data-mark="0""#));
    assert!(svg.contains(r#"stroke-dasharray="2,2""#));
}

#[test]
fn output_format_follows_the_extension() {
    let dir = tempfile::tempdir().unwrap();
    let scene = radar_scene();
    let path = dir.path().join("radar.SVG");
    save_scene(&scene, &path, &TooltipConfig::default()).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("tbviz-tip"));

    let err = save_scene(&scene, dir.path().join("radar.pdf"), &TooltipConfig::default()).unwrap_err();
    assert!(err.to_string().contains("pdf"), "{err}");
}
