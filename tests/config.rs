use tbviz::config::{DomainPolicy, VizConfig};
use tbviz::models::YearRange;

#[test]
fn config_file_overrides_only_what_it_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tbviz.json");
    std::fs::write(
        &path,
        r#"{
            "years": { "start": 2012, "end": 2015 },
            "dual": { "domain": "global" },
            "tooltip": { "hide_after_ms": 0 },
            "data": { "sales": "https://example.org/sales.csv" }
        }"#,
    )
    .unwrap();

    let cfg = VizConfig::load(&path).unwrap();
    assert_eq!(cfg.years, YearRange::new(2012, 2015));
    assert_eq!(cfg.dual.domain, DomainPolicy::Global);
    assert_eq!(cfg.tooltip.hide_after_ms, 0);
    assert_eq!(cfg.tooltip.fade_in_ms, 200);
    assert_eq!(cfg.data.sales, "https://example.org/sales.csv");
    assert_eq!(cfg.data.incidence, VizConfig::default().data.incidence);
    assert_eq!(cfg.radar, VizConfig::default().radar);
}

#[test]
fn no_path_means_defaults() {
    let cfg = VizConfig::load_or_default(None::<&str>).unwrap();
    assert_eq!(cfg, VizConfig::default());
}

#[test]
fn broken_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{ years: ").unwrap();
    assert!(VizConfig::load(&path).is_err());
    assert!(VizConfig::load(dir.path().join("absent.json")).is_err());
}
