use std::fs;
use tbviz::loader::merge;
use tbviz::models::{Dataset, Entity};
use tbviz::storage::{self, ExportRow};

fn sample() -> Dataset {
    let mut ds = Dataset::new();
    ds.upsert(Entity::with_code("Chile", "CHL"), 2010, Some(15.0));
    ds.upsert(Entity::with_code("Chile", "CHL"), 2011, Some(16.5));
    ds.upsert(Entity::new("=HYPERLINK(\"x\")"), 2010, Some(1.0));
    ds
}

#[test]
fn save_csv_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let ds = sample();

    let csv_path = dir.path().join("tidy.csv");
    storage::save_csv(&ds, &csv_path).unwrap();
    let csv_txt = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv_txt.lines().collect();
    assert_eq!(lines[0], "entity,code,year,value");
    assert_eq!(lines[2], "Chile,CHL,2011,16.5");
    assert_eq!(lines.len(), 4);
    // formulas are neutralized
    assert!(lines[3].starts_with("\"'=HYPERLINK("), "{}", lines[3]);

    let json_path = dir.path().join("tidy.json");
    storage::save_json(&ds, &json_path).unwrap();
    let rows: Vec<ExportRow> = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(rows, storage::tidy_rows(&ds));
    assert_eq!(rows[0].code.as_deref(), Some("CHL"));
}

#[test]
fn merged_table_has_one_row_per_country_and_year() {
    let dir = tempfile::tempdir().unwrap();
    let incidence = sample();
    let mut sales = Dataset::new();
    sales.upsert(Entity::new("Chile"), 2011, Some(4.0));
    let (merged, _) = merge(&incidence, &sales, &[2010, 2011]);

    let path = dir.path().join("merged.csv");
    storage::save_merged_csv(&merged, &path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(
        text.lines().collect::<Vec<_>>(),
        ["entity,year,incidence,sales", "Chile,2010,15.0,", "Chile,2011,16.5,4.0"]
    );

    let path = dir.path().join("merged.json");
    storage::save_merged_json(&merged, &path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(v[0]["entity"]["name"], "Chile");
    assert_eq!(v[0]["sales"][1]["value"], 4.0);
}
