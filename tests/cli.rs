use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;

const SALES: &str = "Country,Year,Value\nChile,2010,3.5\nChile,2011,4\nPeru,2010,60\n";
const OECD: &str = "COU,Country,Year,Value\nCHL,Chile,2010,3.5\nCHL,Chile,2011,4\nESP,Spain,2010,90\n";
const TB: &str = "COU,Country,2010,2011\nCHL,Chile,15,16\nPER,Peru,120,110\n";
const WORLD: &str = r#"{ "type": "FeatureCollection", "features": [
  { "type": "Feature", "properties": { "adm0_a3": "CHL", "name": "Chile" },
    "geometry": { "type": "Polygon",
      "coordinates": [[[-75, -18], [-68, -18], [-68, -55], [-75, -55], [-75, -18]]] } } ] }"#;

fn data_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("Data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("anti_bacterial_drug_sales.csv"), SALES).unwrap();
    fs::write(data.join("Sales_Of_Anti_Bacterial_Drugs_OECD.csv"), OECD).unwrap();
    fs::write(data.join("TB_Data.csv"), TB).unwrap();
    fs::write(data.join("World_Map.json"), WORLD).unwrap();
    dir
}

fn tbviz(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tbviz").unwrap();
    cmd.arg("--data-dir").arg(dir);
    cmd
}

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("tbviz").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("radar"))
        .stdout(predicate::str::contains("map"));
}

#[test]
fn radar_writes_an_interactive_svg() {
    let dir = data_dir();
    let out = dir.path().join("radar.svg");
    tbviz(dir.path())
        .args(["radar", "--select", "Peru", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("Loaded 3 rows"));
    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.contains("data-entity=\"Peru\""));
    assert!(!svg.contains("data-entity=\"Chile\""));
}

#[test]
fn map_and_dual_axis_render() {
    let dir = data_dir();
    let map = dir.path().join("map.svg");
    tbviz(dir.path())
        .args(["map", "--year", "2010", "-o"])
        .arg(&map)
        .assert()
        .success();
    assert!(fs::read_to_string(&map).unwrap().contains("Incidence: 15 per 100,000 people"));

    let dual = dir.path().join("dual.svg");
    tbviz(dir.path())
        .args(["dual", "--country", "Chile", "-o"])
        .arg(&dual)
        .assert()
        .success();
    assert!(fs::read_to_string(&dual).unwrap().contains("dotSales"));

    tbviz(dir.path())
        .args(["dual", "--country", "Spain", "-o"])
        .arg(&dual)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Spain"));
}

#[test]
fn list_stats_and_export() {
    let dir = data_dir();
    tbviz(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::diff("Chile\nPeru\n"));
    tbviz(dir.path())
        .args(["list", "--dataset", "merged"])
        .assert()
        .success()
        .stdout(predicate::str::diff("Chile\n"));
    tbviz(dir.path())
        .args(["stats", "--dataset", "incidence"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Peru  count=2 missing=0  min=110 max=120 mean=115 median=115"));

    let out = dir.path().join("merged.csv");
    tbviz(dir.path())
        .args(["export", "--dataset", "merged", "--out"])
        .arg(&out)
        .assert()
        .success();
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("entity,year,incidence,sales\n"));
}

#[test]
fn missing_data_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    tbviz(dir.path())
        .args(["radar", "-o"])
        .arg(dir.path().join("x.svg"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not load data"))
        .stderr(predicate::str::contains("anti_bacterial_drug_sales.csv"));
}

#[test]
fn unknown_extension_fails() {
    let dir = data_dir();
    tbviz(dir.path())
        .args(["radar", "-o"])
        .arg(dir.path().join("radar.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("use .svg or .png"));
}
