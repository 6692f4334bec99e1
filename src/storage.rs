use crate::error::Result;
use crate::models::{Dataset, MergedRecord};
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One observation in the tidy export schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub entity: String,
    pub code: Option<String>,
    pub year: i32,
    pub value: Option<f64>,
}

/// Flatten a dataset into rows, entities in dataset order and years ascending.
/// Only stored (entity, year) slots are emitted.
pub fn tidy_rows(dataset: &Dataset) -> Vec<ExportRow> {
    dataset
        .entities()
        .iter()
        .flat_map(|s| {
            s.years().map(move |year| ExportRow {
                entity: s.entity.name.clone(),
                code: s.entity.code.clone(),
                year,
                value: s.value(year),
            })
        })
        .collect()
}

/// Wide rows of the dual-axis join: one per (entity, year) with both measures.
pub fn merged_rows(records: &[MergedRecord]) -> Vec<(String, i32, Option<f64>, Option<f64>)> {
    records
        .iter()
        .flat_map(|r| {
            r.incidence
                .iter()
                .zip(&r.sales)
                .map(|(tb, s)| (r.name().to_string(), tb.year, tb.value, s.value))
        })
        .collect()
}

/// Spreadsheet apps evaluate cells starting with these characters.
fn guard_cell(s: &str) -> String {
    match s.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{s}"),
        _ => s.to_string(),
    }
}

/// Save a dataset as CSV (`entity,code,year,value`) with a header.
pub fn save_csv<P: AsRef<Path>>(dataset: &Dataset, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(["entity", "code", "year", "value"])?;
    for row in tidy_rows(dataset) {
        wtr.serialize((
            guard_cell(&row.entity),
            row.code.as_deref().map(guard_cell),
            row.year,
            row.value,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save the merged dual-axis table as CSV (`entity,year,incidence,sales`).
pub fn save_merged_csv<P: AsRef<Path>>(records: &[MergedRecord], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(["entity", "year", "incidence", "sales"])?;
    for (entity, year, tb, sales) in merged_rows(records) {
        wtr.serialize((guard_cell(&entity), year, tb, sales))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save merged records as a pretty JSON array.
pub fn save_merged_json<P: AsRef<Path>>(records: &[MergedRecord], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(records)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save a dataset as a pretty JSON array of [`ExportRow`].
pub fn save_json<P: AsRef<Path>>(dataset: &Dataset, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(&tidy_rows(dataset))?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Entity;
    use tempfile::tempdir;

    #[test]
    fn write_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        let mut ds = Dataset::new();
        ds.upsert(Entity::with_code("Germany", "DEU"), 2010, Some(1.23));
        ds.upsert(Entity::with_code("Germany", "DEU"), 2011, None);
        save_csv(&ds, &csvp).unwrap();
        save_json(&ds, &jsonp).unwrap();
        let text = std::fs::read_to_string(&csvp).unwrap();
        assert_eq!(text.lines().collect::<Vec<_>>(), ["entity,code,year,value", "Germany,DEU,2010,1.23", "Germany,DEU,2011,"]);
        assert!(jsonp.exists());
    }

    #[test]
    fn formula_starters_are_quoted() {
        assert_eq!(guard_cell("=1+1"), "'=1+1");
        assert_eq!(guard_cell("-2"), "'-2");
        assert_eq!(guard_cell("Chile"), "Chile");
    }
}
