//! Reshape tabular rows into [`Dataset`]s and join them.
//!
//! Two layouts are understood:
//! - **long**: one row per observation, columns `Country`, `Year`, `Value`
//!   (and optionally `COU`); any other column is ignored.
//! - **wide**: one row per entity, columns `COU`, `Country` and one column per
//!   year (headers made of exactly four digits).
//!
//! Row-level problems never abort a load: rows with an empty entity are
//! dropped, unparseable or negative numbers are skipped and logged, and a
//! repeated (entity, year) overwrites the earlier value. Everything is counted
//! in the returned [`LoadReport`].

use crate::config::VizConfig;
use crate::error::{Result, VizError};
use crate::fetch::{Fetcher, Source};
use crate::geo::{self, ChoroplethData};
use crate::models::{Dataset, Entity, MergedRecord, YearRange};
use csv::{ReaderBuilder, StringRecord, Trim};
use regex::Regex;
use std::sync::OnceLock;

/// A value that could not be used.
#[derive(Debug, Clone, PartialEq)]
pub struct RowIssue {
    /// 1-based data row (header excluded).
    pub row: usize,
    pub column: String,
    pub raw: String,
    pub reason: String,
}

/// Which side of a join an entity was missing from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinSide {
    Incidence,
    Sales,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinMiss {
    pub entity: String,
    pub missing_from: JoinSide,
}

/// Non-fatal findings of a load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub rows: usize,
    pub dropped_empty_entity: usize,
    pub issues: Vec<RowIssue>,
    /// Number of (entity, year) values overwritten by a later row.
    pub duplicates: usize,
    pub join_misses: Vec<JoinMiss>,
}

impl LoadReport {
    pub fn absorb(&mut self, other: LoadReport) {
        self.rows += other.rows;
        self.dropped_empty_entity += other.dropped_empty_entity;
        self.issues.extend(other.issues);
        self.duplicates += other.duplicates;
        self.join_misses.extend(other.join_misses);
    }

    pub fn is_clean(&self) -> bool {
        self.dropped_empty_entity == 0
            && self.issues.is_empty()
            && self.duplicates == 0
            && self.join_misses.is_empty()
    }
}

fn year_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}$").expect("static regex"))
}

/// Year columns of a wide table as `(column index, year)`, in file order.
pub fn year_columns(headers: &StringRecord) -> Vec<(usize, i32)> {
    headers
        .iter()
        .enumerate()
        .filter(|(_, h)| year_header().is_match(h.trim()))
        .filter_map(|(i, h)| h.trim().parse().ok().map(|y| (i, y)))
        .collect()
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| {
        h.trim_start_matches('\u{feff}')
            .trim()
            .eq_ignore_ascii_case(name)
    })
}

fn require_column(headers: &StringRecord, name: &str) -> Result<usize> {
    find_column(headers, name).ok_or_else(|| VizError::MissingColumn(name.to_string()))
}

/// Empty → `Ok(None)`; number ≥ 0 → `Ok(Some)`; anything else → `Err(reason)`.
pub fn parse_value(raw: &str) -> std::result::Result<Option<f64>, String> {
    let t = raw.trim();
    if t.is_empty() {
        return Ok(None);
    }
    match t.parse::<f64>() {
        Ok(v) if !v.is_finite() => Err("not a finite number".into()),
        Ok(v) if v < 0.0 => Err("negative value".into()),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err("not a number".into()),
    }
}

fn reader(text: &str) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes())
}

fn issue(report: &mut LoadReport, row: usize, column: &str, raw: &str, reason: String) {
    log::warn!("row {row}: skipping {column} value `{raw}`: {reason}");
    report.issues.push(RowIssue {
        row,
        column: column.to_string(),
        raw: raw.to_string(),
        reason,
    });
}

/// Group a long table by entity, one value per year.
///
/// With a `window`, the year domain is exactly the window and rows outside it
/// are ignored; without one the domain is every year seen.
pub fn parse_long_csv(text: &str, window: Option<YearRange>) -> Result<(Dataset, LoadReport)> {
    let mut rdr = reader(text);
    let headers = rdr.headers()?.clone();
    let c_country = require_column(&headers, "Country")?;
    let c_year = require_column(&headers, "Year")?;
    let c_value = require_column(&headers, "Value")?;
    let c_code = find_column(&headers, "COU");

    let mut ds = window.map(Dataset::with_year_range).unwrap_or_default();
    let mut report = LoadReport::default();

    for (i, rec) in rdr.records().enumerate() {
        let row = i + 1;
        let rec = rec?;
        report.rows += 1;
        let name = rec.get(c_country).unwrap_or("");
        let code = c_code.and_then(|c| rec.get(c)).unwrap_or("");
        if name.is_empty() {
            log::debug!("row {row}: dropping row without a name");
            report.dropped_empty_entity += 1;
            continue;
        }
        let raw_year = rec.get(c_year).unwrap_or("");
        let Ok(year) = raw_year.parse::<i32>() else {
            issue(&mut report, row, "Year", raw_year, "not a year".into());
            continue;
        };
        if window.is_some_and(|w| !w.contains(year)) {
            continue;
        }
        let raw_value = rec.get(c_value).unwrap_or("");
        let value = match parse_value(raw_value) {
            Ok(v) => v,
            Err(reason) => {
                issue(&mut report, row, "Value", raw_value, reason);
                continue;
            }
        };
        if ds.upsert(Entity::with_code(name, code), year, value) {
            log::debug!("row {row}: {name} {year} overwrites an earlier value");
            report.duplicates += 1;
        }
    }
    log::info!(
        "loaded {} entities from {} rows ({} issues)",
        ds.len(),
        report.rows,
        report.issues.len()
    );
    Ok((ds, report))
}

/// Read a wide table: one entity per row, one column per year.
pub fn parse_wide_csv(text: &str, window: Option<YearRange>) -> Result<(Dataset, LoadReport)> {
    let mut rdr = reader(text);
    let headers = rdr.headers()?.clone();
    let c_country = require_column(&headers, "Country")?;
    let c_code = find_column(&headers, "COU");
    let years: Vec<(usize, i32)> = year_columns(&headers)
        .into_iter()
        .filter(|(_, y)| window.is_none_or(|w| w.contains(*y)))
        .collect();

    let mut ds = window.map(Dataset::with_year_range).unwrap_or_default();
    let mut report = LoadReport::default();

    for (i, rec) in rdr.records().enumerate() {
        let row = i + 1;
        let rec = rec?;
        report.rows += 1;
        let name = rec.get(c_country).unwrap_or("");
        let code = c_code.and_then(|c| rec.get(c)).unwrap_or("");
        if name.is_empty() {
            log::debug!("row {row}: dropping row without a name");
            report.dropped_empty_entity += 1;
            continue;
        }
        let entity = Entity::with_code(name, code);
        ds.ensure_entity(entity.clone());
        for &(col, year) in &years {
            let raw = rec.get(col).unwrap_or("");
            match parse_value(raw) {
                Ok(v) => {
                    if ds.upsert(entity.clone(), year, v) {
                        log::debug!("row {row}: {name} {year} overwrites an earlier value");
                        report.duplicates += 1;
                    }
                }
                Err(reason) => issue(&mut report, row, &headers[col], raw, reason),
            }
        }
    }
    log::info!(
        "loaded {} entities x {} years ({} issues)",
        ds.len(),
        years.len(),
        report.issues.len()
    );
    Ok((ds, report))
}

/// Join incidence and sales by entity name over `years`.
///
/// Only entities present in both datasets are kept; the order follows the
/// sales dataset. Every excluded entity is logged and returned as a miss.
pub fn merge(
    incidence: &Dataset,
    sales: &Dataset,
    years: &[i32],
) -> (Vec<MergedRecord>, Vec<JoinMiss>) {
    let mut merged = Vec::new();
    let mut misses = Vec::new();
    for s in sales.entities() {
        match incidence.entity(s.name()) {
            Some(inc) => merged.push(MergedRecord {
                entity: s.entity.clone(),
                incidence: inc.points(years),
                sales: s.points(years),
            }),
            None => {
                log::info!("{}: no incidence data, excluded", s.name());
                misses.push(JoinMiss {
                    entity: s.name().to_string(),
                    missing_from: JoinSide::Incidence,
                });
            }
        }
    }
    for inc in incidence.entities() {
        if !sales.contains(inc.name()) {
            log::debug!("{}: no sales data, excluded", inc.name());
            misses.push(JoinMiss {
                entity: inc.name().to_string(),
                missing_from: JoinSide::Sales,
            });
        }
    }
    (merged, misses)
}

/// Sales table for the radar chart.
pub fn load_sales(fetcher: &Fetcher, cfg: &VizConfig) -> Result<(Dataset, LoadReport)> {
    let text = fetcher.fetch_text(&Source::parse(&cfg.data.sales))?;
    parse_long_csv(&text, Some(cfg.years))
}

/// World map and incidence table, fetched concurrently.
pub fn load_map(fetcher: &Fetcher, cfg: &VizConfig) -> Result<(ChoroplethData, LoadReport)> {
    let [world, table] = fetcher.fetch_all([
        Source::parse(&cfg.data.world),
        Source::parse(&cfg.data.incidence),
    ]);
    let regions = geo::parse_world(&world?)?;
    let (incidence, report) = parse_wide_csv(&table?, None)?;
    if incidence.is_empty() {
        return Err(VizError::EmptyDataset);
    }
    Ok((ChoroplethData::new(regions, incidence), report))
}

/// Incidence and OECD sales, fetched concurrently and merged.
pub fn load_dual(fetcher: &Fetcher, cfg: &VizConfig) -> Result<(Vec<MergedRecord>, LoadReport)> {
    let [incidence, sales] = fetcher.fetch_all([
        Source::parse(&cfg.data.incidence),
        Source::parse(&cfg.data.oecd_sales),
    ]);
    let (incidence, mut report) = parse_wide_csv(&incidence?, Some(cfg.years))?;
    let (sales, sales_report) = parse_long_csv(&sales?, Some(cfg.years))?;
    report.absorb(sales_report);
    let (merged, misses) = merge(&incidence, &sales, &cfg.years.years());
    report.join_misses.extend(misses);
    if merged.is_empty() {
        return Err(VizError::EmptyDataset);
    }
    Ok((merged, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_value_policy() {
        assert_eq!(parse_value(""), Ok(None));
        assert_eq!(parse_value(" 12.5 "), Ok(Some(12.5)));
        assert!(parse_value("n/a").is_err());
        assert!(parse_value("-3").is_err());
        assert!(parse_value("NaN").is_err());
    }

    #[test]
    fn year_columns_follow_file_order() {
        let h = StringRecord::from(vec!["COU", "Country", "2001", "2000", "20000", "y2002"]);
        assert_eq!(year_columns(&h), vec![(2, 2001), (3, 2000)]);
    }

    #[test]
    fn missing_column_is_an_error() {
        let err = parse_long_csv("Country,Value\nA,1\n", None).unwrap_err();
        assert!(matches!(err, VizError::MissingColumn(c) if c == "Year"));
    }
}
