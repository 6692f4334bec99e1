//! Runtime configuration: data sources, chart geometry and color ramps.
//!
//! Every field has a default matching the published charts, so a config
//! file only needs the values it overrides:
//!
//! ```json
//! { "map": { "default_year": "2019" }, "locale": "de" }
//! ```

use crate::error::Result;
use crate::models::YearRange;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    pub data: DataSources,
    /// Year window of the radar and dual-axis charts.
    pub years: YearRange,
    pub radar: RadarConfig,
    pub map: MapConfig,
    pub dual: DualAxisConfig,
    pub tooltip: TooltipConfig,
    /// Number formatting locale tag (`en`, `de`, `fr`, ...).
    pub locale: String,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            data: DataSources::default(),
            years: YearRange::default(),
            radar: RadarConfig::default(),
            map: MapConfig::default(),
            dual: DualAxisConfig::default(),
            tooltip: TooltipConfig::default(),
            locale: "en".into(),
        }
    }
}

impl VizConfig {
    /// Read a JSON config file; missing fields keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// `load` when a path is given, defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

/// Locations of the input files: local paths or http(s) URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSources {
    /// Long-format sales table (`Country,Year,Value`) for the radar chart.
    pub sales: String,
    /// OECD sales export (long format) for the dual-axis chart.
    pub oecd_sales: String,
    /// Wide-format incidence table (`COU,Country,2000,...`).
    pub incidence: String,
    /// World map feature collection.
    pub world: String,
}

impl Default for DataSources {
    fn default() -> Self {
        Self {
            sales: "Data/anti_bacterial_drug_sales.csv".into(),
            oecd_sales: "Data/Sales_Of_Anti_Bacterial_Drugs_OECD.csv".into(),
            incidence: "Data/TB_Data.csv".into(),
            world: "Data/World_Map.json".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub fn uniform(m: f64) -> Self {
        Self {
            top: m,
            right: m,
            bottom: m,
            left: m,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    /// Plot width without margins.
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    /// Number of concentric grid circles.
    pub levels: usize,
    pub dot_radius: f64,
    pub fill_opacity: f64,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 600.0,
            margin: Margin::uniform(50.0),
            levels: 5,
            dot_radius: 4.0,
            fill_opacity: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub width: f64,
    pub height: f64,
    /// Mercator scale factor.
    pub scale: f64,
    /// Vertical shift of the projection center below the canvas middle.
    pub offset_y: f64,
    /// Year shown first; falls back to the latest year column when absent.
    pub default_year: String,
    /// Threshold breakpoints, ascending.
    pub breakpoints: Vec<f64>,
    /// Color ramp, lightest first.
    pub colors: Vec<String>,
    pub no_data_color: String,
    pub sea_color: String,
    pub stroke_width: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 1400.0,
            height: 700.0,
            scale: 200.0,
            offset_y: 100.0,
            default_year: "2022".into(),
            breakpoints: vec![0.0, 50.0, 100.0, 150.0, 200.0, 250.0, 300.0, 350.0, 400.0],
            colors: [
                "#ffdada", "#ffbebe", "#fd6d6d", "#fd2525", "#E10000", "#AA0000", "#8B0000",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            no_data_color: "#ccc".into(),
            sea_color: "#87CEEB".into(),
            stroke_width: 0.5,
        }
    }
}

/// Which records determine the dual-axis value domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainPolicy {
    /// Maximum of the selected country only.
    Active,
    /// Maximum over every merged country; axes stay fixed while switching.
    Global,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DualAxisConfig {
    /// Outer width including margins.
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub domain: DomainPolicy,
    pub dot_radius: f64,
    pub line_width: f64,
    pub incidence_color: String,
    pub sales_color: String,
}

impl Default for DualAxisConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 500.0,
            margin: Margin {
                top: 30.0,
                right: 150.0,
                bottom: 50.0,
                left: 70.0,
            },
            domain: DomainPolicy::Active,
            dot_radius: 4.0,
            line_width: 1.5,
            incidence_color: "steelblue".into(),
            sales_color: "red".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipConfig {
    pub fade_in_ms: u64,
    pub hide_after_ms: u64,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            fade_in_ms: 200,
            hide_after_ms: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg: VizConfig =
            serde_json::from_str(r#"{ "map": { "default_year": "2019" }, "locale": "de" }"#)
                .unwrap();
        assert_eq!(cfg.map.default_year, "2019");
        assert_eq!(cfg.map.breakpoints.len(), 9);
        assert_eq!(cfg.locale, "de");
        assert_eq!(cfg.years, YearRange::new(2010, 2021));
        assert_eq!(cfg.dual.domain, DomainPolicy::Active);
    }
}
