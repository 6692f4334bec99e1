//! World map features and their join with the incidence table.

use crate::error::Result;
use crate::models::Dataset;
use ahash::AHashMap;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Longitude/latitude in degrees.
pub type LonLat = (f64, f64);

/// One country outline. A polygon is a list of rings, the first ring is the
/// outer boundary and the rest are holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub code: String,
    pub name: String,
    pub polygons: Vec<Vec<Vec<LonLat>>>,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Map<String, Value>,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Unsupported,
}

const CODE_KEYS: [&str; 3] = ["adm0_a3", "ADM0_A3", "iso_a3"];
const NAME_KEYS: [&str; 3] = ["name", "NAME", "admin"];

fn first_str(props: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| props.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

fn ring(points: Vec<Vec<f64>>) -> Vec<LonLat> {
    points
        .into_iter()
        .filter(|p| p.len() >= 2)
        .map(|p| (p[0], p[1]))
        .collect()
}

/// Parse a GeoJSON feature collection into regions.
///
/// Features without a code or with a non-areal geometry are skipped.
pub fn parse_world(text: &str) -> Result<Vec<Region>> {
    let fc: FeatureCollection = serde_json::from_str(text)?;
    let mut out = Vec::with_capacity(fc.features.len());
    for feature in fc.features {
        let Some(code) = first_str(&feature.properties, &CODE_KEYS) else {
            log::debug!("skipping feature without country code");
            continue;
        };
        let name = first_str(&feature.properties, &NAME_KEYS).unwrap_or_else(|| code.clone());
        let polygons = match feature.geometry {
            Some(Geometry::Polygon { coordinates }) => {
                vec![coordinates.into_iter().map(ring).collect()]
            }
            Some(Geometry::MultiPolygon { coordinates }) => coordinates
                .into_iter()
                .map(|poly| poly.into_iter().map(ring).collect())
                .collect(),
            Some(Geometry::Unsupported) | None => {
                log::debug!("skipping {code}: no polygon geometry");
                continue;
            }
        };
        out.push(Region {
            code,
            name,
            polygons,
        });
    }
    Ok(out)
}

/// Regions plus the incidence table they are colored by.
#[derive(Debug, Clone)]
pub struct ChoroplethData {
    pub regions: Vec<Region>,
    pub incidence: Dataset,
    by_code: AHashMap<String, usize>,
}

impl ChoroplethData {
    /// Join regions with the table by entity code. Later rows win on duplicate codes.
    pub fn new(regions: Vec<Region>, incidence: Dataset) -> Self {
        let mut by_code = AHashMap::new();
        for (i, e) in incidence.entities().iter().enumerate() {
            if let Some(code) = &e.entity.code {
                by_code.insert(code.clone(), i);
            }
        }
        let unmatched = regions
            .iter()
            .filter(|r| !by_code.contains_key(&r.code))
            .count();
        if unmatched > 0 {
            log::info!("{unmatched} map regions have no incidence row");
        }
        Self {
            regions,
            incidence,
            by_code,
        }
    }

    /// Years offered by the dropdown, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.incidence.years()
    }

    /// Incidence of a region for a year; `None` when there is no row or no value.
    pub fn value(&self, region: &Region, year: i32) -> Option<f64> {
        self.by_code
            .get(&region.code)
            .and_then(|&i| self.incidence.entities()[i].value(year))
    }

    /// Year selected on first display: the configured one when present, else the latest.
    pub fn initial_year(&self, preferred: &str) -> Option<i32> {
        let years = self.years();
        preferred
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|y| years.contains(y))
            .or_else(|| years.last().copied())
    }
}
