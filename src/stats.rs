use crate::models::{Dataset, YearRange};
use serde::{Deserialize, Serialize};

/// Summary statistics for one entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub entity: String,
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Per-entity statistics in dataset order.
///
/// With a `window`, only years inside it are considered and every year of
/// the window without a value counts as missing.
pub fn entity_summary(dataset: &Dataset, window: Option<YearRange>) -> Vec<Summary> {
    let mut out = Vec::with_capacity(dataset.len());
    for series in dataset.entities() {
        let years: Vec<i32> = match window {
            Some(w) => w.years(),
            None => series.years().collect(),
        };
        let mut vals: Vec<f64> = Vec::with_capacity(years.len());
        let mut missing = 0;
        for y in years {
            match series.value(y) {
                Some(v) => vals.push(v),
                None => missing += 1,
            }
        }
        vals.sort_by(f64::total_cmp);
        let count = vals.len();
        let min = vals.first().copied();
        let max = vals.last().copied();
        let mean = if count > 0 {
            Some(vals.iter().copied().sum::<f64>() / count as f64)
        } else {
            None
        };
        let median = if count == 0 {
            None
        } else if count % 2 == 1 {
            Some(vals[count / 2])
        } else {
            Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
        };
        out.push(Summary {
            entity: series.name().to_string(),
            count,
            missing,
            min,
            max,
            mean,
            median,
        });
    }
    out
}
