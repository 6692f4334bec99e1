use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Inclusive span of series keys (years), e.g. 2010..=2021.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }

    /// All years of the span in ascending order.
    pub fn years(&self) -> Vec<i32> {
        (self.start..=self.end).collect()
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self::new(2010, 2021)
    }
}

/// A plotted subject (a country).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    /// Short code such as ISO3 `DEU`, when the source provides one.
    pub code: Option<String>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: None,
        }
    }

    pub fn with_code(name: impl Into<String>, code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            name: name.into(),
            code: if code.trim().is_empty() {
                None
            } else {
                Some(code)
            },
        }
    }
}

/// One (year, value) observation. `None` means the source had no value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub year: i32,
    pub value: Option<f64>,
}

impl SeriesPoint {
    pub fn new(year: i32, value: Option<f64>) -> Self {
        Self { year, value }
    }

    #[inline]
    pub fn value_or_zero(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }
}

/// All observations of one entity, one slot per year.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySeries {
    pub entity: Entity,
    values: BTreeMap<i32, Option<f64>>,
}

impl EntitySeries {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            values: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.entity.name
    }

    pub fn value(&self, year: i32) -> Option<f64> {
        self.values.get(&year).copied().flatten()
    }

    /// Store a value; returns `true` when a previous value for the year was overwritten.
    pub fn set(&mut self, year: i32, value: Option<f64>) -> bool {
        self.values.insert(year, value).is_some()
    }

    /// Points for every year of `years`, absent ones as `None`.
    pub fn points(&self, years: &[i32]) -> Vec<SeriesPoint> {
        years
            .iter()
            .map(|&y| SeriesPoint::new(y, self.value(y)))
            .collect()
    }

    /// Largest present value over every stored year.
    pub fn max_value(&self) -> Option<f64> {
        self.values
            .values()
            .flatten()
            .copied()
            .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
    }

    /// Years with a stored slot (present or absent value).
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.values.keys().copied()
    }
}

/// Entity → ordered series mapping over a shared year domain.
///
/// Entities keep the order in which the source first mentioned them; colors
/// and dropdown options follow that order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    entities: Vec<EntitySeries>,
    index: AHashMap<String, usize>,
    years: BTreeSet<i32>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dataset whose key domain is fixed to `range`, even for years without data.
    pub fn with_year_range(range: YearRange) -> Self {
        Self {
            years: range.years().into_iter().collect(),
            ..Self::default()
        }
    }

    /// Insert or overwrite the value of `(entity, year)`.
    /// Returns `true` when an earlier value was overwritten.
    pub fn upsert(&mut self, entity: Entity, year: i32, value: Option<f64>) -> bool {
        self.years.insert(year);
        let idx = match self.index.get(&entity.name) {
            Some(&i) => {
                if self.entities[i].entity.code.is_none() && entity.code.is_some() {
                    self.entities[i].entity.code = entity.code;
                }
                i
            }
            None => {
                let i = self.entities.len();
                self.index.insert(entity.name.clone(), i);
                self.entities.push(EntitySeries::new(entity));
                i
            }
        };
        self.entities[idx].set(year, value)
    }

    /// Register an entity without values (keeps first-seen order).
    pub fn ensure_entity(&mut self, entity: Entity) {
        if !self.index.contains_key(&entity.name) {
            self.index.insert(entity.name.clone(), self.entities.len());
            self.entities.push(EntitySeries::new(entity));
        }
    }

    pub fn entity(&self, name: &str) -> Option<&EntitySeries> {
        self.index.get(name).map(|&i| &self.entities[i])
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn entities(&self) -> &[EntitySeries] {
        &self.entities
    }

    pub fn names(&self) -> Vec<&str> {
        self.entities.iter().map(|e| e.name()).collect()
    }

    /// Shared key domain, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.years.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Full series of an entity over the shared domain.
    pub fn series(&self, name: &str) -> Option<Vec<SeriesPoint>> {
        let years = self.years();
        self.entity(name).map(|e| e.points(&years))
    }

    /// Largest value across the given entities (all of their years).
    pub fn max_value_of<'a, I>(&self, names: I) -> Option<f64>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .filter_map(|n| self.entity(n))
            .filter_map(EntitySeries::max_value)
            .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
    }
}

/// Per-entity join of incidence and sales over the same year domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRecord {
    pub entity: Entity,
    pub incidence: Vec<SeriesPoint>,
    pub sales: Vec<SeriesPoint>,
}

impl MergedRecord {
    pub fn name(&self) -> &str {
        &self.entity.name
    }

    pub fn max_incidence(&self) -> Option<f64> {
        max_present(&self.incidence)
    }

    pub fn max_sales(&self) -> Option<f64> {
        max_present(&self.sales)
    }
}

fn max_present(points: &[SeriesPoint]) -> Option<f64> {
    points
        .iter()
        .filter_map(|p| p.value)
        .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_keeps_first_seen_order_and_reports_overwrites() {
        let mut ds = Dataset::new();
        assert!(!ds.upsert(Entity::new("B"), 2010, Some(1.0)));
        assert!(!ds.upsert(Entity::new("A"), 2010, Some(2.0)));
        assert!(ds.upsert(Entity::new("B"), 2010, Some(3.0)));
        assert_eq!(ds.names(), vec!["B", "A"]);
        assert_eq!(ds.entity("B").unwrap().value(2010), Some(3.0));
    }

    #[test]
    fn fixed_year_range_fills_domain() {
        let mut ds = Dataset::with_year_range(YearRange::new(2010, 2012));
        ds.upsert(Entity::new("A"), 2011, Some(5.0));
        let s = ds.series("A").unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s[0], SeriesPoint::new(2010, None));
        assert_eq!(s[1].value_or_zero(), 5.0);
    }

    #[test]
    fn code_is_filled_in_later() {
        let mut ds = Dataset::new();
        ds.upsert(Entity::new("Germany"), 2010, None);
        ds.upsert(Entity::with_code("Germany", "DEU"), 2011, None);
        assert_eq!(ds.entity("Germany").unwrap().entity.code.as_deref(), Some("DEU"));
    }
}
