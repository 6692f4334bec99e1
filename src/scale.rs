//! Scales and projections: data values to canvas positions and colors.

use crate::color::Rgb;
use crate::geo::LonLat;
use chrono::NaiveDate;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Continuous linear mapping from a value domain to a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Position of `v`. A zero-width domain maps everything to the range start.
    pub fn map(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if (d1 - d0).abs() < f64::EPSILON {
            return r0;
        }
        r0 + (v - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Round tick values inside the domain, about `count` of them.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (a, b) = self.domain;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        ticks(lo, hi, count)
    }
}

fn tick_increment(start: f64, stop: f64, count: usize) -> Option<(i64, i64, f64)> {
    let step = (stop - start) / count.max(1) as f64;
    if !(step.is_finite() && step > 0.0) {
        return None;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    if power < 0.0 {
        // Negative increment encodes 1/inc to keep fractional ticks exact.
        let inc = 10f64.powf(-power) / factor;
        let mut i1 = (start * inc).round() as i64;
        let mut i2 = (stop * inc).round() as i64;
        if (i1 as f64) / inc < start {
            i1 += 1;
        }
        if (i2 as f64) / inc > stop {
            i2 -= 1;
        }
        Some((i1, i2, -inc))
    } else {
        let inc = 10f64.powf(power) * factor;
        let mut i1 = (start / inc).round() as i64;
        let mut i2 = (stop / inc).round() as i64;
        if (i1 as f64) * inc < start {
            i1 += 1;
        }
        if (i2 as f64) * inc > stop {
            i2 -= 1;
        }
        Some((i1, i2, inc))
    }
}

/// Evenly spaced "nice" values (multiples of 1, 2 or 5 times a power of ten).
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let Some((i1, i2, inc)) = tick_increment(start, stop, count) else {
        return Vec::new();
    };
    if i2 < i1 {
        return Vec::new();
    }
    (i1..=i2)
        .map(|i| {
            if inc < 0.0 {
                i as f64 / -inc
            } else {
                i as f64 * inc
            }
        })
        .collect()
}

/// Calendar scale over whole years; a year is placed at its January 1st.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    start: NaiveDate,
    end: NaiveDate,
    pub range: (f64, f64),
}

impl TimeScale {
    pub fn years(first: i32, last: i32, range: (f64, f64)) -> Self {
        Self {
            start: jan_first(first),
            end: jan_first(last),
            range,
        }
    }

    pub fn map(&self, year: i32) -> f64 {
        let total = (self.end - self.start).num_days() as f64;
        let (r0, r1) = self.range;
        if total == 0.0 {
            return r0;
        }
        let offset = (jan_first(year) - self.start).num_days() as f64;
        r0 + offset / total * (r1 - r0)
    }
}

fn jan_first(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Result of looking up a value in a [`ThresholdScale`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    NoData,
    /// Index into the color ramp.
    Index(usize),
}

/// Step function from numeric ranges to discrete colors.
///
/// The band of a value is the number of breakpoints less than or equal to it,
/// clamped to the last color. Absent values and zero are "no data".
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdScale {
    breakpoints: Vec<f64>,
    colors: Vec<Rgb>,
    no_data: Rgb,
}

impl ThresholdScale {
    pub fn new(breakpoints: Vec<f64>, colors: Vec<Rgb>, no_data: Rgb) -> Self {
        Self {
            breakpoints,
            colors,
            no_data,
        }
    }

    pub fn band(&self, value: Option<f64>) -> Band {
        match value {
            Some(v) if v != 0.0 && v.is_finite() && !self.colors.is_empty() => {
                let idx = self.breakpoints.partition_point(|b| *b <= v);
                Band::Index(idx.min(self.colors.len() - 1))
            }
            _ => Band::NoData,
        }
    }

    pub fn color(&self, value: Option<f64>) -> Rgb {
        match self.band(value) {
            Band::Index(i) => self.colors[i],
            Band::NoData => self.no_data,
        }
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn no_data(&self) -> Rgb {
        self.no_data
    }

    /// Lower bound of each color band, for the legend. `None` means unbounded below.
    pub fn band_floor(&self, idx: usize) -> Option<f64> {
        idx.checked_sub(1).and_then(|i| self.breakpoints.get(i).copied())
    }
}

/// Radar layout: key `i` of `n` sits at angle `i·2π/n`, measured clockwise from 12 o'clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarGrid {
    pub keys: usize,
    pub radius: f64,
}

impl PolarGrid {
    pub fn angle_slice(&self) -> f64 {
        2.0 * PI / self.keys.max(1) as f64
    }

    /// Offset from the center of key `i` at distance `r`.
    pub fn point(&self, i: usize, r: f64) -> (f64, f64) {
        let a = self.angle_slice() * i as f64 - FRAC_PI_2;
        (r * a.cos(), r * a.sin())
    }

    /// Distance from the center for `value` given the domain maximum.
    pub fn radius_of(&self, value: f64, max: f64) -> f64 {
        if max > 0.0 {
            self.radius * value / max
        } else {
            0.0
        }
    }
}

/// Spherical Mercator with a fixed scale and translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mercator {
    pub scale: f64,
    pub translate: (f64, f64),
}

/// Latitude where Mercator becomes square; poles are clamped to it.
pub const MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

impl Mercator {
    pub fn project(&self, (lon, lat): LonLat) -> (f64, f64) {
        let lambda = lon.to_radians();
        let phi = lat.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT).to_radians();
        let x = self.scale * lambda + self.translate.0;
        let y = -self.scale * (FRAC_PI_4 + phi / 2.0).tan().ln() + self.translate.1;
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> ThresholdScale {
        let colors = ["#ffdada", "#ffbebe", "#fd6d6d", "#fd2525", "#E10000", "#AA0000", "#8B0000"]
            .iter()
            .map(|c| c.parse().unwrap())
            .collect();
        ThresholdScale::new(
            vec![0.0, 50.0, 100.0, 150.0, 200.0, 250.0, 300.0, 350.0, 400.0],
            colors,
            Rgb::GRID,
        )
    }

    #[test]
    fn threshold_bands() {
        let s = ramp();
        assert_eq!(s.band(Some(200.0)), Band::Index(5));
        assert_eq!(s.band(Some(199.9)), Band::Index(4));
        assert_eq!(s.band(Some(10.0)), Band::Index(1));
        assert_eq!(s.band(Some(5000.0)), Band::Index(6));
        assert_eq!(s.band(None), Band::NoData);
        assert_eq!(s.band(Some(0.0)), Band::NoData);
        assert_eq!(s.color(None), Rgb::GRID);
        assert_eq!(s.band_floor(0), None);
        assert_eq!(s.band_floor(5), Some(200.0));
    }

    #[test]
    fn linear_ticks_are_round() {
        assert_eq!(ticks(0.0, 10.0, 10), (0..=10).map(f64::from).collect::<Vec<_>>());
        assert_eq!(ticks(0.0, 437.0, 10), vec![0.0, 50.0, 100.0, 150.0, 200.0, 250.0, 300.0, 350.0, 400.0]);
        assert_eq!(ticks(0.0, 0.5, 5), vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5]);
        assert!(ticks(0.0, f64::NAN, 10).is_empty());
    }

    #[test]
    fn linear_map_inverts_range() {
        let y = LinearScale::new((0.0, 20.0), (420.0, 0.0));
        assert_eq!(y.map(0.0), 420.0);
        assert_eq!(y.map(20.0), 0.0);
        assert_eq!(y.map(10.0), 210.0);
        assert_eq!(LinearScale::new((0.0, 0.0), (5.0, 9.0)).map(3.0), 5.0);
    }

    #[test]
    fn time_scale_endpoints() {
        let x = TimeScale::years(2010, 2021, (0.0, 740.0));
        assert_eq!(x.map(2010), 0.0);
        assert_eq!(x.map(2021), 740.0);
        assert!(x.map(2015) > 330.0 && x.map(2015) < 340.0);
    }

    #[test]
    fn polar_starts_at_twelve_oclock() {
        let g = PolarGrid { keys: 12, radius: 300.0 };
        let (x, y) = g.point(0, 300.0);
        assert!(x.abs() < 1e-9 && (y + 300.0).abs() < 1e-9);
        let (x, y) = g.point(3, 100.0);
        assert!((x - 100.0).abs() < 1e-9 && y.abs() < 1e-9);
        assert_eq!(g.radius_of(5.0, 0.0), 0.0);
    }

    #[test]
    fn mercator_origin_and_clamp() {
        let m = Mercator { scale: 200.0, translate: (700.0, 450.0) };
        let (x, y) = m.project((0.0, 0.0));
        assert!((x - 700.0).abs() < 1e-9 && (y - 450.0).abs() < 1e-9);
        let (_, top) = m.project((0.0, 90.0));
        assert!(top.is_finite());
        let (x, _) = m.project((180.0, 0.0));
        assert!((x - (700.0 + 200.0 * PI)).abs() < 1e-9);
    }
}
