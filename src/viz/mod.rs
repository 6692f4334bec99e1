//! Chart builders: turn loaded data plus the current selection into a [`Scene`].
//!
//! - `radar`: sales per country and year on a polar grid (checkbox selection)
//! - `choropleth`: TB incidence per country on a Mercator world map (year dropdown)
//! - `dual_axis`: incidence and sales of one country over time (country dropdown)
//!
//! Builders never draw; the exporters in [`crate::render`] and the GUI do.
//!
//! [`Scene`]: crate::scene::Scene

pub mod choropleth;
pub mod dual_axis;
pub mod legend;
pub mod radar;
pub mod text;
pub mod util;

pub use choropleth::build_choropleth;
pub use dual_axis::build_dual_axis;
pub use radar::build_radar;

use clap::ValueEnum;

/// The three charts, used for GUI tabs and CLI dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum ChartKind {
    Radar,
    Choropleth,
    DualAxis,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Radar, ChartKind::Choropleth, ChartKind::DualAxis];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Radar => "Drug sales (radar)",
            ChartKind::Choropleth => "TB incidence (map)",
            ChartKind::DualAxis => "Incidence vs. sales",
        }
    }
}
