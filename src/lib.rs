//! tbviz
//!
//! Three linked views of tuberculosis data: anti-bacterial drug sales per
//! country on a radar chart, TB incidence on a choropleth world map, and both
//! measures for one country on a dual-axis time series. Pairs with the
//! `tbviz` CLI and the `tbviz-gui` desktop app.
//!
//! ### Features
//! - Load long (`Country,Year,Value`) and wide (`COU,Country,2000,...`) CSV tables
//!   and GeoJSON world outlines from local paths or http(s) URLs
//! - Checkbox and dropdown selection with "All" semantics
//! - Backend-neutral scenes with per-mark tooltips, exported to interactive SVG or PNG
//! - Tidy CSV/JSON export and per-country summary statistics
//!
//! ### Example
//! ```no_run
//! use tbviz::{Fetcher, VizConfig, loader, viz};
//! use tbviz::selection::SelectionState;
//!
//! let cfg = VizConfig::default();
//! let (sales, report) = loader::load_sales(&Fetcher::default(), &cfg)?;
//! println!("{} rows, {} issues", report.rows, report.issues.len());
//! let scene = viz::build_radar(&sales, &SelectionState::AllEntities, &[], &cfg);
//! tbviz::render::svg::save_svg(&scene, "radar.svg", &cfg.tooltip)?;
//! let stats = tbviz::stats::entity_summary(&sales, Some(cfg.years));
//! println!("{:#?}", stats);
//! # Ok::<(), tbviz::VizError>(())
//! ```

pub mod app;
pub mod color;
pub mod config;
pub mod error;
pub mod fetch;
pub mod geo;
pub mod loader;
pub mod models;
pub mod render;
pub mod scale;
pub mod scene;
pub mod selection;
pub mod stats;
pub mod storage;
pub mod tooltip;
pub mod viz;

pub use app::{AppState, ChartData, UiEvent};
pub use config::VizConfig;
pub use error::{Result, VizError};
pub use fetch::{Fetcher, Source};
pub use models::{Dataset, Entity, MergedRecord, SeriesPoint, YearRange};
pub use scene::Scene;
