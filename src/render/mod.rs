//! Exporters that turn a [`Scene`](crate::scene::Scene) into files or pixels.
//!
//! - `svg`: standalone interactive SVG (tooltips and highlight via an embedded script)
//! - `bitmap`: PNG files and raw RGB buffers through the plotters bitmap backend

pub mod bitmap;
pub mod svg;

use crate::config::TooltipConfig;
use crate::error::{Result, VizError};
use crate::scene::Scene;
use std::path::Path;

/// Write `scene` to `path`, choosing the format from the extension (`.svg` or `.png`).
pub fn save_scene<P: AsRef<Path>>(scene: &Scene, path: P, tooltip: &TooltipConfig) -> Result<()> {
    let path = path.as_ref();
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("svg") => svg::save_svg(scene, path, tooltip),
        Some("png") => bitmap::save_png(scene, path),
        other => Err(VizError::Render(format!(
            "unsupported output extension {:?} (use .svg or .png)",
            other.unwrap_or("")
        ))),
    }
}
