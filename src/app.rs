//! Application state: owns the loaded data, the selection control, the current
//! scene and the tooltip, and is the only place any of them change.
//!
//! Front ends (CLI, GUI) translate input into [`UiEvent`]s and read the
//! resulting scene back. A selection change rebuilds the whole scene.

use crate::config::VizConfig;
use crate::error::{Result, VizError};
use crate::geo::ChoroplethData;
use crate::models::{Dataset, MergedRecord};
use crate::scene::{MarkId, Point, Scene};
use crate::selection::{ALL, CheckboxSelection, DropdownSelection, SelectionState};
use crate::tooltip::TooltipPresenter;
use crate::viz::{ChartKind, build_choropleth, build_dual_axis, build_radar};
use std::time::Instant;

/// Loaded data of one chart.
#[derive(Debug, Clone)]
pub enum ChartData {
    Radar(Dataset),
    Choropleth(ChoroplethData),
    DualAxis(Vec<MergedRecord>),
}

impl ChartData {
    pub fn kind(&self) -> ChartKind {
        match self {
            ChartData::Radar(_) => ChartKind::Radar,
            ChartData::Choropleth(_) => ChartKind::Choropleth,
            ChartData::DualAxis(_) => ChartKind::DualAxis,
        }
    }
}

#[derive(Debug, Clone)]
enum Control {
    Checkboxes(CheckboxSelection),
    Dropdown(DropdownSelection),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// A checkbox changed (radar).
    Toggle { value: String, checked: bool },
    /// A dropdown value was chosen (map year, dual-axis country).
    Choose(String),
    /// Pointer position in scene coordinates.
    PointerMoved(Point),
    PointerLeft,
    /// Advance tooltip timers.
    Tick,
}

#[derive(Debug, Clone)]
pub struct AppState {
    cfg: VizConfig,
    data: ChartData,
    control: Control,
    scene: Scene,
    tooltip: TooltipPresenter,
    hovered: Option<MarkId>,
}

impl AppState {
    /// Set up the default selection and build the first scene.
    ///
    /// Radar starts with nothing checked (every country), the map with the
    /// configured year (or the latest one), the dual-axis chart with the
    /// first merged country.
    pub fn new(data: ChartData, cfg: VizConfig) -> Result<Self> {
        let control = match &data {
            ChartData::Radar(ds) => {
                if ds.is_empty() {
                    return Err(VizError::EmptyDataset);
                }
                Control::Checkboxes(CheckboxSelection::new())
            }
            ChartData::Choropleth(map) => {
                let years: Vec<String> = map.years().iter().map(i32::to_string).collect();
                let mut dd = DropdownSelection::new(years)?;
                if let Some(y) = map.initial_year(&cfg.map.default_year) {
                    dd.choose(&y.to_string())?;
                }
                Control::Dropdown(dd)
            }
            ChartData::DualAxis(records) => Control::Dropdown(DropdownSelection::new(
                records.iter().map(|r| r.name().to_string()).collect(),
            )?),
        };
        let tooltip = TooltipPresenter::new(&cfg.tooltip);
        let mut app = Self {
            cfg,
            data,
            control,
            scene: Scene::new(0.0, 0.0, ""),
            tooltip,
            hovered: None,
        };
        app.rebuild()?;
        Ok(app)
    }

    pub fn kind(&self) -> ChartKind {
        self.data.kind()
    }

    pub fn config(&self) -> &VizConfig {
        &self.cfg
    }

    pub fn data(&self) -> &ChartData {
        &self.data
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn tooltip(&self) -> &TooltipPresenter {
        &self.tooltip
    }

    pub fn hovered(&self) -> Option<MarkId> {
        self.hovered
    }

    /// Values offered by the control: `All` plus every country for the
    /// radar checkboxes, the dropdown options otherwise.
    pub fn options(&self) -> Vec<String> {
        match (&self.control, &self.data) {
            (Control::Checkboxes(_), ChartData::Radar(ds)) => std::iter::once(ALL.to_string())
                .chain(ds.names().into_iter().map(str::to_string))
                .collect(),
            (Control::Checkboxes(_), _) => vec![ALL.to_string()],
            (Control::Dropdown(dd), _) => dd.options().to_vec(),
        }
    }

    pub fn is_checked(&self, value: &str) -> bool {
        match &self.control {
            Control::Checkboxes(cb) => cb.is_checked(value),
            Control::Dropdown(dd) => dd.selected() == value,
        }
    }

    /// Current dropdown value; `None` for checkbox charts.
    pub fn selected(&self) -> Option<&str> {
        match &self.control {
            Control::Dropdown(dd) => Some(dd.selected()),
            Control::Checkboxes(_) => None,
        }
    }

    pub fn selection(&self) -> SelectionState {
        match &self.control {
            Control::Checkboxes(cb) => cb.state(),
            Control::Dropdown(dd) => dd.state(),
        }
    }

    /// Apply one event. Returns `true` when the view needs repainting.
    pub fn handle(&mut self, event: UiEvent, now: Instant) -> Result<bool> {
        match event {
            UiEvent::Toggle { value, checked } => match &mut self.control {
                Control::Checkboxes(cb) => {
                    if cb.set(&value, checked) {
                        log::debug!("checkbox {value} -> {checked}");
                        self.rebuild()?;
                        return Ok(true);
                    }
                    Ok(false)
                }
                Control::Dropdown(_) => {
                    log::debug!("ignoring checkbox event on a dropdown chart");
                    Ok(false)
                }
            },
            UiEvent::Choose(value) => match &mut self.control {
                Control::Dropdown(dd) => {
                    if dd.choose(&value)? {
                        log::debug!("selected {value}");
                        self.rebuild()?;
                        return Ok(true);
                    }
                    Ok(false)
                }
                Control::Checkboxes(_) => Err(VizError::UnknownOption(value)),
            },
            UiEvent::PointerMoved(p) => Ok(self.hover(p, now)),
            UiEvent::PointerLeft => {
                if self.hovered.take().is_some() {
                    self.tooltip.leave(now);
                    return Ok(true);
                }
                Ok(false)
            }
            UiEvent::Tick => {
                let was_visible = self.tooltip.is_visible();
                let animating = self.tooltip.tick(now);
                Ok(animating || was_visible != self.tooltip.is_visible())
            }
        }
    }

    fn hover(&mut self, p: Point, now: Instant) -> bool {
        match (self.scene.hit_test(p), self.hovered) {
            (Some(id), Some(current)) if id == current => {
                self.tooltip.move_to(p);
                true
            }
            (Some(id), _) => {
                if let Some(content) = self.scene.tooltip(id) {
                    self.tooltip.enter(id, content.clone(), p, now);
                }
                self.hovered = Some(id);
                true
            }
            (None, Some(_)) => {
                self.hovered = None;
                self.tooltip.leave(now);
                true
            }
            (None, None) => {
                self.tooltip.move_to(p);
                false
            }
        }
    }

    fn rebuild(&mut self) -> Result<()> {
        self.tooltip.reset();
        self.hovered = None;
        self.scene = match (&self.data, &self.control) {
            (ChartData::Radar(ds), Control::Checkboxes(cb)) => {
                build_radar(ds, &cb.state(), cb.checked_values(), &self.cfg)
            }
            (ChartData::Choropleth(map), Control::Dropdown(dd)) => {
                let year = dd
                    .selected()
                    .parse::<i32>()
                    .map_err(|_| VizError::UnknownOption(dd.selected().to_string()))?;
                build_choropleth(map, year, &self.cfg)
            }
            (ChartData::DualAxis(records), Control::Dropdown(dd)) => {
                build_dual_axis(records, dd.selected(), &self.cfg)?
            }
            _ => return Err(VizError::Render("selection control does not match chart".into())),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Entity;
    use crate::scene::Role;

    fn radar_app() -> AppState {
        let mut ds = Dataset::new();
        for (name, v) in [("A", 10.0), ("B", 20.0), ("C", 30.0)] {
            ds.upsert(Entity::new(name), 2010, Some(v));
        }
        AppState::new(ChartData::Radar(ds), VizConfig::default()).unwrap()
    }

    #[test]
    fn toggles_rebuild_the_scene() {
        let mut app = radar_app();
        let now = Instant::now();
        assert_eq!(app.scene().series_entities(), ["A", "B", "C"]);
        assert!(app.handle(UiEvent::Toggle { value: "B".into(), checked: true }, now).unwrap());
        assert_eq!(app.scene().series_entities(), ["B"]);
        assert!(!app.handle(UiEvent::Toggle { value: "B".into(), checked: true }, now).unwrap());
        assert!(app.handle(UiEvent::Choose("B".into()), now).is_err());
        assert_eq!(app.options()[0], ALL);
    }

    #[test]
    fn hovering_a_marker_shows_its_tooltip() {
        let mut app = radar_app();
        let now = Instant::now();
        let marker = app
            .scene()
            .marks_with_role(Role::Marker)
            .find(|m| m.entity.as_deref() == Some("C"))
            .cloned()
            .unwrap();
        let crate::scene::Shape::Circle { center, .. } = marker.shape else {
            panic!("marker is a circle");
        };
        assert!(app.handle(UiEvent::PointerMoved(center), now).unwrap());
        assert_eq!(app.hovered(), Some(marker.id));
        let text = app.tooltip().content().unwrap().text();
        assert!(text.starts_with("Country: C"), "{text}");
        app.handle(UiEvent::PointerLeft, now).unwrap();
        assert!(app.tooltip().is_visible());
        app.handle(UiEvent::Tick, now + std::time::Duration::from_secs(1)).unwrap();
        assert!(!app.tooltip().is_visible());
    }
}
