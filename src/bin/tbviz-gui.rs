/*!
 * Desktop viewer for tbviz - tuberculosis incidence and drug sales charts
 *
 * - Radar chart of drug sales with a country checkbox list
 * - Choropleth world map of TB incidence with a year dropdown
 * - Dual-axis incidence/sales chart with a country dropdown
 *
 * Hovering a marker or a country shows its tooltip; charts can be saved as SVG or PNG.
 */

use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tbviz::render::{self, bitmap};
use tbviz::scene::{Anchor, Shape};
use tbviz::viz::ChartKind;
use tbviz::{AppState, ChartData, Fetcher, UiEvent, VizConfig, loader};

fn main() -> Result<(), eframe::Error> {
    // Enable logging for better debugging
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([800.0, 500.0])
            .with_title("TB incidence and drug sales - tbviz"),
        ..Default::default()
    };

    eframe::run_native(
        "tbviz",
        options,
        Box::new(|_cc| Ok(Box::new(VizApp::new()))),
    )
}

#[derive(Debug)]
enum OperationResult {
    Loaded(Box<AppState>, String),
    Error(ChartKind, String),
    Done,
}

/// Main application state
struct VizApp {
    data_dir: String,
    config_path: String,
    tab: ChartKind,
    charts: Vec<AppState>,

    // Canvas
    texture: Option<egui::TextureHandle>,
    dirty: bool,
    pointer_inside: bool,

    // Fullscreen request awaiting confirmation from the window system
    fullscreen_request: Option<(bool, Instant)>,

    // UI state
    is_loading: bool,
    status_message: String,
    error_message: String,

    // Background operation
    operation_receiver: Option<mpsc::Receiver<OperationResult>>,
}

impl VizApp {
    fn new() -> Self {
        // Data lives next to the working directory by default
        let data_dir = std::env::current_dir()
            .or_else(|_| dirs::home_dir().ok_or(()))
            .unwrap_or_else(|_| PathBuf::from("."))
            .to_string_lossy()
            .to_string();

        let mut app = Self {
            data_dir,
            config_path: String::new(),
            tab: ChartKind::Radar,
            charts: Vec::new(),
            texture: None,
            dirty: true,
            pointer_inside: false,
            fullscreen_request: None,
            is_loading: false,
            status_message: String::new(),
            error_message: String::new(),
            operation_receiver: None,
        };
        app.start_loading();
        app
    }

    fn current(&self) -> Option<&AppState> {
        self.charts.iter().find(|c| c.kind() == self.tab)
    }

    fn current_mut(&mut self) -> Option<&mut AppState> {
        let tab = self.tab;
        self.charts.iter_mut().find(|c| c.kind() == tab)
    }

    fn load_config(&self) -> anyhow::Result<VizConfig> {
        let path = self.config_path.trim();
        let path = (!path.is_empty()).then_some(path);
        Ok(VizConfig::load_or_default(path)?)
    }

    fn start_loading(&mut self) {
        let cfg = match self.load_config() {
            Ok(cfg) => cfg,
            Err(err) => {
                self.error_message = format!("Config error: {}", err);
                return;
            }
        };
        self.is_loading = true;
        self.error_message.clear();
        self.status_message = "Loading data files...".to_string();
        self.charts.clear();
        self.dirty = true;

        let (sender, receiver) = mpsc::channel();
        self.operation_receiver = Some(receiver);
        let data_dir = PathBuf::from(self.data_dir.trim());

        // Spawn background thread for the operation
        thread::spawn(move || {
            let fetcher = Fetcher::default().with_base_dir(data_dir);
            for kind in ChartKind::ALL {
                let _ = sender.send(load_chart(kind, &fetcher, &cfg));
            }
            let _ = sender.send(OperationResult::Done);
        });
    }

    fn check_operation_result(&mut self) {
        let Some(receiver) = &self.operation_receiver else {
            return;
        };
        let mut messages = Vec::new();
        let mut done = false;
        while let Ok(result) = receiver.try_recv() {
            match result {
                OperationResult::Loaded(app, summary) => {
                    messages.push(summary);
                    self.charts.push(*app);
                    self.dirty = true;
                }
                OperationResult::Error(kind, error) => {
                    push_error(&mut self.error_message, &format!("{}: {}", kind.title(), error));
                }
                OperationResult::Done => done = true,
            }
        }
        if !messages.is_empty() {
            self.status_message = messages.join("  ");
        }
        if done {
            self.is_loading = false;
            self.operation_receiver = None;
        }
    }

    fn dispatch(&mut self, event: UiEvent) {
        let Some(app) = self.current_mut() else {
            return;
        };
        let hovered = app.hovered();
        let rebuilds = matches!(event, UiEvent::Toggle { .. } | UiEvent::Choose(_));
        match app.handle(event, Instant::now()) {
            Ok(changed) => {
                let hover_changed = app.hovered() != hovered;
                if (changed && rebuilds) || hover_changed {
                    self.dirty = true;
                }
            }
            Err(err) => self.error_message = err.to_string(),
        }
    }

    fn save_current(&mut self) {
        let Some(app) = self.current() else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter("SVG", &["svg"])
            .add_filter("PNG", &["png"])
            .set_file_name("chart.svg")
            .save_file()
        else {
            return;
        };
        match render::save_scene(app.scene(), &path, &app.config().tooltip) {
            Ok(()) => self.status_message = format!("Saved {}", path.display()),
            Err(err) => self.error_message = format!("Save failed: {}", err),
        }
    }

    fn toggle_fullscreen(&mut self, ctx: &egui::Context) {
        let now_full = ctx.input(|i| i.viewport().fullscreen.unwrap_or(false));
        ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(!now_full));
        self.fullscreen_request = Some((!now_full, Instant::now()));
    }

    fn check_fullscreen(&mut self, ctx: &egui::Context) {
        if let Some((wanted, since)) = self.fullscreen_request {
            let actual = ctx.input(|i| i.viewport().fullscreen);
            if actual == Some(wanted) {
                self.fullscreen_request = None;
            } else if since.elapsed() > Duration::from_secs(1) {
                self.fullscreen_request = None;
                self.error_message = "Fullscreen mode was refused by the window system".to_string();
            } else {
                ctx.request_repaint_after(Duration::from_millis(100));
            }
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        let Some(app) = self.current() else {
            ui.label("No data loaded");
            return;
        };
        let options = app.options();
        let mut events = Vec::new();
        match app.selected() {
            None => {
                ui.label("Countries");
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for value in options {
                        let mut checked = app.is_checked(&value);
                        if ui.checkbox(&mut checked, &value).changed() {
                            events.push(UiEvent::Toggle { value, checked });
                        }
                    }
                });
            }
            Some(selected) => {
                let label = match app.kind() {
                    ChartKind::Choropleth => "Year",
                    _ => "Country",
                };
                let mut choice = selected.to_string();
                egui::ComboBox::from_label(label)
                    .selected_text(&choice)
                    .height(400.0)
                    .show_ui(ui, |ui| {
                        for value in &options {
                            ui.selectable_value(&mut choice, value.clone(), value);
                        }
                    });
                if choice != selected {
                    events.push(UiEvent::Choose(choice));
                }
            }
        }
        for event in events {
            self.dispatch(event);
        }
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let tab = self.tab;
        let Some(idx) = self.charts.iter().position(|c| c.kind() == tab) else {
            if self.is_loading {
                ui.spinner();
            }
            return;
        };
        let app = &self.charts[idx];
        let scene = app.scene();
        let (w, h) = bitmap::pixel_size(scene);
        let avail = ui.available_size();
        let scale = (avail.x / w as f32).min(avail.y / h as f32).clamp(0.1, 2.0);

        if self.dirty || self.texture.is_none() {
            let mut buf = vec![0u8; (w * h * 3) as usize];
            match bitmap::rasterize(scene, &mut buf, app.hovered()) {
                Ok(()) => {
                    let image = egui::ColorImage::from_rgb([w as usize, h as usize], &buf);
                    if let Some(texture) = &mut self.texture {
                        texture.set(image, egui::TextureOptions::LINEAR);
                    } else {
                        self.texture = Some(ui.ctx().load_texture(
                            "chart",
                            image,
                            egui::TextureOptions::LINEAR,
                        ));
                    }
                }
                Err(err) => self.error_message = err.to_string(),
            }
            self.dirty = false;
        }
        let Some(texture) = &self.texture else {
            return;
        };

        let size = egui::vec2(w as f32 * scale, h as f32 * scale);
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::hover());
        let painter = ui.painter_at(rect);
        painter.image(
            texture.id(),
            rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        // Text is laid out by egui on top of the raster.
        for mark in scene.marks() {
            let Shape::Text {
                at,
                text,
                size,
                anchor,
                rotate,
            } = &mark.shape
            else {
                continue;
            };
            let color = mark
                .style
                .fill
                .map(|c| egui::Color32::from_rgb(c.r, c.g, c.b))
                .unwrap_or(egui::Color32::BLACK);
            let pos = rect.min + egui::vec2(at.0 as f32, at.1 as f32) * scale;
            let font = egui::FontId::proportional(*size as f32 * scale);
            if *rotate == 0.0 {
                let align = match anchor {
                    Anchor::Start => egui::Align2::LEFT_BOTTOM,
                    Anchor::Middle => egui::Align2::CENTER_BOTTOM,
                    Anchor::End => egui::Align2::RIGHT_BOTTOM,
                };
                painter.text(pos, align, text, font, color);
            } else {
                let galley = painter.layout_no_wrap(text.clone(), font, color);
                let (gw, gh) = (galley.size().x, galley.size().y);
                let origin = pos + egui::vec2(-gh, gw / 2.0);
                painter.add(
                    egui::epaint::TextShape::new(origin, galley, color)
                        .with_angle((*rotate as f32).to_radians()),
                );
            }
        }

        let pointer = response.hover_pos().map(|p| (p - rect.min) / scale);
        let tooltip = app.tooltip();
        if let (Some(content), Some(pos)) = (tooltip.content(), tooltip.position()) {
            let opacity = tooltip.opacity(Instant::now());
            let at = rect.min + egui::vec2(pos.0 as f32, pos.1 as f32) * scale;
            egui::Area::new(egui::Id::new("chart-tooltip"))
                .fixed_pos(at)
                .order(egui::Order::Tooltip)
                .interactable(false)
                .show(ui.ctx(), |ui| {
                    ui.set_opacity(opacity);
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        for line in &content.lines {
                            ui.label(line);
                        }
                    });
                });
        }

        match pointer {
            Some(local) => {
                self.pointer_inside = true;
                self.dispatch(UiEvent::PointerMoved((local.x as f64, local.y as f64)));
            }
            None if self.pointer_inside => {
                self.pointer_inside = false;
                self.dispatch(UiEvent::PointerLeft);
            }
            None => {}
        }
    }
}

impl eframe::App for VizApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for completed background operations
        self.check_operation_result();
        self.check_fullscreen(ctx);
        self.dispatch(UiEvent::Tick);

        // Request repaint if loading (for spinner animation) or while a tooltip is shown
        if self.is_loading {
            ctx.request_repaint();
        }
        if self.current().is_some_and(|a| a.tooltip().is_visible()) {
            ctx.request_repaint_after(Duration::from_millis(30));
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Data folder:");
                ui.text_edit_singleline(&mut self.data_dir);
                if ui.button("Browse").clicked()
                    && let Some(path) = rfd::FileDialog::new().pick_folder()
                {
                    self.data_dir = path.to_string_lossy().to_string();
                }
                ui.label("Config:");
                ui.text_edit_singleline(&mut self.config_path)
                    .on_hover_text("Optional JSON config file");
                if ui
                    .add_enabled(!self.is_loading, egui::Button::new("Reload"))
                    .clicked()
                {
                    self.start_loading();
                }
                if self.is_loading {
                    ui.spinner();
                }
            });
            ui.horizontal(|ui| {
                for kind in ChartKind::ALL {
                    if ui.selectable_value(&mut self.tab, kind, kind.title()).changed() {
                        self.dirty = true;
                        self.pointer_inside = false;
                    }
                }
                ui.separator();
                if ui.button("Fullscreen").clicked() {
                    self.toggle_fullscreen(ctx);
                }
                if ui.add_enabled(self.current().is_some(), egui::Button::new("Save chart...")).clicked() {
                    self.save_current();
                }
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            // Status messages
            if !self.status_message.is_empty() {
                ui.colored_label(egui::Color32::DARK_GREEN, &self.status_message);
            }
            if !self.error_message.is_empty() {
                ui.colored_label(egui::Color32::RED, &self.error_message);
            }
        });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(200.0)
            .show(ctx, |ui| self.controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.canvas(ui));

        // Hover changes are rasterized on the next frame
        if self.dirty {
            ctx.request_repaint();
        }
    }
}

fn load_chart(kind: ChartKind, fetcher: &Fetcher, cfg: &VizConfig) -> OperationResult {
    let loaded = match kind {
        ChartKind::Radar => loader::load_sales(fetcher, cfg).map(|(d, r)| (ChartData::Radar(d), r)),
        ChartKind::Choropleth => {
            loader::load_map(fetcher, cfg).map(|(d, r)| (ChartData::Choropleth(d), r))
        }
        ChartKind::DualAxis => {
            loader::load_dual(fetcher, cfg).map(|(d, r)| (ChartData::DualAxis(d), r))
        }
    };
    let result = loaded.and_then(|(data, report)| {
        let summary = format!(
            "{}: {} rows, {} issues.",
            kind.title(),
            report.rows,
            report.issues.len() + report.join_misses.len()
        );
        AppState::new(data, cfg.clone()).map(|app| (app, summary))
    });
    match result {
        Ok((app, summary)) => OperationResult::Loaded(Box::new(app), summary),
        Err(err) => {
            log::error!("loading {:?}: {err}", kind);
            OperationResult::Error(kind, err.to_string())
        }
    }
}

// Several charts can fail in one load; keep every message.
fn push_error(shown: &mut String, message: &str) {
    if !shown.is_empty() {
        shown.push('\n');
    }
    shown.push_str(message);
}
