//! Raster output through `plotters`' bitmap backend.
//!
//! Shapes are always drawn. The `ab_glyph` text path cannot discover system
//! fonts, so text marks are only drawn once a TTF file has been registered
//! with [`register_font_file`]; the GUI draws text itself.

use crate::color::Rgb;
use crate::error::{Result, VizError};
use crate::scene::{Anchor, Mark, MarkId, Point, Scene, Shape, Style};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontStyle, FontTransform};
use plotters_bitmap::BitMapBackend;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

static FONT_READY: AtomicBool = AtomicBool::new(false);

/// Register a TTF file as the `sans-serif` family used for text marks.
///
/// The font bytes live for the rest of the process.
pub fn register_font_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let bytes: &'static [u8] = Box::leak(std::fs::read(path)?.into_boxed_slice());
    plotters::style::register_font("sans-serif", FontStyle::Normal, bytes)
        .map_err(|_| VizError::Render(format!("font {}: invalid font data", path.display())))?;
    FONT_READY.store(true, Ordering::Release);
    log::info!("registered font {}", path.display());
    Ok(())
}

pub fn font_registered() -> bool {
    FONT_READY.load(Ordering::Acquire)
}

/// Render `scene` to a PNG file.
pub fn save_png<P: AsRef<Path>>(scene: &Scene, path: P) -> Result<()> {
    let path = path.as_ref();
    let (w, h) = pixel_size(scene);
    let root = BitMapBackend::new(path, (w, h)).into_drawing_area();
    draw_scene(&root, scene, None)?;
    root.present().map_err(render_err)?;
    if !font_registered() {
        log::warn!("no font registered; {} has no text (pass --font)", path.display());
    }
    Ok(())
}

/// Rasterize into an RGB buffer of `width * height * 3` bytes, outlining `hovered`
/// with the scene's highlight style.
pub fn rasterize(scene: &Scene, buf: &mut [u8], hovered: Option<MarkId>) -> Result<()> {
    let (w, h) = pixel_size(scene);
    if buf.len() != (w * h * 3) as usize {
        return Err(VizError::Render(format!(
            "buffer of {} bytes does not fit {w}x{h}",
            buf.len()
        )));
    }
    let root = BitMapBackend::with_buffer(buf, (w, h)).into_drawing_area();
    draw_scene(&root, scene, hovered)?;
    root.present().map_err(render_err)?;
    Ok(())
}

pub fn pixel_size(scene: &Scene) -> (u32, u32) {
    (
        scene.width.ceil().max(1.0) as u32,
        scene.height.ceil().max(1.0) as u32,
    )
}

fn render_err<E: std::fmt::Debug>(e: E) -> VizError {
    VizError::Render(format!("{e:?}"))
}

fn rgb(c: Rgb) -> RGBColor {
    RGBColor(c.r, c.g, c.b)
}

fn px(p: Point) -> (i32, i32) {
    (p.0.round() as i32, p.1.round() as i32)
}

/// Split a polyline into dash segments of `dash` px separated by `gap` px.
fn dash_polyline(points: &[Point], dash: f64, gap: f64) -> Vec<Vec<Point>> {
    let mut out = Vec::new();
    if dash <= 0.0 {
        return vec![points.to_vec()];
    }
    let mut current: Vec<Point> = Vec::new();
    let mut on = true;
    let mut left = dash;
    for w in points.windows(2) {
        let (mut a, b) = (w[0], w[1]);
        let mut seg = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
        while seg > 0.0 {
            let step = left.min(seg);
            let t = step / seg;
            let next = (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t);
            if on {
                if current.is_empty() {
                    current.push(a);
                }
                current.push(next);
            }
            a = next;
            seg -= step;
            left -= step;
            if left <= 1e-9 {
                if on {
                    out.push(std::mem::take(&mut current));
                }
                on = !on;
                left = if on { dash } else { gap };
            }
        }
    }
    if current.len() >= 2 {
        out.push(current);
    }
    out
}

fn circle_outline(center: Point, r: f64) -> Vec<Point> {
    let steps = ((r * 0.5).ceil() as usize).clamp(24, 720);
    (0..=steps)
        .map(|i| {
            let a = i as f64 / steps as f64 * std::f64::consts::TAU;
            (center.0 + r * a.cos(), center.1 + r * a.sin())
        })
        .collect()
}

fn draw_err<DB: DrawingBackend>(e: DrawingAreaErrorKind<DB::ErrorType>) -> VizError {
    render_err(e)
}

fn stroke_lines<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    points: &[Point],
    style: &Style,
) -> Result<()> {
    let Some(color) = style.stroke else {
        return Ok(());
    };
    let stroke = rgb(color).stroke_width(style.stroke_width.round().max(1.0) as u32);
    let pieces = match style.dash {
        Some((dash, gap)) => dash_polyline(points, dash, gap),
        None => vec![points.to_vec()],
    };
    for piece in pieces {
        root.draw(&PathElement::new(
            piece.into_iter().map(px).collect::<Vec<_>>(),
            stroke,
        ))
        .map_err(draw_err::<DB>)?;
    }
    Ok(())
}

fn fill_polygon<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    points: &[Point],
    style: &Style,
) -> Result<()> {
    if let Some(color) = style.fill
        && points.len() >= 3
    {
        let fill = rgb(color).mix(style.fill_opacity).filled();
        root.draw(&Polygon::new(
            points.iter().copied().map(px).collect::<Vec<_>>(),
            fill,
        ))
        .map_err(draw_err::<DB>)?;
    }
    Ok(())
}

fn draw_mark<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, mark: &Mark, style: &Style) -> Result<()> {
    match &mark.shape {
        Shape::Rect { x, y, w, h } => {
            let corners = [px((*x, *y)), px((x + w, y + h))];
            if let Some(c) = style.fill {
                root.draw(&Rectangle::new(corners, rgb(c).mix(style.fill_opacity).filled()))
                    .map_err(draw_err::<DB>)?;
            }
            if style.stroke.is_some() {
                let outline = [(*x, *y), (x + w, *y), (x + w, y + h), (*x, y + h), (*x, *y)];
                stroke_lines(root, &outline, style)?;
            }
        }
        Shape::Circle { center, r } => {
            if let Some(c) = style.fill {
                root.draw(&Circle::new(
                    px(*center),
                    r.round().max(1.0) as i32,
                    rgb(c).mix(style.fill_opacity).filled(),
                ))
                .map_err(draw_err::<DB>)?;
            }
            if style.stroke.is_some() {
                stroke_lines(root, &circle_outline(*center, *r), style)?;
            }
        }
        Shape::Line { from, to } => stroke_lines(root, &[*from, *to], style)?,
        Shape::Path { points, closed } => {
            fill_polygon(root, points, style)?;
            let mut outline = points.clone();
            if *closed && let Some(first) = points.first() {
                outline.push(*first);
            }
            stroke_lines(root, &outline, style)?;
        }
        // Rings are filled one by one; holes are covered rather than punched out.
        Shape::Rings(rings) => {
            for ring in rings {
                fill_polygon(root, ring, style)?;
            }
            for ring in rings {
                let mut outline = ring.clone();
                if let Some(first) = ring.first() {
                    outline.push(*first);
                }
                stroke_lines(root, &outline, style)?;
            }
        }
        Shape::Text {
            at,
            text,
            size,
            anchor,
            rotate,
        } => {
            if !font_registered() {
                return Ok(());
            }
            let h = match anchor {
                Anchor::Start => HPos::Left,
                Anchor::Middle => HPos::Center,
                Anchor::End => HPos::Right,
            };
            let color = rgb(style.fill.unwrap_or(Rgb::BLACK));
            let mut text_style = TextStyle::from(("sans-serif", *size).into_font())
                .color(&color)
                .pos(Pos::new(h, VPos::Bottom));
            let quarter_turns = ((rotate / 90.0).round() as i64).rem_euclid(4);
            text_style = match quarter_turns {
                1 => text_style.transform(FontTransform::Rotate90),
                2 => text_style.transform(FontTransform::Rotate180),
                3 => text_style.transform(FontTransform::Rotate270),
                _ => text_style,
            };
            root.draw(&Text::new(text.clone(), px(*at), text_style))
                .map_err(draw_err::<DB>)?;
        }
    }
    Ok(())
}

/// Draw every mark in order onto `root`.
pub fn draw_scene<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scene: &Scene,
    hovered: Option<MarkId>,
) -> Result<()> {
    root.fill(&WHITE).map_err(draw_err::<DB>)?;
    for mark in scene.marks() {
        match (&scene.highlight, hovered) {
            (Some(hl), Some(id)) if id == mark.id => {
                let style = Style {
                    stroke: Some(hl.stroke),
                    stroke_width: hl.stroke_width,
                    ..mark.style.clone()
                };
                draw_mark(root, mark, &style)?;
            }
            _ => draw_mark(root, mark, &mark.style)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashes_alternate() {
        let pieces = dash_polyline(&[(0.0, 0.0), (10.0, 0.0)], 2.0, 2.0);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0], vec![(0.0, 0.0), (2.0, 0.0)]);
        assert_eq!(pieces[1].first(), Some(&(4.0, 0.0)));
    }

    #[test]
    fn rasterizes_into_buffer() {
        let mut scene = Scene::new(20.0, 10.0, "t");
        scene.push(
            crate::scene::Role::Background,
            "bg",
            Shape::Rect { x: 0.0, y: 0.0, w: 20.0, h: 10.0 },
            Style::fill(Rgb::new(255, 0, 0)),
        );
        let mut buf = vec![0u8; 20 * 10 * 3];
        rasterize(&scene, &mut buf, None).unwrap();
        assert_eq!(&buf[0..3], &[255, 0, 0]);
        assert!(rasterize(&scene, &mut [0u8; 5], None).is_err());
    }
}
