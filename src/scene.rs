//! Backend-neutral drawing: a list of marks in canvas pixels plus the tooltip
//! dispatch table keyed by mark identity.
//!
//! Charts build a fresh [`Scene`] on every change; exporters (SVG, bitmap)
//! and the GUI only read it.

use crate::color::Rgb;
use std::collections::BTreeMap;

/// Pointer tolerance around marks, in pixels.
const HIT_SLACK: f64 = 2.0;

pub type Point = (f64, f64);

/// Identity of one drawn element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    },
    Circle {
        center: Point,
        r: f64,
    },
    Line {
        from: Point,
        to: Point,
    },
    /// Polyline, closed when `closed`.
    Path {
        points: Vec<Point>,
        closed: bool,
    },
    /// Several closed rings filled with the even-odd rule (country outlines).
    Rings(Vec<Vec<Point>>),
    Text {
        at: Point,
        text: String,
        size: f64,
        anchor: Anchor,
        /// Degrees, clockwise.
        rotate: f64,
    },
}

impl Shape {
    /// Whether `p` hits the shape; `slack` widens strokes and circles.
    pub fn contains(&self, p: Point, slack: f64) -> bool {
        match self {
            Shape::Rect { x, y, w, h } => {
                p.0 >= *x && p.0 <= x + w && p.1 >= *y && p.1 <= y + h
            }
            Shape::Circle { center, r } => {
                let (dx, dy) = (p.0 - center.0, p.1 - center.1);
                dx * dx + dy * dy <= (r + slack) * (r + slack)
            }
            Shape::Line { from, to } => segment_distance(p, *from, *to) <= slack,
            Shape::Path { points, closed } => {
                if *closed && points.len() >= 3 && ring_contains(points, p) {
                    return true;
                }
                points
                    .windows(2)
                    .any(|w| segment_distance(p, w[0], w[1]) <= slack)
            }
            Shape::Rings(rings) => {
                rings.iter().filter(|r| ring_contains(r, p)).count() % 2 == 1
            }
            Shape::Text { .. } => false,
        }
    }
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (vx, vy) = (b.0 - a.0, b.1 - a.1);
    let len2 = vx * vx + vy * vy;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * vx + (p.1 - a.1) * vy) / len2).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * vx, a.1 + t * vy);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

/// Crossing-number test.
fn ring_contains(ring: &[Point], p: Point) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > p.1) != (yj > p.1) && p.0 < (xj - xi) * (p.1 - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub fill: Option<Rgb>,
    pub fill_opacity: f64,
    pub stroke: Option<Rgb>,
    pub stroke_width: f64,
    /// Dash and gap length.
    pub dash: Option<(f64, f64)>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: None,
            fill_opacity: 1.0,
            stroke: None,
            stroke_width: 1.0,
            dash: None,
        }
    }
}

impl Style {
    pub fn fill(color: Rgb) -> Self {
        Self {
            fill: Some(color),
            ..Self::default()
        }
    }

    pub fn stroke(color: Rgb, width: f64) -> Self {
        Self {
            stroke: Some(color),
            stroke_width: width,
            ..Self::default()
        }
    }

    pub fn with_fill(mut self, color: Rgb, opacity: f64) -> Self {
        self.fill = Some(color);
        self.fill_opacity = opacity;
        self
    }

    pub fn dashed(mut self, dash: f64, gap: f64) -> Self {
        self.dash = Some((dash, gap));
        self
    }
}

/// What a mark represents, used for counting rendered series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Background,
    Grid,
    Axis,
    Label,
    Legend,
    /// The path/shape of one entity.
    Series,
    /// One interactive data point.
    Marker,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    pub id: MarkId,
    pub role: Role,
    /// CSS-like class, e.g. `dotTB` or `grid-circle`.
    pub class: String,
    /// Entity the mark belongs to, if any.
    pub entity: Option<String>,
    pub shape: Shape,
    pub style: Style,
}

/// Text shown while hovering a mark, one entry per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipContent {
    pub lines: Vec<String>,
    /// Pointer offset of the floating label.
    pub offset: (i32, i32),
}

impl TooltipContent {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Style applied to a hovered mark.
#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    pub stroke: Rgb,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub title: String,
    marks: Vec<Mark>,
    tooltips: BTreeMap<MarkId, TooltipContent>,
    pub highlight: Option<Highlight>,
}

impl Scene {
    pub fn new(width: f64, height: f64, title: impl Into<String>) -> Self {
        Self {
            width,
            height,
            title: title.into(),
            marks: Vec::new(),
            tooltips: BTreeMap::new(),
            highlight: None,
        }
    }

    /// Append a mark; later marks are drawn on top.
    pub fn push(&mut self, role: Role, class: &str, shape: Shape, style: Style) -> MarkId {
        let id = MarkId(self.marks.len() as u32);
        self.marks.push(Mark {
            id,
            role,
            class: class.to_string(),
            entity: None,
            shape,
            style,
        });
        id
    }

    /// Append a mark that belongs to an entity.
    pub fn push_for(
        &mut self,
        entity: &str,
        role: Role,
        class: &str,
        shape: Shape,
        style: Style,
    ) -> MarkId {
        let id = self.push(role, class, shape, style);
        self.marks[id.0 as usize].entity = Some(entity.to_string());
        id
    }

    pub fn text(&mut self, class: &str, at: Point, text: impl Into<String>, size: f64, anchor: Anchor) -> MarkId {
        self.push(
            Role::Label,
            class,
            Shape::Text {
                at,
                text: text.into(),
                size,
                anchor,
                rotate: 0.0,
            },
            Style::fill(Rgb::BLACK),
        )
    }

    pub fn attach_tooltip(&mut self, id: MarkId, content: TooltipContent) {
        self.tooltips.insert(id, content);
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn mark(&self, id: MarkId) -> Option<&Mark> {
        self.marks.get(id.0 as usize)
    }

    pub fn mark_mut(&mut self, id: MarkId) -> Option<&mut Mark> {
        self.marks.get_mut(id.0 as usize)
    }

    pub fn tooltip(&self, id: MarkId) -> Option<&TooltipContent> {
        self.tooltips.get(&id)
    }

    pub fn tooltips(&self) -> &BTreeMap<MarkId, TooltipContent> {
        &self.tooltips
    }

    /// Topmost mark with a tooltip under `p`.
    pub fn hit_test(&self, p: Point) -> Option<MarkId> {
        // A mark under the pointer beats the halo of a later one.
        [0.0, HIT_SLACK].into_iter().find_map(|slack| {
            self.marks
                .iter()
                .rev()
                .filter(|m| self.tooltips.contains_key(&m.id))
                .find(|m| m.shape.contains(p, slack))
                .map(|m| m.id)
        })
    }

    pub fn marks_with_role(&self, role: Role) -> impl Iterator<Item = &Mark> {
        self.marks.iter().filter(move |m| m.role == role)
    }

    /// Entities that have a series mark, in drawing order.
    pub fn series_entities(&self) -> Vec<&str> {
        self.marks_with_role(Role::Series)
            .filter_map(|m| m.entity.as_deref())
            .collect()
    }
}
