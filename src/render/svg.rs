//! Standalone SVG output.
//!
//! Every mark becomes one element carrying its class and `data-mark` id.
//! Marks with a tooltip also get `data-tip` (lines separated by newlines) and
//! a `<title>` child, so the text is available even with scripts disabled.
//! The embedded script shows the floating label on hover, keeps it next to
//! the pointer and hides it after a delay.

use crate::config::TooltipConfig;
use crate::error::Result;
use crate::scene::{Anchor, Mark, Scene, Shape, Style};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write as _;
use std::path::Path;

const SCRIPT: &str = r#"(function () {
  var svg = document.getElementById('tbviz-root');
  var tip = document.getElementById('tbviz-tip');
  var box = tip.querySelector('rect');
  var label = tip.querySelector('text');
  var hideTimer = null;
  function at(evt) {
    var p = svg.createSVGPoint();
    p.x = evt.clientX;
    p.y = evt.clientY;
    return p.matrixTransform(svg.getScreenCTM().inverse());
  }
  function place(el, evt) {
    var p = at(evt);
    var dx = +el.getAttribute('data-dx'), dy = +el.getAttribute('data-dy');
    tip.setAttribute('transform', 'translate(' + (p.x + dx) + ',' + (p.y + dy) + ')');
  }
  function show(evt) {
    var el = evt.currentTarget;
    clearTimeout(hideTimer);
    while (label.firstChild) { label.removeChild(label.firstChild); }
    el.getAttribute('data-tip').split('\n').forEach(function (line, i) {
      var t = document.createElementNS('http://www.w3.org/2000/svg', 'tspan');
      t.setAttribute('x', 6);
      t.setAttribute('dy', i ? '1.2em' : '1.1em');
      t.textContent = line;
      label.appendChild(t);
    });
    var b = label.getBBox();
    box.setAttribute('width', b.width + 12);
    box.setAttribute('height', b.height + 8);
    el.classList.add('hover');
    place(el, evt);
    tip.style.opacity = 0.9;
  }
  function hide(evt) {
    evt.currentTarget.classList.remove('hover');
    hideTimer = setTimeout(function () { tip.style.opacity = 0; }, HIDE_MS);
  }
  svg.querySelectorAll('.interactive').forEach(function (el) {
    el.addEventListener('mouseover', show);
    el.addEventListener('mousemove', function (evt) { place(el, evt); });
    el.addEventListener('mouseout', hide);
  });
})();"#;

/// Numbers with at most two decimals and no trailing zeros.
fn num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn style_attrs(style: &Style) -> String {
    let mut out = String::new();
    match style.fill {
        Some(c) => {
            let _ = write!(out, r#" fill="{c}""#);
            if style.fill_opacity < 1.0 {
                let _ = write!(out, r#" fill-opacity="{}""#, num(style.fill_opacity));
            }
        }
        None => out.push_str(r#" fill="none""#),
    }
    if let Some(c) = style.stroke {
        let _ = write!(out, r#" stroke="{c}" stroke-width="{}""#, num(style.stroke_width));
        if let Some((dash, gap)) = style.dash {
            let _ = write!(out, r#" stroke-dasharray="{},{}""#, num(dash), num(gap));
        }
    }
    out
}

fn path_data(points: &[(f64, f64)], closed: bool) -> String {
    let mut d = String::new();
    for (i, (x, y)) in points.iter().enumerate() {
        let _ = write!(d, "{}{},{}", if i == 0 { "M" } else { "L" }, num(*x), num(*y));
    }
    if closed && !points.is_empty() {
        d.push('Z');
    }
    d
}

/// Attribute value for `data-tip`. Newlines are written as character
/// references because attribute normalization would turn them into spaces.
fn tip_attr(lines: &[String]) -> String {
    lines
        .iter()
        .map(|l| encode_double_quoted_attribute(l).into_owned())
        .collect::<Vec<_>>()
        .join("&#10;")
}

fn write_mark(svg: &mut String, scene: &Scene, mark: &Mark) {
    let tip = scene.tooltip(mark.id);
    let mut attrs = format!(
        r#" class="{}{}" data-mark="{}""#,
        encode_double_quoted_attribute(&mark.class),
        if tip.is_some() { " interactive" } else { "" },
        mark.id.0
    );
    if let Some(entity) = &mark.entity {
        let _ = write!(attrs, r#" data-entity="{}""#, encode_double_quoted_attribute(entity));
    }
    if let Some(t) = tip {
        let _ = write!(
            attrs,
            r#" data-tip="{}" data-dx="{}" data-dy="{}""#,
            tip_attr(&t.lines),
            t.offset.0,
            t.offset.1
        );
    }
    attrs.push_str(&style_attrs(&mark.style));

    let (tag, geometry, body) = match &mark.shape {
        Shape::Rect { x, y, w, h } => (
            "rect",
            format!(
                r#"x="{}" y="{}" width="{}" height="{}""#,
                num(*x),
                num(*y),
                num(*w),
                num(*h)
            ),
            None,
        ),
        Shape::Circle { center, r } => (
            "circle",
            format!(
                r#"cx="{}" cy="{}" r="{}""#,
                num(center.0),
                num(center.1),
                num(*r)
            ),
            None,
        ),
        Shape::Line { from, to } => (
            "line",
            format!(
                r#"x1="{}" y1="{}" x2="{}" y2="{}""#,
                num(from.0),
                num(from.1),
                num(to.0),
                num(to.1)
            ),
            None,
        ),
        Shape::Path { points, closed } => (
            "path",
            format!(r#"d="{}""#, path_data(points, *closed)),
            None,
        ),
        Shape::Rings(rings) => {
            let d: String = rings.iter().map(|r| path_data(r, true)).collect();
            ("path", format!(r#"d="{d}" fill-rule="evenodd""#), None)
        }
        Shape::Text {
            at,
            text,
            size,
            anchor,
            rotate,
        } => {
            let anchor = match anchor {
                Anchor::Start => "start",
                Anchor::Middle => "middle",
                Anchor::End => "end",
            };
            let mut geometry = format!(
                r#"x="{}" y="{}" font-size="{}" text-anchor="{anchor}""#,
                num(at.0),
                num(at.1),
                num(*size)
            );
            if *rotate != 0.0 {
                let _ = write!(
                    geometry,
                    r#" transform="rotate({} {} {})""#,
                    num(*rotate),
                    num(at.0),
                    num(at.1)
                );
            }
            ("text", geometry, Some(encode_text(text).into_owned()))
        }
    };

    let title = tip.map(|t| encode_text(&t.text()).into_owned());
    if body.is_none() && title.is_none() {
        let _ = writeln!(svg, "    <{tag} {geometry}{attrs}/>");
        return;
    }
    let _ = write!(svg, "    <{tag} {geometry}{attrs}>");
    if let Some(t) = title {
        let _ = write!(svg, "<title>{t}</title>");
    }
    let _ = writeln!(svg, "{}</{tag}>", body.unwrap_or_default());
}

/// Serialize `scene` as a standalone SVG document.
pub fn to_svg_string(scene: &Scene, tooltip: &TooltipConfig) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" id="tbviz-root" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
        w = num(scene.width),
        h = num(scene.height)
    );
    let _ = writeln!(svg, "  <title>{}</title>", encode_text(&scene.title));
    let _ = writeln!(svg, "  <style>");
    let _ = writeln!(
        svg,
        "    #tbviz-tip {{ opacity: 0; pointer-events: none; transition: opacity {}ms; }}",
        tooltip.fade_in_ms
    );
    let _ = writeln!(svg, "    .interactive {{ cursor: pointer; }}");
    if let Some(hl) = &scene.highlight {
        let _ = writeln!(
            svg,
            "    .interactive.hover {{ stroke: {}; stroke-width: {}; }}",
            hl.stroke,
            num(hl.stroke_width)
        );
    }
    let _ = writeln!(svg, "  </style>");
    let _ = writeln!(svg, "  <g class=\"marks\">");
    for mark in scene.marks() {
        write_mark(&mut svg, scene, mark);
    }
    let _ = writeln!(svg, "  </g>");
    let _ = writeln!(svg, "  <g id=\"tbviz-tip\">");
    let _ = writeln!(
        svg,
        "    <rect rx=\"4\" fill=\"white\" stroke=\"#999\" width=\"0\" height=\"0\"/>"
    );
    let _ = writeln!(svg, "    <text font-size=\"12\" y=\"2\"></text>");
    let _ = writeln!(svg, "  </g>");
    let _ = writeln!(
        svg,
        "  <script><![CDATA[\n{}\n]]></script>",
        SCRIPT.replace("HIDE_MS", &tooltip.hide_after_ms.to_string())
    );
    let _ = writeln!(svg, "</svg>");
    svg
}

pub fn save_svg<P: AsRef<Path>>(scene: &Scene, path: P, tooltip: &TooltipConfig) -> Result<()> {
    std::fs::write(path, to_svg_string(scene, tooltip))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_compact() {
        assert_eq!(num(12.0), "12");
        assert_eq!(num(0.1), "0.1");
        assert_eq!(num(3.14159), "3.14");
        assert_eq!(num(-0.001), "0");
    }

    #[test]
    fn tip_lines_survive_attribute_normalization() {
        let attr = tip_attr(&["Country: A & B".to_string(), "Year: 2010".to_string()]);
        assert_eq!(attr, "Country: A &amp; B&#10;Year: 2010");
    }
}
