//! Text measurement and truncation for legends and tooltip boxes.

/// Heuristic: estimate pixel width of text (neither SVG nor the bitmap backend measures for us).
pub fn estimate_text_width_px(text: &str, font_px: f64) -> f64 {
    ((text.chars().count() as f64) * font_px * 0.60).ceil()
}

/// Truncate to fit `max_px` and add a single ellipsis if needed.
pub fn truncate_to_width(text: &str, font_px: f64, max_px: f64) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        let next = format!("{out}{ch}…");
        if estimate_text_width_px(&next, font_px) > max_px {
            break;
        }
        out.push(ch);
    }
    if out.is_empty() {
        return String::new();
    }
    out.push('…');
    out
}
