//! Number formatting and locale mapping for labels and tooltips.

use num_format::{Locale, ToFormattedString};

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator char.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => (&Locale::de, ','),
        "fr" | "fr_fr" => (&Locale::fr, ','),
        "es" | "es_es" => (&Locale::es, ','),
        "it" | "it_it" => (&Locale::it, ','),
        "pt" | "pt_pt" | "pt_br" => (&Locale::pt, ','),
        "nl" | "nl_nl" => (&Locale::nl, ','),
        _ => (&Locale::en, '.'), // default
    }
}

/// Fixed number of decimals with locale digit grouping, e.g. `12,345.6`.
pub fn format_fixed(v: f64, decimals: usize, locale_tag: &str) -> String {
    let (locale, dec_sep) = map_locale(locale_tag);
    let s = format!("{:.*}", decimals, v.abs());
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };
    let grouped = int_part
        .parse::<u64>()
        .map(|n| n.to_formatted_string(locale))
        .unwrap_or_else(|_| int_part.to_string());
    let sign = if v < 0.0 && s.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{sign}{grouped}{dec_sep}{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Shortest plain rendering: up to 4 decimals, trailing zeros removed.
pub fn format_plain(v: f64, locale_tag: &str) -> String {
    let s = format!("{:.4}", v);
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    let decimals = trimmed.split_once('.').map_or(0, |(_, f)| f.len());
    format_fixed(v, decimals, locale_tag)
}

/// Tick label with as many decimals as the tick step needs.
pub fn tick_label(v: f64, step: f64, locale_tag: &str) -> String {
    let decimals = if step > 0.0 && step < 1.0 {
        (-step.log10().floor()) as usize
    } else {
        0
    };
    format_fixed(v, decimals, locale_tag)
}

/// Step between consecutive ticks, or 1 for fewer than two ticks.
pub fn tick_step(ticks: &[f64]) -> f64 {
    match ticks {
        [a, b, ..] => (b - a).abs(),
        _ => 1.0,
    }
}
