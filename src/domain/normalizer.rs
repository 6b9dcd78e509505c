//! Pure text transforms applied to raw detail-panel fields

use once_cell::sync::Lazy;
use regex::Regex;

static DURATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(\d+)h\s*)?(?:(\d+)min)?").expect("duration pattern is valid")
});

static NAME_BOUNDARY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z])([A-Z])").expect("name boundary pattern is valid"));

/// Convert `"2h 22min"` style running times to `H:MM`.
///
/// A missing hour reads as `0` and missing minutes as `00`. Text with
/// neither component is returned unchanged.
pub fn normalize_duration(raw: &str) -> String {
    let Some(captures) = DURATION_PATTERN.captures(raw) else {
        return raw.to_string();
    };

    let hours = captures.get(1).map(|m| m.as_str().parse::<u64>());
    let minutes = captures.get(2).map(|m| m.as_str().parse::<u64>());

    match (hours, minutes) {
        (None, None) => raw.to_string(),
        (Some(Err(_)), _) | (_, Some(Err(_))) => raw.to_string(),
        (h, m) => {
            let h = h.and_then(Result::ok).unwrap_or(0);
            let m = m.and_then(Result::ok).unwrap_or(0);
            format!("{h}:{m:02}")
        }
    }
}

/// Split a run-together cast list at lowercase→uppercase boundaries.
///
/// `"Brad PittEdward Norton"` becomes `"Brad Pitt, Edward Norton"`. Names
/// with inner capitals (`McConaughey`) are split as well.
pub fn normalize_cast_list(raw: &str) -> String {
    NAME_BOUNDARY_PATTERN.replace_all(raw, "$1, $2").into_owned()
}

/// Remove a leading label token such as `Stars` together with the
/// whitespace and separator commas that follow it.
pub fn strip_label(text: &str, label: &str) -> String {
    let trimmed = text.trim_start();
    match trimmed.strip_prefix(label) {
        Some(rest) => rest
            .trim_start_matches(|c: char| c.is_whitespace() || c == ',')
            .trim_end()
            .to_string(),
        None => trimmed.trim_end().to_string(),
    }
}
