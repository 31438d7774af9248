//! Violation timestamp formatting.

/// Formats seconds as `MM:SS.s`.
///
/// Minutes are zero-padded to two digits but not capped, so a run of 100
/// minutes or more renders a three-digit field. Violation lists are sorted by
/// this string, which only matches numeric order below that bound.
///
/// ```rust
/// use incident_rules::format_time;
///
/// assert_eq!(format_time(62.5), "01:02.5");
/// assert_eq!(format_time(4.0), "00:04.0");
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_time(seconds: f64) -> String {
    let minutes = (seconds / 60.0).floor();
    let remainder = seconds - minutes * 60.0;
    format!("{:02}:{remainder:04.1}", minutes as i64)
}
