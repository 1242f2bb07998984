/// Largest integer value exactly representable as an `f64` (`2^53 - 1`).
pub const MAX_SAFE_U64_INT: u64 = 9_007_199_254_740_991;

/// Safely converts a `usize` to `f64` if and only if it is exactly
/// representable.
///
/// ## Errors
/// Returns `Err(error)` if the value exceeds `MAX_SAFE_U64_INT`.
///
/// ## Example
/// ```
/// use weft::util::num::{MAX_SAFE_U64_INT, usize_to_f64_checked};
///
/// assert_eq!(usize_to_f64_checked(42, "too big!"), Ok(42.0));
///
/// let big = (MAX_SAFE_U64_INT + 1) as usize;
/// assert!(usize_to_f64_checked(big, "too big!").is_err());
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn usize_to_f64_checked<E>(value: usize, error: E) -> Result<f64, E> {
    match u64::try_from(value) {
        Ok(v) if v <= MAX_SAFE_U64_INT => Ok(v as f64),
        _ => Err(error),
    }
}

/// Parses the text form of a number as used by loose comparisons.
///
/// Surrounding whitespace is ignored and an empty (or all-whitespace) string
/// reads as `0`. Anything that is not a complete decimal number reads as
/// `None`.
///
/// ## Example
/// ```
/// use weft::util::num::parse_numeric_text;
///
/// assert_eq!(parse_numeric_text(" 9 "), Some(9.0));
/// assert_eq!(parse_numeric_text(""), Some(0.0));
/// assert_eq!(parse_numeric_text("1e3"), Some(1000.0));
/// assert_eq!(parse_numeric_text("nine"), None);
/// ```
#[must_use]
pub fn parse_numeric_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    // `f64::from_str` also accepts "inf" and "NaN", which are not numbers here.
    if trimmed.chars()
              .any(|c| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
    {
        return None;
    }
    trimmed.parse().ok()
}

/// Formats a number the way templates render it.
///
/// Integral values within the exactly representable range print without a
/// fractional part; everything else uses the shortest representation that
/// round-trips.
///
/// ## Example
/// ```
/// use weft::util::num::format_number;
///
/// assert_eq!(format_number(1.0), "1");
/// assert_eq!(format_number(-0.0), "0");
/// assert_eq!(format_number(2.5), "2.5");
/// assert_eq!(format_number(f64::NAN), "NaN");
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_U64_INT as f64 {
        return format!("{}", value as i64);
    }
    format!("{value}")
}

/// Parses an accessor path segment as a sequence index.
///
/// Only plain ASCII digit strings qualify, so `"01"` is an index but `"+1"`
/// or `"1.0"` are not. Digits too large for `usize` read as `usize::MAX`,
/// which no sequence reaches.
#[must_use]
pub fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(segment.parse().unwrap_or(usize::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_segments() {
        assert_eq!(parse_index("0"), Some(0));
        assert_eq!(parse_index("01"), Some(1));
        assert_eq!(parse_index("+1"), None);
        assert_eq!(parse_index("id"), None);
        assert_eq!(parse_index(""), None);
        assert_eq!(parse_index("99999999999999999999999"), Some(usize::MAX));
    }
}
