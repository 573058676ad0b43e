//! Display formatting for report values.

/// Formats a value per square metre as whole pesos with thousands
/// separators, e.g. `$1,234,567`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "$0".to_string();
    }
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Formats an optional label, falling back to `"N/D"`.
#[must_use]
pub fn or_unavailable(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("N/D")
        .to_string()
}
