// Parsing and formatting helpers.
//
// Cell coercion lives here so the normalizer can ask "is this a number?"
// without caring how CSV exports spell numbers.
use num_format::{Locale, ToFormattedString};

/// Parse a cell into `f64`, forgiving the formatting noise common in CSV
/// exports.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters (`"NA"`, `"nan"`).
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a year. Whole-valued floats (`"2010.0"`) are accepted because
/// spreadsheet exports like to write them that way.
pub fn parse_year_safe(s: Option<&str>) -> Option<i32> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let v = parse_f64_safe(Some(s))?;
    if v.fract() == 0.0 && v >= i32::MIN as f64 && v <= i32::MAX as f64 {
        Some(v as i32)
    } else {
        None
    }
}

/// `numerator / denominator` when the denominator is positive, else 0.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Recovered over crimes, held to [0, 1].
pub fn recovery_rate(recovered: f64, crimes: f64) -> f64 {
    safe_ratio(recovered, crimes).clamp(0.0, 1.0)
}

/// Counts below zero are reporting noise; treat them as none.
pub fn non_negative(v: f64) -> f64 {
    v.max(0.0)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators (`1,234,567.89`).
    let s = format!("{:.*}", decimals, n.abs());
    let neg = n.is_sign_negative() && s.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let mut res = match int_part.parse::<u64>() {
        Ok(int_val) => int_val.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
