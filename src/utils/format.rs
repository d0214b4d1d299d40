//! Number formatting for display

/// Format with thousands separators and at most `max_decimals` fraction digits,
/// dropping trailing zeros: `2000000.0` -> `2,000,000`, `1234.5678` -> `1,234.568`
pub fn group_thousands(value: f64, max_decimals: usize) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }

    let fixed = format!("{:.*}", max_decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.is_empty();
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

/// `$64,123.45`
pub fn format_usd(value: f64) -> String {
    let grouped = group_thousands(value, 2);
    match grouped.strip_prefix('-') {
        Some(magnitude) if !magnitude.is_empty() => format!("-${}", magnitude),
        _ => format!("${}", grouped),
    }
}

/// Market cap in billions: `$1322.00B`
pub fn format_billions(value: f64) -> String {
    format!("${:.2}B", value / 1e9)
}

/// Signed percent with two decimals: `+1.25%`
pub fn format_change_pct(value: f64) -> String {
    format!("{:+.2}%", value)
}
