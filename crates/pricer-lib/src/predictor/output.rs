//! Price formatting for display
//!
//! Prices render as US dollars with two decimals and thousands separators.
//! Negative values keep the sign after the currency symbol (`$-1,234.50`).

/// Prefix of the result line shown after a prediction
pub const RESULT_PREFIX: &str = "Estimated Car Price: ";

/// Format a price as `$12,345.68`
pub fn format_price(price: f64) -> String {
    if !price.is_finite() {
        return format!("${}", price);
    }

    let fixed = format!("{:.2}", price.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    // -0.001 rounds to 0.00 and is shown unsigned
    let negative = price < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    format!("${}{}.{}", if negative { "-" } else { "" }, grouped, cents)
}

/// The full result line, e.g. `Estimated Car Price: $27,578.18`
pub fn result_line(price: f64) -> String {
    format!("{}{}", RESULT_PREFIX, format_price(price))
}
