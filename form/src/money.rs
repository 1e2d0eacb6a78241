//! Brazilian-locale money handling.
//!
//! Monetary inputs stay free text while the user types. When a field loses
//! focus its digits are read as a count of cents and rewritten as
//! `1.234,56` (period for thousands, comma for decimals). Parsing is the
//! lenient inverse used for summing; it never fails.

/// Rewrite raw input as a formatted amount.
///
/// Every non-digit character is discarded and the remaining digits are read
/// as cents. Empty input normalises to `"0,00"`.
///
/// ```
/// use petition_form::format_amount;
/// assert_eq!(format_amount("150000"), "1.500,00");
/// assert_eq!(format_amount("R$ 7"), "0,07");
/// assert_eq!(format_amount(""), "0,00");
/// ```
pub fn format_amount(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return "0,00".to_string();
    }

    let significant = digits.trim_start_matches('0');
    let padded = format!("{significant:0>3}");
    let (units, cents) = padded.split_at(padded.len() - 2);
    format!("{},{cents}", group_thousands(units))
}

/// Parse a formatted amount back into a number.
///
/// Thousands separators are dropped and the first comma becomes the decimal
/// point. The longest numeric prefix is parsed, so trailing garbage is
/// ignored. `None`, empty and non-numeric input all yield `0.0`.
pub fn parse_amount<'a>(value: impl Into<Option<&'a str>>) -> f64 {
    let Some(value) = value.into() else {
        return 0.0;
    };
    if value.is_empty() {
        return 0.0;
    }

    let normalized = value.replace('.', "").replacen(',', ".", 1);
    numeric_prefix(normalized.trim_start())
        .and_then(|prefix| prefix.parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Render a number as Brazilian currency, e.g. `R$ 1.500,00`.
pub fn format_currency(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let cents = (value.abs() * 100.0).round() as u128;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    let units = (cents / 100).to_string();
    format!("R$ {sign}{},{:02}", group_thousands(&units), cents % 100)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Longest prefix shaped like `[+-]digits[.digits][e[+-]digits]`.
fn numeric_prefix(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        end = frac_end;
    }

    if mantissa_digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    Some(&s[..end])
}
