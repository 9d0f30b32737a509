//! Number and text formatting for stock reports
//!
//! Stock quantities come from loosely typed legacy records, so every numeric
//! field is kept as text and coerced here. Anything that does not parse is
//! treated as zero.

use std::str::FromStr;

use rust_decimal::Decimal;

/// Suffix appended to truncated text
pub const ELLIPSIS: &str = "...";

/// Parse an optional numeric text field. Blank or malformed input yields `None`.
pub fn parse_decimal(raw: Option<&str>) -> Option<Decimal> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Parse an optional numeric text field, treating blank or malformed input as zero
pub fn coerce_decimal(raw: Option<&str>) -> Decimal {
    parse_decimal(raw).unwrap_or(Decimal::ZERO)
}

/// Format a quantity: integers without decimals, everything else fixed to 2 places
pub fn format_number(value: Decimal) -> String {
    if value.is_zero() {
        return "0".to_string();
    }
    if value.fract().is_zero() {
        value.trunc().normalize().to_string()
    } else {
        format!("{:.2}", value.round_dp(2))
    }
}

/// Coerce and format a raw numeric field in one step
pub fn format_field(raw: Option<&str>) -> String {
    format_number(coerce_decimal(raw))
}

/// Format a price as `Rp 1,250,000`; zero or missing prices render as `-`
pub fn format_rupiah(raw: Option<&str>) -> String {
    let value = coerce_decimal(raw);
    if value.is_zero() {
        return "-".to_string();
    }

    let negative = value.is_sign_negative();
    let abs = value.abs();
    let whole = group_thousands(&abs.trunc().normalize().to_string());
    let amount = if abs.fract().is_zero() {
        whole
    } else {
        let fixed = format!("{:.2}", abs.round_dp(2));
        let cents = fixed.rsplit('.').next().unwrap_or("00");
        format!("{}.{}", whole, cents)
    };

    if negative {
        format!("Rp -{}", amount)
    } else {
        format!("Rp {}", amount)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Truncate to `max_chars` characters, appending `...` when anything was cut
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}{}", head, ELLIPSIS)
    } else {
        text.to_string()
    }
}
