use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

lazy_static! {
    /// `1,250` or `12,500.75`: commas only between groups of three digits.
    static ref THOUSANDS_REGEX: Regex =
        Regex::new(r"^-?\d{1,3}(,\d{3})+(\.\d+)?$").expect("Invalid regex pattern");
}

/// Reads a fetched cell as an amount.
///
/// `Ok(None)` means the month is absent (null or blank). Strings may carry a
/// currency sign, spaces and `,` thousands separators between groups of
/// three digits.
pub fn parse_cell_value(value: &Value) -> Result<Option<Decimal>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => {
            if let Ok(d) = Decimal::from_str(&n.to_string()) {
                return Ok(Some(d));
            }
            n.as_f64()
                .and_then(Decimal::from_f64)
                .map(Some)
                .ok_or_else(|| format!("number {} is out of range", n))
        }
        Value::String(s) => parse_amount_str(s),
        other => Err(format!("expected a number, got {}", other)),
    }
}

/// Parses a textual amount. Blank text is `Ok(None)`.
pub fn parse_amount_str(raw: &str) -> Result<Option<Decimal>, String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '$')
        .collect();
    if cleaned.is_empty() {
        return Ok(None);
    }

    let not_a_number = || format!("'{}' is not a number", raw);
    if cleaned.contains(',') {
        // Decimal commas ("1,5") are not accepted
        if !THOUSANDS_REGEX.is_match(&cleaned) {
            return Err(not_a_number());
        }
        return Decimal::from_str(&cleaned.replace(',', ""))
            .map(Some)
            .map_err(|_| not_a_number());
    }

    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map(Some)
        .map_err(|_| not_a_number())
}
