//! Boundary coercion for loosely typed values sent by callers.
//!
//! Front ends post numbers as JSON numbers, numeric strings ("12,5" from a French
//! keyboard, "" from an untouched field) or even booleans. Everything is coerced
//! here, once, before it reaches the data model.

use serde_json::Value;

/// Best-effort numeric reading. `None` for empty, non-numeric or non-finite input.
pub fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.replace(',', ".").parse::<f64>().ok()?
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Price/weight coercion: invalid or empty → 0, negative → 0.
pub fn coerce_amount(value: &Value) -> f64 {
    parse_number(value).map(|n| n.max(0.0)).unwrap_or(0.0)
}

/// Stack quantity coercion: invalid or empty → 1, negative → 0, fractions truncated.
pub fn coerce_quantity(value: &Value) -> u32 {
    match parse_number(value) {
        Some(n) if n <= 0.0 => 0,
        Some(n) => n.trunc().min(f64::from(u32::MAX)) as u32,
        None => 1,
    }
}

/// Strict count for transfers, sales and purchases: a whole number ≥ 1.
pub fn positive_count(value: &Value) -> Option<u32> {
    let n = parse_number(value)?;
    if n < 1.0 || n.fract() != 0.0 || n > f64::from(u32::MAX) {
        return None;
    }
    Some(n as u32)
}

/// Ability score coercion, clamped to `[min, max]`. `None` when unreadable.
pub fn coerce_score(value: &Value, min: i32, max: i32) -> Option<i32> {
    let n = parse_number(value)?.trunc();
    Some(n.clamp(f64::from(min), f64::from(max)) as i32)
}

/// Signed whole bonus (armor class); invalid → 0.
pub fn coerce_bonus(value: &Value) -> i32 {
    parse_number(value)
        .map(|n| n.trunc().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32)
        .unwrap_or(0)
}

/// Free-text field that may arrive as a number ("30" range, 2 to-hit).
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Display names are trimmed; an empty name is rejected.
pub fn clean_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_number_variants() {
        assert_eq!(parse_number(&json!(3)), Some(3.0));
        assert_eq!(parse_number(&json!("2.5")), Some(2.5));
        assert_eq!(parse_number(&json!(" 2,5 ")), Some(2.5));
        assert_eq!(parse_number(&json!(true)), Some(1.0));
        assert_eq!(parse_number(&json!("")), None);
        assert_eq!(parse_number(&json!("NaN")), None);
        assert_eq!(parse_number(&json!(null)), None);
        assert_eq!(parse_number(&json!([1])), None);
    }

    #[test]
    fn test_coerce_amount_defaults_to_zero() {
        assert_eq!(coerce_amount(&json!("")), 0.0);
        assert_eq!(coerce_amount(&json!("abc")), 0.0);
        assert_eq!(coerce_amount(&json!(-4.5)), 0.0);
        assert_eq!(coerce_amount(&json!("7.25")), 7.25);
    }

    #[test]
    fn test_coerce_quantity_defaults_to_one() {
        assert_eq!(coerce_quantity(&json!("")), 1);
        assert_eq!(coerce_quantity(&json!(null)), 1);
        assert_eq!(coerce_quantity(&json!("x")), 1);
        assert_eq!(coerce_quantity(&json!(-2)), 0);
        assert_eq!(coerce_quantity(&json!(0)), 0);
        assert_eq!(coerce_quantity(&json!("3.9")), 3);
    }

    #[test]
    fn test_positive_count_is_strict() {
        assert_eq!(positive_count(&json!(2)), Some(2));
        assert_eq!(positive_count(&json!("4")), Some(4));
        assert_eq!(positive_count(&json!(0)), None);
        assert_eq!(positive_count(&json!(-1)), None);
        assert_eq!(positive_count(&json!(1.5)), None);
        assert_eq!(positive_count(&json!("")), None);
    }

    #[test]
    fn test_coerce_score_clamps() {
        assert_eq!(coerce_score(&json!(14), 1, 20), Some(14));
        assert_eq!(coerce_score(&json!("25"), 1, 20), Some(20));
        assert_eq!(coerce_score(&json!(-3), 1, 20), Some(1));
        assert_eq!(coerce_score(&json!("twelve"), 1, 20), None);
    }

    #[test]
    fn test_coerce_text_and_bonus() {
        assert_eq!(coerce_text(&json!(30)), "30");
        assert_eq!(coerce_text(&json!(" 1d8 ")), "1d8");
        assert_eq!(coerce_text(&json!(null)), "");
        assert_eq!(coerce_bonus(&json!("-1")), -1);
        assert_eq!(coerce_bonus(&json!("oops")), 0);
    }
}
