//! Keyword normalization.
//!
//! Lowercases the keyword, collapses every run of whitespace to a single
//! space and trims the ends. The function is total: any input, including
//! the empty string, yields a normalized string.
//!
//! # Examples
//!
//! ```
//! use kwcat::analysis::normalize;
//!
//! assert_eq!(normalize("  Kerala   Ayurveda\tTRIPHALA \n"), "kerala ayurveda triphala");
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").expect("static whitespace pattern");
}

/// Normalize raw keyword text for matching.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    WHITESPACE_RUN.replace_all(&lowered, " ").into_owned()
}

/// Coerce a keyword value of unknown origin into text.
///
/// Uploaded tables and JSON payloads can carry numbers, booleans or nulls in
/// the keyword column. They are turned into their text representation so the
/// policy always receives a string.
pub fn coerce_keyword(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n),
        other => other.to_string(),
    }
}

fn format_number(n: &serde_json::Number) -> String {
    if let Some(f) = n.as_f64().filter(|_| n.is_f64())
        && f.fract() == 0.0
        && f.is_finite()
        && f.abs() < 1e15
    {
        return format!("{}", f as i64);
    }
    n.to_string()
}
