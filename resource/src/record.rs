//! Records and the value semantics used to order and match them.
//!
//! A record is whatever JSON object the server returns. The only field the
//! library interprets is the identity field (`_id` unless configured).

use serde_json::{Map, Value};
use std::cmp::Ordering;

/// One server-side entity.
pub type Record = Map<String, Value>;

/// Request parameters: query string for GET, JSON body otherwise.
pub type Params = Map<String, Value>;

/// Identity field used when the configuration does not name one.
pub const DEFAULT_ID_FIELD: &str = "_id";

/// The identity value of a record, if it has one.
#[must_use]
pub fn identity<'a>(record: &'a Record, id_field: &str) -> Option<&'a Value> {
    record.get(id_field).filter(|value| !value.is_null())
}

/// Overwrite every field of `target` that is present in `incoming`.
///
/// Fields missing from `incoming` are left untouched.
pub fn merge_into(target: &mut Record, incoming: Record) {
    for (key, value) in incoming {
        target.insert(key, value);
    }
}

/// Build a record from a JSON value, if it is an object.
#[must_use]
pub fn from_value(value: Value) -> Option<Record> {
    match value {
        Value::Object(record) => Some(record),
        _ => None,
    }
}

/// Ascending order of two identity values.
///
/// Numbers compare numerically and strings lexicographically. A string
/// that parses as a number compares numerically against a number. Values
/// that cannot be coerced fall back to a fixed kind ranking so the order
/// stays total.
#[must_use]
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => cmp_f64(as_f64(x), as_f64(y)),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::String(y)) => match parse_number(y) {
            Some(y) => cmp_f64(as_f64(x), y),
            None => kind_rank(a).cmp(&kind_rank(b)),
        },
        (Value::String(x), Value::Number(y)) => match parse_number(x) {
            Some(x) => cmp_f64(x, as_f64(y)),
            None => kind_rank(a).cmp(&kind_rank(b)),
        },
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

/// Loose equality between a record field and an expected value.
///
/// - identical values are equal
/// - numbers compare by numeric value
/// - a numeric string equals the number it parses to
/// - booleans compare as `1`/`0` against numbers and numeric strings
/// - `null` only equals `null` or a missing field
#[must_use]
pub fn loose_eq(actual: Option<&Value>, expected: &Value) -> bool {
    let Some(actual) = actual else {
        return expected.is_null();
    };

    match (actual, expected) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Number(x), Value::Number(y)) => as_f64(x) == as_f64(y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            parse_number(s).is_some_and(|parsed| parsed == as_f64(n))
        },
        (Value::Bool(flag), other) | (other, Value::Bool(flag)) => {
            let as_number = Value::from(u8::from(*flag));
            loose_eq(Some(other), &as_number)
        },
        (x, y) => x == y,
    }
}

fn as_f64(number: &serde_json::Number) -> f64 {
    number.as_f64().unwrap_or(f64::NAN)
}

fn cmp_f64(x: f64, y: f64) -> Ordering {
    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
}

fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

const fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
