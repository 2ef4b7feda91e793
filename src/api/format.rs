//! Wire representation of cats.
//!
//! Encoding is the `Serialize` derive on [`Cat`]: every stored field, `id`
//! included. Decoding goes through [`decode_fields`] (create and PUT, every
//! field required) or [`decode_patch`] (PATCH, every field optional). Both
//! collect all problems before failing so a client sees every offending field
//! at once. `id` and unknown keys in a request body are ignored.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::database::models::cat::{GENDER_MAX_LEN, NAME_MAX_LEN};
use crate::database::models::{CatFields, CatPatch};

pub const NON_FIELD_ERRORS: &str = "non_field_errors";

const REQUIRED: &str = "This field is required.";
const NULL: &str = "This field may not be null.";
const BLANK: &str = "This field may not be blank.";
const NOT_A_STRING: &str = "Not a valid string.";
const NOT_AN_INTEGER: &str = "A valid integer is required.";

/// Per-field validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Presence {
    Required,
    Optional,
}

/// Decode a body for create or full update.
pub fn decode_fields(body: &Value) -> Result<CatFields, ValidationErrors> {
    let patch = decode(body, Presence::Required)?;
    match (patch.name, patch.age, patch.gender) {
        (Some(name), Some(age), Some(gender)) => Ok(CatFields { name, age, gender }),
        // decode() reports every missing required field, so this arm is never reached
        _ => {
            let mut errors = ValidationErrors::new();
            errors.add(NON_FIELD_ERRORS, "Incomplete data.");
            Err(errors)
        }
    }
}

/// Decode a body for partial update.
pub fn decode_patch(body: &Value) -> Result<CatPatch, ValidationErrors> {
    decode(body, Presence::Optional)
}

fn decode(body: &Value, presence: Presence) -> Result<CatPatch, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let object = match body {
        Value::Object(map) => map,
        other => {
            errors.add(
                NON_FIELD_ERRORS,
                format!("Invalid data. Expected a dictionary, but got {}.", json_type_name(other)),
            );
            return Err(errors);
        }
    };

    let name = field(object, "name", presence, &mut errors)
        .and_then(|v| record(&mut errors, "name", parse_char(v, NAME_MAX_LEN)));
    let age = field(object, "age", presence, &mut errors)
        .and_then(|v| record(&mut errors, "age", parse_integer(v)));
    let gender = field(object, "gender", presence, &mut errors)
        .and_then(|v| record(&mut errors, "gender", parse_char(v, GENDER_MAX_LEN)));

    if errors.is_empty() {
        Ok(CatPatch { name, age, gender })
    } else {
        Err(errors)
    }
}

fn field<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    presence: Presence,
    errors: &mut ValidationErrors,
) -> Option<&'a Value> {
    match object.get(key) {
        None => {
            if presence == Presence::Required {
                errors.add(key, REQUIRED);
            }
            None
        }
        Some(Value::Null) => {
            errors.add(key, NULL);
            None
        }
        Some(value) => Some(value),
    }
}

fn record<T>(errors: &mut ValidationErrors, key: &str, result: Result<T, String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(message) => {
            errors.add(key, message);
            None
        }
    }
}

/// Text field: numbers are accepted and stringified, surrounding whitespace is trimmed.
fn parse_char(value: &Value, max_len: usize) -> Result<String, String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Err(NOT_A_STRING.to_string()),
    };
    if text.is_empty() {
        return Err(BLANK.to_string());
    }
    if text.chars().count() > max_len {
        return Err(format!("Ensure this field has no more than {} characters.", max_len));
    }
    Ok(text)
}

/// Integer field stored as a 32-bit column. Integral floats and integer strings are accepted.
fn parse_integer(value: &Value) -> Result<i32, String> {
    let number: i128 = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.into()
            } else if let Some(u) = n.as_u64() {
                u.into()
            } else {
                let f = n
                    .as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .ok_or_else(|| NOT_AN_INTEGER.to_string())?;
                // saturating; anything this large fails the range check below
                f as i128
            }
        }
        Value::String(s) => strip_zero_fraction(s.trim())
            .parse::<i128>()
            .map_err(|_| NOT_AN_INTEGER.to_string())?,
        _ => return Err(NOT_AN_INTEGER.to_string()),
    };

    if number > i128::from(i32::MAX) {
        return Err(format!("Ensure this value is less than or equal to {}.", i32::MAX));
    }
    if number < i128::from(i32::MIN) {
        return Err(format!("Ensure this value is greater than or equal to {}.", i32::MIN));
    }
    i32::try_from(number).map_err(|_| NOT_AN_INTEGER.to_string())
}

/// `"4.0"` and `"4."` read as `"4"`; any other fraction or exponent is left for the parser to reject
fn strip_zero_fraction(text: &str) -> &str {
    match text.rfind('.') {
        Some(dot) if text[dot + 1..].bytes().all(|b| b == b'0') => &text[..dot],
        _ => text,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
