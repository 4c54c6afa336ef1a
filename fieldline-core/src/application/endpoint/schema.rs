//! Structural validation of tool arguments against their declared `inputSchema`.
//!
//! Only the keywords the tool catalogs use are understood: `type`, `required`,
//! `properties`, `enum`, `maxLength`, `minimum`, `maximum` and `items`.
//! Properties not named in the schema are accepted.

use serde_json::{Map, Value};

pub fn validate(schema: &Value, value: &Value) -> Result<(), Vec<String>> {
    let mut violations = Vec::new();
    check(schema, value, "arguments", &mut violations);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn check(schema: &Value, value: &Value, path: &str, out: &mut Vec<String>) {
    let Some(schema) = schema.as_object() else {
        return;
    };

    if let Some(expected) = schema.get("type").and_then(Value::as_str) {
        if !matches_type(expected, value) {
            out.push(format!("{path} must be of type {expected}"));
            return;
        }
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            let choices = allowed
                .iter()
                .map(|choice| choice.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            out.push(format!("{path} must be one of [{choices}]"));
        }
    }

    if let (Some(limit), Some(text)) = (
        schema.get("maxLength").and_then(Value::as_u64),
        value.as_str(),
    ) {
        let length = text.chars().count() as u64;
        if length > limit {
            out.push(format!(
                "{path} must be at most {limit} characters (got {length})"
            ));
        }
    }

    if let Some(number) = value.as_f64() {
        if let Some(max) = schema.get("maximum").and_then(Value::as_f64) {
            if number > max {
                out.push(format!("{path} must be at most {max}"));
            }
        }
        if let Some(min) = schema.get("minimum").and_then(Value::as_f64) {
            if number < min {
                out.push(format!("{path} must be at least {min}"));
            }
        }
    }

    if let Some(object) = value.as_object() {
        check_object(schema, object, path, out);
    }

    if let (Some(items), Some(array)) = (schema.get("items"), value.as_array()) {
        for (index, item) in array.iter().enumerate() {
            check(items, item, &format!("{path}[{index}]"), out);
        }
    }
}

fn check_object(schema: &Map<String, Value>, object: &Map<String, Value>, path: &str, out: &mut Vec<String>) {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            match object.get(field) {
                None | Some(Value::Null) => {
                    out.push(format!("{path}.{field} is required"));
                }
                Some(_) => {}
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (name, property_schema) in properties {
            match object.get(name) {
                None | Some(Value::Null) => {}
                Some(property) => check(property_schema, property, &format!("{path}.{name}"), out),
            }
        }
    }
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "null" => value.is_null(),
        _ => true,
    }
}
