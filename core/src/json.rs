use serde_json::{Map, Value};

/// Truthiness of a loosely-typed payload field: null, false, zero and empty
/// strings/arrays/objects count as missing.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Non-empty string content of a field.
pub fn read_json_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|raw| !raw.is_empty())
        .map(ToString::to_string)
}

/// Text of a scalar field. Strings are kept verbatim (even when empty),
/// numbers and booleans use their JSON spelling, everything else is `None`.
pub fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Generic string conversion used when a payload has no recognised shape.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub fn to_pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Object at `key`, or `None` when absent or not an object.
pub fn object_field<'a>(value: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
    value.get(key).and_then(Value::as_object)
}

pub fn array_field<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness_treats_empty_containers_as_missing() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!([])));
        assert!(!is_truthy(&json!({})));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(false)));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!([1])));
        assert!(is_truthy(&json!({"a": 1})));
        assert!(is_truthy(&json!(0.5)));
    }

    #[test]
    fn scalar_text_keeps_strings_and_spells_numbers() {
        assert_eq!(scalar_text(Some(&json!(""))), Some(String::new()));
        assert_eq!(scalar_text(Some(&json!(42))), Some("42".to_string()));
        assert_eq!(scalar_text(Some(&json!(true))), Some("true".to_string()));
        assert_eq!(scalar_text(Some(&json!(null))), None);
        assert_eq!(scalar_text(Some(&json!({"a": 1}))), None);
        assert_eq!(scalar_text(None), None);
    }

    #[test]
    fn read_json_string_skips_empty_and_non_strings() {
        assert_eq!(read_json_string(Some(&json!(""))), None);
        assert_eq!(read_json_string(Some(&json!(3))), None);
        assert_eq!(
            read_json_string(Some(&json!("ada@example.com"))),
            Some("ada@example.com".to_string())
        );
    }
}
