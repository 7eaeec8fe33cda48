//! Dirty-state comparison of form inputs

use serde_json::Value;

fn is_compound(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn sorted_keys(values: &[Value]) -> Vec<String> {
    let mut keys: Vec<String> = values.iter().map(Value::to_string).collect();
    keys.sort_unstable();
    keys
}

/// Compare two values of the same form field.
///
/// Arrays of primitives (multiple-choice fields) are compared as multisets,
/// since choice order carries no meaning. Arrays of objects (formsets) and
/// everything else use structural equality.
pub fn are_fields_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Array(left), Value::Array(right)) => {
            if left.iter().chain(right).any(is_compound) {
                left == right
            } else {
                left.len() == right.len() && sorted_keys(left) == sorted_keys(right)
            }
        }
        _ => a == b,
    }
}

/// Whether any field differs between two form inputs.
///
/// Both inputs are expected to be JSON objects; a key present on one side
/// only counts as a change unless the other side is `null`.
pub fn have_fields_changed(initial: &Value, current: &Value) -> bool {
    match (initial, current) {
        (Value::Object(before), Value::Object(after)) => {
            before.keys().chain(after.keys()).any(|key| {
                let left = before.get(key).unwrap_or(&Value::Null);
                let right = after.get(key).unwrap_or(&Value::Null);
                !are_fields_equal(left, right)
            })
        }
        _ => !are_fields_equal(initial, current),
    }
}
