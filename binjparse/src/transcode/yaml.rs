//! YAML transcoding: convert jparse values to YAML text.
//!
//! Mapping:
//!   - Value::Null   -> YAML null
//!   - Value::Bool   -> YAML bool
//!   - Value::Int    -> YAML integer
//!   - Value::Float  -> YAML float (including .nan, .inf, -.inf)
//!   - Value::String -> YAML string
//!   - Value::Array  -> YAML sequence
//!   - Value::Object -> YAML mapping, in document order

use libjparse::Value;

/// Encode a Value as a YAML string.
pub fn encode(value: &Value) -> Result<String, String> {
    serde_yaml::to_string(&value_to_yaml(value)).map_err(|e| format!("YAML encode error: {}", e))
}

fn value_to_yaml(value: &Value) -> serde_yaml::Value {
    match value {
        Value::Null => serde_yaml::Value::Null,
        Value::Bool(b) => serde_yaml::Value::Bool(*b),
        Value::Int(n) => serde_yaml::Value::Number(serde_yaml::Number::from(*n)),
        Value::Float(f) => serde_yaml::Value::Number(serde_yaml::Number::from(*f)),
        Value::String(s) => serde_yaml::Value::String(s.clone()),
        Value::Array(arr) => serde_yaml::Value::Sequence(arr.iter().map(value_to_yaml).collect()),
        Value::Object(obj) => {
            let mut map = serde_yaml::Mapping::new();
            for (k, v) in obj {
                map.insert(serde_yaml::Value::String(k.clone()), value_to_yaml(v));
            }
            serde_yaml::Value::Mapping(map)
        }
    }
}
