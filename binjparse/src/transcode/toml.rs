//! TOML transcoding: convert jparse values to TOML text.
//!
//! The top-level value must be an object. Nested objects become tables,
//! objects inside arrays become inline tables, and key order follows the
//! document. TOML has no null, so any null is an error.

use libjparse::Value;
use toml_edit::{Array, DocumentMut, Formatted, InlineTable, Item, Table};

/// Encode a Value as a TOML string.
pub fn encode(value: &Value) -> Result<String, String> {
    let Value::Object(obj) = value else {
        return Err("TOML requires the top-level value to be a table/object".to_string());
    };
    let mut doc = DocumentMut::new();
    for (key, v) in obj {
        doc[key.as_str()] = value_to_item(v)?;
    }
    Ok(doc.to_string())
}

fn value_to_item(value: &Value) -> Result<Item, String> {
    match value {
        Value::Object(obj) => {
            let mut table = Table::new();
            for (k, v) in obj {
                table.insert(k, value_to_item(v)?);
            }
            Ok(Item::Table(table))
        }
        other => Ok(Item::Value(value_to_toml(other)?)),
    }
}

fn value_to_toml(value: &Value) -> Result<toml_edit::Value, String> {
    match value {
        Value::Null => Err("TOML has no null type".to_string()),
        Value::Bool(b) => Ok(toml_edit::Value::Boolean(Formatted::new(*b))),
        Value::Int(n) => Ok(toml_edit::Value::Integer(Formatted::new(*n))),
        Value::Float(f) => Ok(toml_edit::Value::Float(Formatted::new(*f))),
        Value::String(s) => Ok(toml_edit::Value::String(Formatted::new(s.clone()))),
        Value::Array(arr) => {
            let mut toml_arr = Array::new();
            for v in arr {
                toml_arr.push(value_to_toml(v)?);
            }
            Ok(toml_edit::Value::Array(toml_arr))
        }
        Value::Object(obj) => {
            let mut inline = InlineTable::new();
            for (k, v) in obj {
                inline.insert(k.as_str(), value_to_toml(v)?);
            }
            Ok(toml_edit::Value::InlineTable(inline))
        }
    }
}
