//! Converts nested primitive/map/list trees into the flat dotted-key form
//! the property store holds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::WeaveError;

/// A decoded, not-yet-flattened configuration value, as produced by a
/// format decoder (`.properties`, JSON, YAML, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    fn stringify(&self) -> Option<String> {
        match self {
            Value::Null => Some(String::new()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(format_float(*f)),
            Value::Str(s) => Some(s.clone()),
            Value::List(_) | Value::Map(_) => None,
        }
    }
}

/// IEEE floats without trailing zeros (`2.5`, not `2.500`; `3`, not `3.0`).
fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        let mut s = format!("{f}");
        if s.contains('.') {
            while s.ends_with('0') {
                s.pop();
            }
            if s.ends_with('.') {
                s.pop();
            }
        }
        s
    }
}

/// Flatten `value` into `parent.key` / `parent[index]` dotted entries.
/// An empty list flattens to `parent = ""`.
pub fn flatten(prefix: &str, value: &Value) -> Result<BTreeMap<String, String>, WeaveError> {
    let mut out = BTreeMap::new();
    flatten_into(prefix, value, &mut out)?;
    Ok(out)
}

fn flatten_into(
    prefix: &str,
    value: &Value,
    out: &mut BTreeMap<String, String>,
) -> Result<(), WeaveError> {
    match value {
        Value::Map(map) => {
            for (k, v) in map {
                let child = join(prefix, k);
                flatten_into(&child, v, out)?;
            }
            Ok(())
        }
        Value::List(items) => {
            if items.is_empty() {
                out.insert(prefix.to_string(), String::new());
                return Ok(());
            }
            for (i, v) in items.iter().enumerate() {
                let child = format!("{prefix}[{i}]");
                flatten_into(&child, v, out)?;
            }
            Ok(())
        }
        primitive => {
            let s = primitive
                .stringify()
                .expect("non-container Value always stringifies");
            out.insert(prefix.to_string(), s);
            Ok(())
        }
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
