//! Format decoders: turn raw source bytes into the nested [`Value`] tree the
//! property flattener consumes. Two formats ship: Java-style `.properties`
//! (already flat) and JSON (nested, nulls, lists). `.yaml`/`.yml`/`.toml`/
//! `.tml` extensions are reserved but not bundled, so no parser dependency
//! is pulled in for formats nothing in this crate needs to read itself;
//! callers who need them register their own [`Decoder`] under that
//! extension.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value as JsonValue;

use crate::error::WeaveError;
use crate::properties::{flatten, PropertyStore, Value};

pub trait Decoder {
    fn decode(&self, raw: &str) -> Result<Value, WeaveError>;
}

/// Extension-keyed collaborator: `decode(bytes, ext)` turns raw file content
/// into a nested map. `.properties` and `.json` are registered by default;
/// `.yaml`/`.yml`/`.toml`/`.tml` are reserved slots that error until a
/// caller supplies a decoder for them via [`register`](Self::register).
pub struct DecoderRegistry {
    decoders: HashMap<String, Box<dyn Decoder + Send + Sync>>,
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        let mut decoders: HashMap<String, Box<dyn Decoder + Send + Sync>> = HashMap::new();
        decoders.insert("properties".to_string(), Box::new(PropertiesDecoder));
        decoders.insert("json".to_string(), Box::new(JsonDecoder));
        Self { decoders }
    }
}

impl DecoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, ext: impl Into<String>, decoder: Box<dyn Decoder + Send + Sync>) {
        self.decoders.insert(ext.into(), decoder);
    }

    /// Decode `bytes` (validated as UTF-8) using the decoder registered for
    /// `ext`, with no leading dot (`"properties"`, not `".properties"`).
    pub fn decode(&self, bytes: &[u8], ext: &str) -> Result<Value, WeaveError> {
        let raw = std::str::from_utf8(bytes)
            .map_err(|e| WeaveError::syntax(format!("config source is not valid UTF-8: {e}")))?;
        let ext = ext.trim_start_matches('.');
        let decoder = self.decoders.get(ext).ok_or_else(|| {
            WeaveError::syntax(format!("unsupported extension \".{ext}\""))
        })?;
        decoder.decode(raw)
    }
}

/// `key = value` lines, `#`/`!` comments, blank lines ignored. Already a
/// flat key space; decodes straight into a one-level map of leaf strings.
pub struct PropertiesDecoder;

impl Decoder for PropertiesDecoder {
    fn decode(&self, raw: &str) -> Result<Value, WeaveError> {
        let mut map = BTreeMap::new();
        for (lineno, line) in raw.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }
            let sep = trimmed.find(['=', ':']).ok_or_else(|| {
                WeaveError::syntax(format!("properties line {}: missing '='", lineno + 1))
            })?;
            let key = trimmed[..sep].trim().to_string();
            let value = trimmed[sep + 1..].trim().to_string();
            if key.is_empty() {
                return Err(WeaveError::syntax(format!(
                    "properties line {}: empty key",
                    lineno + 1
                )));
            }
            map.insert(key, Value::Str(value));
        }
        Ok(Value::Map(map))
    }
}

/// Standard JSON, converted field-for-field into the shared [`Value`] tree.
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    fn decode(&self, raw: &str) -> Result<Value, WeaveError> {
        let parsed: JsonValue =
            serde_json::from_str(raw).map_err(|e| WeaveError::syntax(format!("invalid JSON: {e}")))?;
        Ok(from_json(parsed))
    }
}

fn from_json(v: JsonValue) -> Value {
    match v {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(0.0))
            }
        }
        JsonValue::String(s) => Value::Str(s),
        JsonValue::Array(items) => Value::List(items.into_iter().map(from_json).collect()),
        JsonValue::Object(map) => {
            Value::Map(map.into_iter().map(|(k, v)| (k, from_json(v))).collect())
        }
    }
}

/// Decode `raw` with `decoder`, flatten under `prefix`, and merge every
/// resulting leaf into `store`.
pub fn load_into(
    store: &mut PropertyStore,
    prefix: &str,
    raw: &str,
    decoder: &dyn Decoder,
) -> Result<(), WeaveError> {
    let value = decoder.decode(raw)?;
    let flat = flatten::flatten(prefix, &value)?;
    for (k, v) in flat {
        store.set(&k, v)?;
    }
    Ok(())
}
