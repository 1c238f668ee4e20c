use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

/// Secret material keyed by field name, ordered for stable output
pub type SecretPayload = BTreeMap<String, SecretValue>;

/// One field of a secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SecretValue {
    Text(String),
    List(Vec<String>),
    Map(BTreeMap<String, SecretValue>),
}

impl SecretValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SecretValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for SecretValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => SecretValue::Text(String::new()),
            Value::String(s) => SecretValue::Text(s),
            Value::Bool(b) => SecretValue::Text(b.to_string()),
            Value::Number(n) => SecretValue::Text(n.to_string()),
            Value::Array(items) => SecretValue::List(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            Value::Object(map) => {
                SecretValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<&str> for SecretValue {
    fn from(value: &str) -> Self {
        SecretValue::Text(value.to_string())
    }
}

/// Text form used by the line-oriented formats: lists are comma-joined,
/// maps are compact JSON.
impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretValue::Text(text) => f.write_str(text),
            SecretValue::List(items) => f.write_str(&items.join(",")),
            SecretValue::Map(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

/// Convert the data section returned by the store.
///
/// KV version 2 mounts wrap the fields in `{"data": ..., "metadata": ...}`;
/// when `unwrap_versioned` is set that envelope is removed. Detection is by
/// shape only: exactly those two keys, with `data` an object.
pub fn from_store(mut data: HashMap<String, serde_json::Value>, unwrap_versioned: bool) -> SecretPayload {
    let versioned = data.len() == 2
        && data.contains_key("metadata")
        && data.get("data").is_some_and(serde_json::Value::is_object);
    if unwrap_versioned && versioned {
        if let Some(serde_json::Value::Object(inner)) = data.remove("data") {
            return inner.into_iter().map(|(k, v)| (k, v.into())).collect();
        }
    }
    data.into_iter().map(|(k, v)| (k, v.into())).collect()
}
