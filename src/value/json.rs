//! Conversions between [`Value`] and `serde_json`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Mapping, Value};

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::list(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::map(map.into_iter().collect()),
        }
    }
}

impl From<serde_json::Value> for Mapping {
    /// Non-object JSON yields an empty mapping.
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => map.into_iter().collect(),
            _ => Mapping::new(),
        }
    }
}

impl Value {
    /// Snapshot as JSON. Functions have no JSON form and render as `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null | Value::Function(_) => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.read_recursive().iter().map(Value::to_json).collect())
            }
            Value::Map(map) => map.read_recursive().to_json(),
        }
    }
}

impl Mapping {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.iter()
                .map(|(key, value)| (key.to_string(), value.to_json()))
                .collect(),
        )
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_objects_become_maps() {
        let value = Value::from(json!({ "count": 0, "tags": ["a", "b"] }));
        assert!(value.is_map());
        assert_eq!(value.get("count"), Some(Value::from(0)));
        assert_eq!(value.get("tags").unwrap().at(1), Some(Value::from("b")));
    }

    #[test]
    fn functions_serialize_as_null() {
        let value = Value::map(Mapping::new().with("f", Value::function(|_| Value::Null)));
        assert_eq!(value.to_json(), json!({ "f": null }));
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"f":null}"#);
    }

    #[test]
    fn deserializes_from_json_text() {
        let value: Value = serde_json::from_str(r#"{"amount": 5}"#).unwrap();
        assert_eq!(value.get("amount").and_then(|v| v.as_i64()), Some(5));
    }
}
