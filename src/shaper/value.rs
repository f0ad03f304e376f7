use std::collections::BTreeMap;

use bigdecimal::{BigDecimal, ToPrimitive};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Heterogeneous result value: a map, a sequence, or a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(BigDecimal),
    Text(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// Replaces every decimal leaf with a float, recursing through maps and lists.
/// Decimals outside the f64 range become `Null`.
pub fn to_transport_value(value: Value) -> Value {
    match value {
        Value::Decimal(d) => d.to_f64().map_or(Value::Null, Value::Float),
        Value::List(items) => Value::List(items.into_iter().map(to_transport_value).collect()),
        Value::Map(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k, to_transport_value(v)))
                .collect(),
        ),
        leaf => leaf,
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            // Unshaped decimals keep full precision as text.
            Value::Decimal(d) => serializer.serialize_str(&d.to_string()),
            Value::Text(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u8> for Value {
    fn from(i: u8) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<BigDecimal> for Value {
    fn from(d: BigDecimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Value {
        Value::Decimal(BigDecimal::from_str(s).unwrap())
    }

    fn nested_with_decimals() -> Value {
        Value::map([
            ("revenue", dec("2161736.25")),
            ("rank", Value::Int(1)),
            ("listed", Value::Bool(true)),
            ("note", Value::Null),
            (
                "history",
                Value::List(vec![dec("1.5"), Value::Text("n/a".into()), Value::map([("inner", dec("-3"))])]),
            ),
            ("empty_map", Value::map(Vec::<(String, Value)>::new())),
            ("empty_list", Value::List(vec![])),
        ])
    }

    #[test]
    fn converts_decimal_leaves_at_any_depth() {
        let shaped = to_transport_value(nested_with_decimals());
        let m = shaped.as_map().unwrap();
        assert_eq!(m["revenue"], Value::Float(2161736.25));
        assert_eq!(m["rank"], Value::Int(1));
        match &m["history"] {
            Value::List(items) => {
                assert_eq!(items[0], Value::Float(1.5));
                assert_eq!(items[1], Value::Text("n/a".into()));
                assert_eq!(items[2].as_map().unwrap()["inner"], Value::Float(-3.0));
            }
            other => panic!("expected list, got {other:?}"),
        }
        assert_eq!(m["empty_map"], Value::Map(BTreeMap::new()));
        assert_eq!(m["empty_list"], Value::List(vec![]));
    }

    #[test]
    fn shaping_is_idempotent() {
        let once = to_transport_value(nested_with_decimals());
        let twice = to_transport_value(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn values_without_decimals_are_untouched() {
        let plain = Value::map([
            ("a", Value::Int(-7)),
            ("b", Value::Float(0.25)),
            ("c", Value::List(vec![Value::Null, Value::Bool(false)])),
            ("d", Value::map(Vec::<(String, Value)>::new())),
        ]);
        assert_eq!(to_transport_value(plain.clone()), plain);
    }

    #[test]
    fn serializes_to_plain_json() {
        let shaped = to_transport_value(Value::map([
            ("value", dec("12.5")),
            ("rank", Value::from(Some(3i64))),
            ("missing", Value::from(None::<i64>)),
        ]));
        let json = serde_json::to_value(&shaped).unwrap();
        assert_eq!(json, serde_json::json!({"value": 12.5, "rank": 3, "missing": null}));
    }
}
