use std::collections::BTreeMap;

use cmdtree_shell::value::{ArgValue, Value};
use serde::Serialize;

/// Parameter values for one pipeline stage, keyed by flag key or argument
/// name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ArgMap(BTreeMap<String, ArgValue>);

impl ArgMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ArgValue) {
        self.0.insert(name.into(), value);
    }

    /// Append to the sequence stored under `name`, starting one if needed.
    pub fn push(&mut self, name: &str, value: Value) {
        match self.0.get_mut(name) {
            Some(ArgValue::Multiple(values)) => values.push(value),
            _ => {
                self.0
                    .insert(name.to_string(), ArgValue::Multiple(vec![value]));
            }
        }
    }

    fn single(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(ArgValue::as_single)
    }

    fn multiple(&self, name: &str) -> &[Value] {
        self.get(name)
            .and_then(ArgValue::as_multiple)
            .unwrap_or_default()
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.single(name).and_then(Value::as_str)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.single(name).and_then(Value::as_int)
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.single(name).and_then(Value::as_float)
    }

    /// Absent flags read as `false`.
    pub fn get_bool(&self, name: &str) -> bool {
        self.single(name).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn get_strings(&self, name: &str) -> Vec<&str> {
        self.multiple(name).iter().filter_map(Value::as_str).collect()
    }

    pub fn get_ints(&self, name: &str) -> Vec<i64> {
        self.multiple(name).iter().filter_map(Value::as_int).collect()
    }

    pub fn get_floats(&self, name: &str) -> Vec<f64> {
        self.multiple(name).iter().filter_map(Value::as_float).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_getters() {
        let mut map = ArgMap::new();
        map.insert("name", ArgValue::single("cow"));
        map.insert("count", ArgValue::single(3));
        map.insert("ratio", ArgValue::single(0.5));
        map.insert("loud", ArgValue::single(true));

        assert_eq!(map.get_str("name"), Some("cow"));
        assert_eq!(map.get_int("count"), Some(3));
        assert_eq!(map.get_float("ratio"), Some(0.5));
        assert!(map.get_bool("loud"));
        assert!(!map.get_bool("quiet"));
        assert_eq!(map.get_str("count"), None);
    }

    #[test]
    fn push_builds_sequence() {
        let mut map = ArgMap::new();
        map.push("files", Value::from("a"));
        map.push("files", Value::from("b"));
        assert_eq!(map.get_strings("files"), vec!["a", "b"]);
        assert!(map.get_strings("other").is_empty());
    }

    #[test]
    fn sequence_getters() {
        let mut map = ArgMap::new();
        map.insert("ids", ArgValue::multiple([1, 2, 3]));
        map.insert("weights", ArgValue::multiple([1.5, 2.5]));
        assert_eq!(map.get_ints("ids"), vec![1, 2, 3]);
        assert_eq!(map.get_floats("weights"), vec![1.5, 2.5]);
        assert_eq!(map.get_int("ids"), None);
    }

    #[test]
    fn serializes_as_plain_object() {
        let mut map = ArgMap::new();
        map.insert("type", ArgValue::single("mammal"));
        map.insert("help", ArgValue::single(false));
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"help":false,"type":"mammal"}"#);
    }
}
