//! Desired-state types

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The value wanted for a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Key appears once.
    Scalar(String),
    /// Key may recur, once per element.
    Repeatable(Vec<String>),
}

impl Value {
    pub fn scalar(s: impl Into<String>) -> Self {
        Self::Scalar(s.into())
    }

    pub fn repeatable<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Repeatable(items.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => f.write_str(s),
            Self::Repeatable(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// Whether the desired keys must exist or must not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    #[default]
    Present,
    Absent,
}

/// Ordered key to [`Value`] map.
///
/// Order matters: appended lines follow it. Inserting an existing key replaces
/// its value in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DesiredState {
    entries: Vec<(String, Value)>,
}

impl DesiredState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for DesiredState {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        let mut state = Self::new();
        for (k, v) in iter {
            state.insert(k, v);
        }
        state
    }
}

impl Serialize for DesiredState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DesiredState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = DesiredState;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of key = \"value\" or key = [\"values\"]")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<DesiredState, A::Error> {
                let mut state = DesiredState::new();
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    state.insert(key, value);
                }
                Ok(state)
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_declaration_order() {
        let state: DesiredState = toml::from_str(
            r#"
            Protocol = "2"
            blacklist = ["usb-storage", "firewire-core"]
            Banner = "/etc/issue"
            "#,
        )
        .unwrap();
        assert_eq!(state.keys().collect::<Vec<_>>(), vec!["Protocol", "blacklist", "Banner"]);
        assert_eq!(
            state.get("blacklist"),
            Some(&Value::repeatable(["usb-storage", "firewire-core"]))
        );
    }

    #[test]
    fn insert_replaces_in_place() {
        let state = DesiredState::new()
            .with("a", Value::scalar("1"))
            .with("b", Value::scalar("2"))
            .with("a", Value::scalar("3"));
        let pairs: Vec<(&str, String)> = state.iter().map(|(k, v)| (k, v.to_string())).collect();
        assert_eq!(pairs, vec![("a", "3".to_string()), ("b", "2".to_string())]);
    }

    #[test]
    fn serializes_as_ordered_map() {
        let state = DesiredState::new()
            .with("z", Value::scalar("1"))
            .with("a", Value::repeatable(["x"]));
        assert_eq!(serde_json::to_string(&state).unwrap(), r#"{"z":"1","a":["x"]}"#);
    }
}
