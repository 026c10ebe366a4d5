//! Data layer event type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key carrying the event name in a data layer entry.
pub const EVENT_KEY: &str = "event";

/// Key carrying the container start timestamp in the seed event.
pub const START_KEY: &str = "gtm.start";

/// One entry of the data layer: an insertion-ordered key/value mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataLayerEvent(Map<String, Value>);

impl DataLayerEvent {
    /// An empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// A mapping whose `event` key is set.
    pub fn named(event: impl Into<String>) -> Self {
        Self::new().with(EVENT_KEY, event.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a key. Replacing keeps the key's original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// The `event` name, if this entry carries one.
    pub fn event_name(&self) -> Option<&str> {
        self.get(EVENT_KEY).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for DataLayerEvent {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for DataLayerEvent {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Only JSON objects are valid data layer entries.
impl TryFrom<Value> for DataLayerEvent {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}
