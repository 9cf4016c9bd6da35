//! Machine definitions loaded from JSON or YAML.

use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

use super::error::ConfigError;
use super::machine::MachineBuilder;
use crate::core::StatefulEntity;
use crate::dot::{DotOptions, RoleStyle, RoleStyles};
use crate::guard::{RolePredicates, TransitionRule};
use crate::listeners::LifecycleHooks;
use crate::machine::Machine;

/// A string-keyed map that keeps document order.
///
/// Deserializing keeps every entry, repeated keys included, so that the
/// definition checks can report them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace `key`. A replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
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

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<V> IntoIterator for OrderedMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            entries.push((key, value));
        }
        Ok(OrderedMap { entries })
    }

    // `[]` and `~` both stand for a transition with no edges.
    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        if seq.next_element::<IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_type(de::Unexpected::Seq, &self));
        }
        Ok(OrderedMap::new())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(OrderedMap::new())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(OrderedMapVisitor(PhantomData))
    }
}

/// A machine described as data.
///
/// # Example
///
/// ```rust
/// use machinist::builder::MachineConfig;
/// use machinist::core::EntityState;
///
/// let config = MachineConfig::from_yaml(
///     r#"
/// name: vehicle
/// initial_state: parked
/// transitions:
///   ignite: { parked: idling, stalled: stalled }
///   turn_off: { all: parked }
/// rules:
///   ignite: { role: [driver], depends: has_key }
/// roles:
///   driver: { color: blue }
/// "#,
/// )
/// .unwrap();
///
/// let machine = config.build::<EntityState>().unwrap();
/// assert_eq!(machine.transition_names(), ["ignite", "turn_off"]);
/// assert_eq!(config.role_styles().names().collect::<Vec<_>>(), ["driver"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    pub name: String,
    #[serde(alias = "initialState")]
    pub initial_state: String,
    pub transitions: OrderedMap<OrderedMap<String>>,
    #[serde(default, alias = "transitionRules", skip_serializing_if = "OrderedMap::is_empty")]
    pub rules: OrderedMap<TransitionRule>,
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub roles: OrderedMap<RoleStyle>,
    #[serde(default)]
    pub graph: DotOptions,
}

impl MachineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// A builder preloaded with this definition, for adding listeners and
    /// methods before building.
    pub fn builder<E>(&self) -> MachineBuilder<E> {
        let mut builder = MachineBuilder::new(self.name.clone());
        if !self.initial_state.is_empty() {
            builder = builder.initial(self.initial_state.clone());
        }
        for (name, edges) in self.transitions.iter() {
            builder = builder.transition(name, edges.iter());
        }
        for (name, rule) in self.rules.iter() {
            builder = builder.rule(name, rule.clone());
        }
        builder
    }

    pub fn build<E>(&self) -> Result<Machine<E>, ConfigError>
    where
        E: StatefulEntity + LifecycleHooks + RolePredicates,
    {
        Ok(self.builder().build()?)
    }

    /// Roles in document order, for role graphs.
    pub fn role_styles(&self) -> RoleStyles {
        self.roles
            .iter()
            .map(|(role, style)| (role.to_string(), style.clone()))
            .collect()
    }
}
