use indexmap::IndexMap;

use crate::value::{FromValue, Value};

/// Parsed values keyed by destination.
///
/// Keys are case-insensitive and the last write wins. Entries keep their
/// first insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueRepository {
    values: IndexMap<String, Value>,
}

impl ValueRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(normalize_key(key), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(&normalize_key(key))
    }

    /// Typed lookup. A stored value of another type is a miss.
    pub fn try_get<T: FromValue>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(T::from_value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(&normalize_key(key))
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.shift_remove(&normalize_key(key))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries in insertion order; keys are lower-cased.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn normalize_key(key: &str) -> String {
    key.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_case_insensitive_and_last_write_wins() {
        let mut repo = ValueRepository::new();
        repo.set("Max-Connections", 10);
        repo.set("max-connections", 20);
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.try_get::<i32>("MAX-CONNECTIONS"), Some(20));
    }

    #[test]
    fn typed_miss_is_absence() {
        let mut repo = ValueRepository::new();
        repo.set("name", "argx");
        assert_eq!(repo.try_get::<i32>("name"), None);
        assert_eq!(repo.try_get::<String>("name").as_deref(), Some("argx"));
        assert_eq!(repo.try_get::<String>("missing"), None);
    }

    #[test]
    fn remove_keeps_order_of_the_rest() {
        let mut repo = ValueRepository::new();
        repo.set("a", 1);
        repo.set("b", 2);
        repo.set("c", 3);
        assert_eq!(repo.remove("B"), Some(Value::I32(2)));
        let keys: Vec<&str> = repo.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }
}
