use crate::bind::{Bindable, Binder};
use crate::error::{Error, Result};
use crate::repository::ValueRepository;
use crate::value::{FromValue, Value};

/// Read-only view over parsed values plus the tokens nothing claimed.
///
/// Lookups go through the chained repositories in order and the first hit
/// wins. A missing key or a value of another type is a miss, never an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    repositories: Vec<ValueRepository>,
    extras: Vec<String>,
}

impl Arguments {
    pub fn new(repository: ValueRepository, extras: Vec<String>) -> Self {
        Self {
            repositories: vec![repository],
            extras,
        }
    }

    /// Append a fallback repository consulted after the existing ones.
    pub fn chain(mut self, repository: ValueRepository) -> Self {
        self.repositories.push(repository);
        self
    }

    /// Unmatched tokens in encounter order.
    pub fn extras(&self) -> &[String] {
        &self.extras
    }

    pub fn repositories(&self) -> &[ValueRepository] {
        &self.repositories
    }

    /// The raw stored value under `key`.
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.repositories.iter().find_map(|r| r.get(key))
    }

    /// String value under `key`. Values of other types are not rendered.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.value(key).and_then(Value::as_str)
    }

    pub fn try_get<T: FromValue>(&self, key: &str) -> Option<T> {
        self.repositories.iter().find_map(|r| r.try_get(key))
    }

    pub fn get_or_default<T: FromValue + Default>(&self, key: &str) -> T {
        self.try_get(key).unwrap_or_default()
    }

    pub fn get_required<T: FromValue>(&self, key: &str) -> Result<T> {
        self.try_get(key)
            .ok_or_else(|| Error::MissingRequiredValue(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.repositories.iter().any(|r| r.contains_key(key))
    }

    /// Copy matching values onto `target`'s fields.
    pub fn bind<T: Bindable>(&self, target: &mut T) -> Result<()> {
        target.bind_fields(&Binder::new(self))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(entries: &[(&str, Value)]) -> ValueRepository {
        let mut repo = ValueRepository::new();
        for (key, value) in entries {
            repo.set(key, value.clone());
        }
        repo
    }

    #[test]
    fn first_repository_wins() {
        let args = Arguments::new(repo(&[("name", "cli".into())]), Vec::new())
            .chain(repo(&[("name", "config".into()), ("port", 8080.into())]));
        assert_eq!(args.get("name"), Some("cli"));
        assert_eq!(args.try_get::<i32>("port"), Some(8080));
        assert!(args.contains("PORT"));
    }

    #[test]
    fn typed_lookup_skips_mismatched_entries() {
        let args = Arguments::new(repo(&[("port", "auto".into())]), Vec::new())
            .chain(repo(&[("port", 8080.into())]));
        assert_eq!(args.get("port"), Some("auto"));
        assert_eq!(args.try_get::<i32>("port"), Some(8080));
    }

    #[test]
    fn misses_are_absence() {
        let args = Arguments::new(repo(&[("count", 3.into())]), vec!["--x".to_string()]);
        assert_eq!(args.get("count"), None);
        assert_eq!(args.get_or_default::<String>("missing"), "");
        assert_eq!(args.get_or_default::<i32>("count"), 3);
        assert_eq!(
            args.get_required::<bool>("missing"),
            Err(Error::MissingRequiredValue("missing".to_string()))
        );
        assert_eq!(args.extras(), ["--x"]);
    }
}
