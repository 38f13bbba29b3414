//! Copying parsed values onto plain structs.
//!
//! A [`Bindable`] type lists its fields through a [`Binder`]; usually the
//! implementation comes from `#[derive(Bind)]`. Each field is looked up under
//! its dash-cased name, prefixed by the keys of any enclosing fields.

use std::any::type_name;

use crate::arguments::Arguments;
use crate::error::BindError;
use crate::value::FromValue;

pub trait Bindable {
    /// Visit every bound field of `self`.
    fn bind_fields(&mut self, binder: &Binder<'_>) -> Result<(), BindError>;

    /// A fresh instance for an empty `Option<Self>` slot, when the type has one.
    fn instantiate() -> Option<Self>
    where
        Self: Sized,
    {
        None
    }
}

/// A field's identifier and optional key override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldName {
    ident: &'static str,
    rename: Option<&'static str>,
}

impl FieldName {
    pub const fn new(ident: &'static str) -> Self {
        Self {
            ident,
            rename: None,
        }
    }

    pub const fn renamed(ident: &'static str, key: &'static str) -> Self {
        Self {
            ident,
            rename: Some(key),
        }
    }

    pub fn ident(&self) -> &'static str {
        self.ident
    }

    /// This field's own key segment, without any parent prefix.
    pub fn key(&self) -> String {
        match self.rename {
            Some(key) => key.to_string(),
            None => to_dash_case(self.ident),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Binder<'a> {
    arguments: &'a Arguments,
    prefix: Option<String>,
}

impl<'a> Binder<'a> {
    pub fn new(arguments: &'a Arguments) -> Self {
        Self {
            arguments,
            prefix: None,
        }
    }

    pub fn arguments(&self) -> &'a Arguments {
        self.arguments
    }

    /// Full lookup key for `field` at this nesting level.
    pub fn key(&self, field: FieldName) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}-{}", field.key()),
            None => field.key(),
        }
    }

    /// Assign a value field. Returns whether a value was found; on a miss the
    /// field keeps its current value.
    pub fn value<T: FromValue>(&self, field: FieldName, slot: &mut T) -> bool {
        let key = self.key(field);
        match self.arguments.try_get::<T>(&key) {
            Some(value) => {
                tracing::trace!(key = %key, field = field.ident(), "bound value");
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn optional_value<T: FromValue>(&self, field: FieldName, slot: &mut Option<T>) -> bool {
        let key = self.key(field);
        match self.arguments.try_get::<T>(&key) {
            Some(value) => {
                tracing::trace!(key = %key, field = field.ident(), "bound value");
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    /// Recurse into a nested struct field.
    pub fn nested<T: Bindable>(&self, field: FieldName, slot: &mut T) -> Result<(), BindError> {
        slot.bind_fields(&self.child(field))
    }

    /// Recurse into an optional nested struct, creating it first when empty.
    pub fn optional_nested<T: Bindable>(
        &self,
        field: FieldName,
        slot: &mut Option<T>,
    ) -> Result<(), BindError> {
        if slot.is_none() {
            let created = T::instantiate().ok_or_else(|| BindError::MissingConstructor {
                key: self.key(field),
                type_name: type_name::<T>(),
            })?;
            *slot = Some(created);
        }
        match slot.as_mut() {
            Some(inner) => self.nested(field, inner),
            None => Ok(()),
        }
    }

    fn child(&self, field: FieldName) -> Binder<'a> {
        Binder {
            arguments: self.arguments,
            prefix: Some(self.key(field)),
        }
    }
}

/// Bind `arguments` onto `target`.
pub fn bind<T: Bindable>(arguments: &Arguments, target: &mut T) -> Result<(), BindError> {
    target.bind_fields(&Binder::new(arguments))
}

/// `MaxConnections`, `maxConnections` and `max_connections` all become
/// `max-connections`. Acronyms stay together: `HTTPServer` becomes
/// `http-server`.
pub fn to_dash_case(name: &str) -> String {
    let name = name.strip_prefix("r#").unwrap_or(name);
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            continue;
        }
        if c.is_uppercase() && i > 0 && !out.is_empty() && !out.ends_with('-') {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower) {
                out.push('-');
            }
        }
        out.extend(c.to_lowercase());
    }

    while out.ends_with('-') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::ValueRepository;

    #[test]
    fn dash_case_conversions() {
        assert_eq!(to_dash_case("MaxConnections"), "max-connections");
        assert_eq!(to_dash_case("maxConnections"), "max-connections");
        assert_eq!(to_dash_case("max_connections"), "max-connections");
        assert_eq!(to_dash_case("HTTPServer"), "http-server");
        assert_eq!(to_dash_case("UseSSL"), "use-ssl");
        assert_eq!(to_dash_case("Label"), "label");
        assert_eq!(to_dash_case("r#type"), "type");
        assert_eq!(to_dash_case("_private_"), "private");
    }

    #[derive(Debug, Default, PartialEq)]
    struct Child {
        label: String,
    }

    impl Bindable for Child {
        fn bind_fields(&mut self, binder: &Binder<'_>) -> Result<(), BindError> {
            binder.value(FieldName::new("label"), &mut self.label);
            Ok(())
        }

        fn instantiate() -> Option<Self> {
            Some(Self::default())
        }
    }

    #[derive(Debug, Default)]
    struct Parent {
        name: String,
        port: Option<u16>,
        child: Option<Child>,
        renamed: Child,
    }

    impl Bindable for Parent {
        fn bind_fields(&mut self, binder: &Binder<'_>) -> Result<(), BindError> {
            binder.value(FieldName::new("name"), &mut self.name);
            binder.optional_value(FieldName::new("port"), &mut self.port);
            binder.optional_nested(FieldName::new("child"), &mut self.child)?;
            binder.nested(FieldName::renamed("renamed", "other"), &mut self.renamed)?;
            Ok(())
        }
    }

    fn arguments(entries: &[(&str, &str)]) -> Arguments {
        let mut repo = ValueRepository::new();
        for (key, value) in entries {
            repo.set(key, *value);
        }
        Arguments::new(repo, Vec::new())
    }

    #[test]
    fn nested_keys_carry_the_parent_prefix() {
        let args = arguments(&[("child-label", "x"), ("other-label", "y"), ("name", "n")]);
        let mut parent = Parent::default();
        bind(&args, &mut parent).unwrap();

        assert_eq!(parent.name, "n");
        assert_eq!(parent.child, Some(Child { label: "x".to_string() }));
        assert_eq!(parent.renamed.label, "y");
        assert_eq!(parent.port, None);
    }

    #[test]
    fn misses_keep_current_values() {
        let args = arguments(&[("port", "not-a-number")]);
        let mut parent = Parent {
            name: "keep".to_string(),
            port: Some(1),
            ..Parent::default()
        };
        bind(&args, &mut parent).unwrap();
        assert_eq!(parent.name, "keep");
        assert_eq!(parent.port, Some(1));
    }

    #[derive(Debug)]
    struct NoDefault {
        label: String,
    }

    impl Bindable for NoDefault {
        fn bind_fields(&mut self, binder: &Binder<'_>) -> Result<(), BindError> {
            binder.value(FieldName::new("label"), &mut self.label);
            Ok(())
        }
    }

    #[test]
    fn empty_slot_without_constructor_fails() {
        let args = arguments(&[]);
        let mut slot: Option<NoDefault> = None;
        let err = Binder::new(&args)
            .optional_nested(FieldName::new("Child"), &mut slot)
            .unwrap_err();
        assert!(matches!(
            err,
            BindError::MissingConstructor { ref key, .. } if key == "child"
        ));
    }
}
