//! Argument declarations.
//!
//! An [`ArgumentBuilder`] collects settings; [`ArgumentParser::add`] validates
//! it into an immutable [`Argument`] that lives as long as the parser.
//!
//! [`ArgumentParser::add`]: crate::ArgumentParser::add

use indexmap::IndexSet;

use crate::action::{ActionRegistry, BuiltinAction};
use crate::arity::Arity;
use crate::convert::Converter;
use crate::error::DeclarationError;
use crate::value::{ArgType, ScalarType, Value, ValueType};

/// Case-sensitive, ordered set of dash-prefixed aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasSet(IndexSet<String>);

impl AliasSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, alias: impl Into<String>) -> Result<(), DeclarationError> {
        let alias = alias.into();
        if !alias.starts_with('-') {
            return Err(DeclarationError::InvalidAlias(alias));
        }
        if self.0.contains(&alias) {
            return Err(DeclarationError::DuplicateAlias(alias));
        }
        self.0.insert(alias);
        Ok(())
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.0.contains(alias)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<String>> for AliasSet {
    type Error = DeclarationError;

    fn try_from(aliases: Vec<String>) -> Result<Self, Self::Error> {
        let mut set = Self::new();
        for alias in aliases {
            set.insert(alias)?;
        }
        Ok(set)
    }
}

/// A validated argument declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    name: String,
    aliases: AliasSet,
    action: String,
    value_type: ValueType,
    destination: String,
    usage: String,
    value_name: Option<String>,
    default_value: Option<Value>,
    const_value: Option<Value>,
    choices: Option<IndexSet<String>>,
    arity: Arity,
    positional: bool,
    required: bool,
}

impl Argument {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &AliasSet {
        &self.aliases
    }

    /// Tag of the action that handles this argument.
    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Repository key the parsed value is stored under.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub fn const_value(&self) -> Option<&Value> {
        self.const_value.as_ref()
    }

    pub fn choices(&self) -> Option<&IndexSet<String>> {
        self.choices.as_ref()
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn is_positional(&self) -> bool {
        self.positional
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Name followed by any aliases, e.g. `--verbose, -v`.
    pub fn display_name(&self) -> String {
        std::iter::once(self.name.as_str())
            .chain(self.aliases.iter())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Placeholder for the argument's values in help text.
    pub fn value_name(&self) -> String {
        self.value_name
            .clone()
            .unwrap_or_else(|| self.destination.replace('-', "_").to_uppercase())
    }

    /// Whether `token` names this argument, by primary name or alias.
    pub fn matches(&self, token: &str) -> bool {
        self.name == token || self.aliases.contains(token)
    }
}

/// Unvalidated settings for an [`Argument`].
#[derive(Debug, Clone)]
pub struct ArgumentBuilder {
    name: String,
    aliases: Option<Vec<String>>,
    action: Option<String>,
    value_type: Option<ValueType>,
    destination: Option<String>,
    usage: String,
    value_name: Option<String>,
    default_value: Option<Value>,
    const_value: Option<Value>,
    choices: Option<Vec<String>>,
    arity: Option<Arity>,
    positional: bool,
    required: bool,
}

impl ArgumentBuilder {
    fn new(name: impl Into<String>, positional: bool) -> Self {
        Self {
            name: name.into(),
            aliases: None,
            action: None,
            value_type: None,
            destination: None,
            usage: String::new(),
            value_name: None,
            default_value: None,
            const_value: None,
            choices: None,
            arity: None,
            positional,
            required: false,
        }
    }

    /// A positional argument, consumed in declaration order.
    pub fn positional(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }

    /// A dash-prefixed option. Defaults to the `store` action with one string value.
    pub fn option(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    /// A boolean switch storing `value` when present and `!value` otherwise.
    pub fn flag(name: impl Into<String>, value: bool) -> Self {
        let action = if value {
            BuiltinAction::StoreTrue
        } else {
            BuiltinAction::StoreFalse
        };
        Self::new(name, false)
            .action(action.tag())
            .value_type(ScalarType::Bool)
            .default_value(!value)
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.get_or_insert_with(Vec::new).push(alias.into());
        self
    }

    /// Replace the alias list. An empty list is rejected when the argument is added.
    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = Some(aliases.into_iter().map(Into::into).collect());
        self
    }

    pub fn action(mut self, tag: impl Into<String>) -> Self {
        self.action = Some(tag.into());
        self
    }

    pub fn value_type(mut self, value_type: impl Into<ValueType>) -> Self {
        self.value_type = Some(value_type.into());
        self
    }

    /// Shorthand for `value_type(ValueType::of::<T>())`.
    pub fn of<T: ArgType>(self) -> Self {
        self.value_type(ValueType::of::<T>())
    }

    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn value_name(mut self, value_name: impl Into<String>) -> Self {
        self.value_name = Some(value_name.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn const_value(mut self, value: impl Into<Value>) -> Self {
        self.const_value = Some(value.into());
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn arity(mut self, arity: impl Into<Arity>) -> Self {
        self.arity = Some(arity.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Validate the declaration shape, bring default and const values to the
    /// declared type, and hand the result to its action for checking.
    pub(crate) fn build(
        self,
        registry: &ActionRegistry,
        converter: &Converter,
    ) -> Result<Argument, DeclarationError> {
        if self.name.trim().is_empty() {
            return Err(DeclarationError::EmptyName);
        }

        let aliases = if self.positional {
            if self.name.starts_with('-') {
                return Err(DeclarationError::PositionalWithDash(self.name));
            }
            if self.aliases.is_some() {
                return Err(DeclarationError::PositionalWithAliases(self.name));
            }
            AliasSet::new()
        } else {
            if !self.name.starts_with('-') {
                return Err(DeclarationError::OptionWithoutDash(self.name));
            }
            match self.aliases {
                Some(list) if list.is_empty() => {
                    return Err(DeclarationError::EmptyAliases(self.name));
                }
                Some(list) => AliasSet::try_from(list)?,
                None => AliasSet::new(),
            }
        };

        let store = BuiltinAction::Store.tag();
        let action_tag = self.action.unwrap_or_else(|| store.to_string());
        if self.positional && action_tag != store {
            return Err(DeclarationError::PositionalAction {
                name: self.name,
                action: action_tag,
            });
        }
        let action = registry
            .resolve(&action_tag)
            .ok_or_else(|| DeclarationError::UnknownAction(action_tag.clone()))?;

        let destination = self
            .destination
            .unwrap_or_else(|| self.name.trim_start_matches('-').to_string());
        let arity = self.arity.unwrap_or_else(|| action.default_arity());
        // An untyped `store_const` takes the kind of its const value.
        let const_kind = self
            .const_value
            .as_ref()
            .filter(|_| action_tag == BuiltinAction::StoreConst.tag())
            .and_then(Value::scalar_type)
            .map(ValueType::Scalar);
        let value_type = self
            .value_type
            .or(const_kind)
            .unwrap_or_else(|| action.default_value_type());

        let default_value = self
            .default_value
            .map(|value| converter.coerce(&value_type, value))
            .transpose()
            .map_err(|source| DeclarationError::InvalidDefault {
                name: self.name.clone(),
                source,
            })?;
        let const_value = self
            .const_value
            .map(|value| converter.coerce(&value_type, value))
            .transpose()
            .map_err(|source| DeclarationError::InvalidConst {
                name: self.name.clone(),
                source,
            })?;

        let argument = Argument {
            name: self.name,
            aliases,
            action: action_tag,
            value_type,
            destination,
            usage: self.usage,
            value_name: self.value_name,
            default_value,
            const_value,
            choices: self.choices.map(|c| c.into_iter().collect()),
            arity,
            positional: self.positional,
            required: self.required,
        };

        // Positional arity is checked when parsing starts.
        if !argument.positional {
            action.validate(&argument)?;
        }
        Ok(argument)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(builder: ArgumentBuilder) -> Result<Argument, DeclarationError> {
        builder.build(&ActionRegistry::default(), &Converter::default())
    }

    #[test]
    fn destination_strips_leading_dashes() {
        let arg = build(ArgumentBuilder::option("--max-connections").of::<i32>()).unwrap();
        assert_eq!(arg.destination(), "max-connections");
        assert_eq!(arg.action(), "store");
        assert_eq!(arg.arity(), Arity::ONE);
        assert_eq!(arg.value_name(), "MAX_CONNECTIONS");
    }

    #[test]
    fn name_shapes_are_enforced() {
        assert_eq!(
            build(ArgumentBuilder::option("  ")),
            Err(DeclarationError::EmptyName)
        );
        assert_eq!(
            build(ArgumentBuilder::positional("-file")),
            Err(DeclarationError::PositionalWithDash("-file".to_string()))
        );
        assert_eq!(
            build(ArgumentBuilder::option("name")),
            Err(DeclarationError::OptionWithoutDash("name".to_string()))
        );
    }

    #[test]
    fn alias_rules() {
        assert_eq!(
            build(ArgumentBuilder::option("--name").aliases(Vec::<String>::new())),
            Err(DeclarationError::EmptyAliases("--name".to_string()))
        );
        assert_eq!(
            build(ArgumentBuilder::option("--name").alias("n")),
            Err(DeclarationError::InvalidAlias("n".to_string()))
        );
        assert_eq!(
            build(ArgumentBuilder::option("--name").alias("-n").alias("-n")),
            Err(DeclarationError::DuplicateAlias("-n".to_string()))
        );
        assert_eq!(
            build(ArgumentBuilder::positional("file").alias("-f")),
            Err(DeclarationError::PositionalWithAliases("file".to_string()))
        );

        let arg = build(ArgumentBuilder::option("--verbose").alias("-v").alias("-V")).unwrap();
        assert_eq!(arg.display_name(), "--verbose, -v, -V");
        assert!(arg.matches("-V"));
        assert!(!arg.matches("-x"));
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert_eq!(
            build(ArgumentBuilder::option("--x").action("explode")),
            Err(DeclarationError::UnknownAction("explode".to_string()))
        );
        assert!(matches!(
            build(ArgumentBuilder::positional("file").action("count")),
            Err(DeclarationError::PositionalAction { .. })
        ));
    }

    #[test]
    fn flag_defaults_to_opposite_value() {
        let arg = build(ArgumentBuilder::flag("--no-color", false)).unwrap();
        assert_eq!(arg.action(), "store_false");
        assert_eq!(arg.default_value(), Some(&Value::Bool(true)));
        assert_eq!(arg.arity(), Arity::ZERO);
    }

    #[test]
    fn default_and_const_take_the_declared_type() {
        let arg = build(ArgumentBuilder::option("--port").of::<u16>().default_value(8080)).unwrap();
        assert_eq!(arg.default_value(), Some(&Value::U16(8080)));

        let arg = build(ArgumentBuilder::option("--port").of::<u16>().default_value("8080")).unwrap();
        assert_eq!(arg.default_value(), Some(&Value::U16(8080)));

        let arg = build(
            ArgumentBuilder::option("--ratio")
                .of::<f64>()
                .arity(Arity::Optional)
                .const_value(2),
        )
        .unwrap();
        assert_eq!(arg.const_value(), Some(&Value::F64(2.0)));

        let arg = build(
            ArgumentBuilder::option("--ids")
                .of::<Vec<u32>>()
                .arity(Arity::Any)
                .default_value(vec![1, 2]),
        )
        .unwrap();
        assert_eq!(
            arg.default_value(),
            Some(&Value::List(vec![Value::U32(1), Value::U32(2)]))
        );
    }

    #[test]
    fn untyped_store_const_takes_the_const_kind() {
        let arg = build(ArgumentBuilder::option("--max").action("store_const").const_value(10u64))
            .unwrap();
        assert_eq!(arg.value_type(), &ValueType::Scalar(ScalarType::U64));
        assert_eq!(arg.const_value(), Some(&Value::U64(10)));
    }

    #[test]
    fn mismatched_default_or_const_is_rejected() {
        assert!(matches!(
            build(ArgumentBuilder::option("--port").of::<u16>().default_value("http")),
            Err(DeclarationError::InvalidDefault { .. })
        ));
        assert!(matches!(
            build(ArgumentBuilder::option("--port").of::<u16>().default_value(70000)),
            Err(DeclarationError::InvalidDefault { .. })
        ));
        assert!(matches!(
            build(ArgumentBuilder::option("--name").default_value(true)),
            Err(DeclarationError::InvalidDefault { .. })
        ));
        assert!(matches!(
            build(
                ArgumentBuilder::option("--level")
                    .of::<i32>()
                    .arity(Arity::Optional)
                    .const_value("high")
            ),
            Err(DeclarationError::InvalidConst { .. })
        ));
    }

    #[test]
    fn positional_arity_is_not_checked_at_add_time() {
        let arg = build(ArgumentBuilder::positional("pair").arity(2)).unwrap();
        assert_eq!(arg.arity(), Arity::Fixed(2));
    }

    #[test]
    fn alias_set_rejects_missing_dash() {
        let mut set = AliasSet::new();
        assert!(set.insert("-a").is_ok());
        assert_eq!(
            set.insert("b"),
            Err(DeclarationError::InvalidAlias("b".to_string()))
        );
        assert_eq!(set.len(), 1);
    }
}
