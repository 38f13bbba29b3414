//! Actions turn matched tokens into repository writes.
//!
//! Built-in behaviors are the closed [`BuiltinAction`] set. Programs can add
//! their own under new tags through a parser's [`ActionRegistry`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::arity::Arity;
use crate::convert::Converter;
use crate::declaration::Argument;
use crate::error::{DeclarationError, Error, ParseError};
use crate::repository::ValueRepository;
use crate::token::Token;
use crate::value::{ScalarType, Value, ValueType};

/// State an action may use while executing.
pub struct ActionContext<'a> {
    converter: &'a Converter,
    repository: &'a mut ValueRepository,
}

impl<'a> ActionContext<'a> {
    pub fn new(converter: &'a Converter, repository: &'a mut ValueRepository) -> Self {
        Self {
            converter,
            repository,
        }
    }

    pub fn converter(&self) -> &Converter {
        self.converter
    }

    pub fn repository(&mut self) -> &mut ValueRepository {
        self.repository
    }

    /// Convert `values` into the argument's declared type.
    pub fn convert(&self, argument: &Argument, values: &[Token]) -> Result<Value, Error> {
        self.converter
            .convert(argument.value_type(), values)
            .map_err(|err| Error::conversion(argument.name(), err))
    }
}

/// A strategy for one kind of argument.
pub trait Action: fmt::Debug + Send + Sync {
    /// Arity used when the declaration does not set one.
    fn default_arity(&self) -> Arity {
        Arity::ONE
    }

    /// Value type used when the declaration does not set one.
    fn default_value_type(&self) -> ValueType {
        ValueType::default()
    }

    /// Reject declarations this action cannot serve. Called once, when the
    /// argument is added.
    fn validate(&self, argument: &Argument) -> Result<(), DeclarationError>;

    /// Handle one occurrence. `tokens` starts with the option's own name
    /// token, followed by the value tokens resolved for this occurrence.
    fn execute(
        &self,
        argument: &Argument,
        context: &mut ActionContext<'_>,
        tokens: &[Token],
    ) -> Result<(), Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinAction {
    Store,
    StoreTrue,
    StoreFalse,
    StoreConst,
    Count,
    Append,
    Choice,
    /// Placeholder that consumes its tokens and writes nothing.
    NoAction,
}

static BUILTIN_ACTIONS: [BuiltinAction; 8] = [
    BuiltinAction::Store,
    BuiltinAction::StoreTrue,
    BuiltinAction::StoreFalse,
    BuiltinAction::StoreConst,
    BuiltinAction::Count,
    BuiltinAction::Append,
    BuiltinAction::Choice,
    BuiltinAction::NoAction,
];

impl BuiltinAction {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::StoreTrue => "store_true",
            Self::StoreFalse => "store_false",
            Self::StoreConst => "store_const",
            Self::Count => "count",
            Self::Append => "append",
            Self::Choice => "choice",
            Self::NoAction => "no_action",
        }
    }

    pub fn all() -> &'static [BuiltinAction] {
        &BUILTIN_ACTIONS
    }

    pub fn from_tag(tag: &str) -> Option<&'static BuiltinAction> {
        BUILTIN_ACTIONS.iter().find(|a| a.tag() == tag)
    }
}

impl fmt::Display for BuiltinAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Action for BuiltinAction {
    fn default_arity(&self) -> Arity {
        match self {
            Self::Store | Self::Append | Self::Choice => Arity::ONE,
            Self::StoreTrue | Self::StoreFalse | Self::StoreConst | Self::Count | Self::NoAction => {
                Arity::ZERO
            }
        }
    }

    fn default_value_type(&self) -> ValueType {
        match self {
            Self::StoreTrue | Self::StoreFalse => ScalarType::Bool.into(),
            Self::Count => ScalarType::I32.into(),
            _ => ValueType::default(),
        }
    }

    fn validate(&self, argument: &Argument) -> Result<(), DeclarationError> {
        match self {
            Self::Store => validate_store(*self, argument),
            Self::Append => {
                validate_store(*self, argument)?;
                require_enumerable(*self, argument)
            }
            Self::StoreTrue | Self::StoreFalse => require_arity(*self, argument, Arity::ZERO),
            Self::StoreConst => {
                require_arity(*self, argument, Arity::ZERO)?;
                if argument.const_value().is_none() {
                    return Err(DeclarationError::MissingConst {
                        name: argument.name().to_string(),
                        action: self.tag().to_string(),
                    });
                }
                Ok(())
            }
            Self::Count => {
                require_arity(*self, argument, Arity::ZERO)?;
                if !argument.value_type().scalar().is_some_and(|ty| ty.is_integer()) {
                    return Err(DeclarationError::NotInteger {
                        name: argument.name().to_string(),
                        action: self.tag().to_string(),
                        value_type: argument.value_type().clone(),
                    });
                }
                Ok(())
            }
            Self::Choice => {
                require_arity(*self, argument, Arity::ONE)?;
                if argument.choices().is_none_or(|c| c.is_empty()) {
                    return Err(DeclarationError::MissingChoices(argument.name().to_string()));
                }
                Ok(())
            }
            Self::NoAction => Ok(()),
        }
    }

    fn execute(
        &self,
        argument: &Argument,
        context: &mut ActionContext<'_>,
        tokens: &[Token],
    ) -> Result<(), Error> {
        let values = tokens.get(1..).unwrap_or_default();
        match self {
            Self::Store => store_values(argument, context, values),
            Self::StoreTrue => {
                context.repository().set(argument.destination(), true);
                Ok(())
            }
            Self::StoreFalse => {
                context.repository().set(argument.destination(), false);
                Ok(())
            }
            Self::StoreConst => {
                if let Some(value) = argument.const_value() {
                    context.repository().set(argument.destination(), value.clone());
                }
                Ok(())
            }
            Self::Count => count(argument, context),
            Self::Append => append(argument, context, values),
            Self::Choice => choose(argument, context, values),
            Self::NoAction => Ok(()),
        }
    }
}

/// Convert `values` and write them under the argument's destination.
///
/// Shared by the `store` action and by positional arguments.
pub(crate) fn store_values(
    argument: &Argument,
    context: &mut ActionContext<'_>,
    values: &[Token],
) -> Result<(), Error> {
    check_value_count(argument, values.len())?;

    if values.is_empty() {
        if let Some(value) = argument.const_value() {
            context.repository().set(argument.destination(), value.clone());
        } else if let Some(shape) = argument.value_type().shape() {
            context
                .repository()
                .set(argument.destination(), Value::collection(shape, Vec::new()));
        }
        return Ok(());
    }

    let value = context.convert(argument, values)?;
    context.repository().set(argument.destination(), value);
    Ok(())
}

fn count(argument: &Argument, context: &mut ActionContext<'_>) -> Result<(), Error> {
    let destination = argument.destination();
    let current = context
        .repository()
        .get(destination)
        .and_then(Value::as_i64)
        .unwrap_or(0);
    let next = current.saturating_add(1);
    let kind = argument
        .value_type()
        .scalar()
        .filter(|ty| ty.is_integer())
        .unwrap_or(ScalarType::I32);
    let value = Value::integer(kind, next).ok_or_else(|| {
        Error::conversion(
            argument.name(),
            crate::error::ConversionError::InvalidValue {
                token: next.to_string(),
                target: kind.into(),
            },
        )
    })?;
    context.repository().set(destination, value);
    Ok(())
}

fn append(
    argument: &Argument,
    context: &mut ActionContext<'_>,
    values: &[Token],
) -> Result<(), Error> {
    check_value_count(argument, values.len())?;
    let Some(shape) = argument.value_type().shape() else {
        return Err(DeclarationError::NotEnumerable {
            name: argument.name().to_string(),
            action: BuiltinAction::Append.tag().to_string(),
            value_type: argument.value_type().clone(),
        }
        .into());
    };

    let incoming = if values.is_empty() {
        match argument.const_value() {
            Some(value) => value.clone().into_items(),
            None => Vec::new(),
        }
    } else {
        context.convert(argument, values)?.into_items()
    };

    let destination = argument.destination();
    let mut items = match context.repository().get(destination).and_then(Value::items) {
        Some(existing) => {
            let mut items = Vec::with_capacity(existing.len() + incoming.len());
            items.extend_from_slice(existing);
            items
        }
        None => Vec::with_capacity(incoming.len()),
    };
    items.extend(incoming);
    context
        .repository()
        .set(destination, Value::collection(shape, items));
    Ok(())
}

fn choose(
    argument: &Argument,
    context: &mut ActionContext<'_>,
    values: &[Token],
) -> Result<(), Error> {
    check_value_count(argument, values.len())?;
    let Some(token) = values.first() else {
        return Ok(());
    };
    let choices = argument.choices();
    if !choices.is_some_and(|c| c.contains(token.value())) {
        return Err(ParseError::InvalidChoice {
            argument: argument.name().to_string(),
            value: token.value().to_string(),
            choices: choices
                .map(|c| c.iter().cloned().collect())
                .unwrap_or_default(),
        }
        .into());
    }
    context
        .repository()
        .set(argument.destination(), token.value());
    Ok(())
}

fn check_value_count(argument: &Argument, found: usize) -> Result<(), ParseError> {
    match argument.arity() {
        Arity::Fixed(expected) if found < expected => Err(ParseError::MissingValue {
            argument: argument.name().to_string(),
            expected,
            found,
        }),
        Arity::AtLeastOne if found == 0 => {
            Err(ParseError::AtLeastOne(argument.name().to_string()))
        }
        _ => Ok(()),
    }
}

fn require_arity(
    action: BuiltinAction,
    argument: &Argument,
    expected: Arity,
) -> Result<(), DeclarationError> {
    if argument.arity() != expected {
        return Err(DeclarationError::InvalidArity {
            name: argument.name().to_string(),
            action: action.tag().to_string(),
            arity: argument.arity(),
        });
    }
    Ok(())
}

/// Rules shared by `store` and `append`: no zero arity, a const value only
/// with `?`/`*`, and a collection type when several values may arrive.
fn validate_store(action: BuiltinAction, argument: &Argument) -> Result<(), DeclarationError> {
    let arity = argument.arity();
    if arity == Arity::ZERO {
        return Err(DeclarationError::InvalidArity {
            name: argument.name().to_string(),
            action: action.tag().to_string(),
            arity,
        });
    }
    if argument.const_value().is_some() && !arity.is_optional() {
        return Err(DeclarationError::UnexpectedConst {
            name: argument.name().to_string(),
            action: action.tag().to_string(),
            arity,
        });
    }
    if arity.accepts_multiple() {
        require_enumerable(action, argument)?;
    }
    Ok(())
}

fn require_enumerable(action: BuiltinAction, argument: &Argument) -> Result<(), DeclarationError> {
    if !argument.value_type().is_enumerable() {
        return Err(DeclarationError::NotEnumerable {
            name: argument.name().to_string(),
            action: action.tag().to_string(),
            value_type: argument.value_type().clone(),
        });
    }
    Ok(())
}

/// Tag-to-action lookup, scoped to one parser.
///
/// Built-in tags always resolve to their [`BuiltinAction`] and cannot be
/// replaced.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    custom: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        tag: impl Into<String>,
        action: impl Action + 'static,
    ) -> Result<(), DeclarationError> {
        let tag = tag.into();
        if tag.trim().is_empty() {
            return Err(DeclarationError::UnknownAction(tag));
        }
        if BuiltinAction::from_tag(&tag).is_some() || self.custom.contains_key(&tag) {
            return Err(DeclarationError::DuplicateAction(tag));
        }
        tracing::debug!(tag = %tag, "registered custom action");
        self.custom.insert(tag, Arc::new(action));
        Ok(())
    }

    pub fn resolve(&self, tag: &str) -> Option<&dyn Action> {
        if let Some(builtin) = BuiltinAction::from_tag(tag) {
            return Some(builtin);
        }
        self.custom.get(tag).map(|action| &**action)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.resolve(tag).is_some()
    }
}
