//! Error types.
//!
//! Declaration, hard conversion and binding errors are programmer errors and
//! are always returned to the caller. Only [`ParseError`] is subject to the
//! parser's [`ErrorMode`](crate::ErrorMode).

use thiserror::Error;

use crate::arity::Arity;
use crate::value::ValueType;

/// Invalid argument declarations, caught when an argument is added (or, for
/// positional arity, when parsing starts).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    #[error("argument name cannot be empty")]
    EmptyName,

    #[error("positional argument '{0}' cannot start with '-'")]
    PositionalWithDash(String),

    #[error("option '{0}' must start with '-'")]
    OptionWithoutDash(String),

    #[error("alias '{0}' must start with '-'")]
    InvalidAlias(String),

    #[error("alias '{0}' is declared more than once")]
    DuplicateAlias(String),

    #[error("alias list for '{0}' cannot be empty")]
    EmptyAliases(String),

    #[error("positional argument '{0}' cannot have aliases")]
    PositionalWithAliases(String),

    #[error("positional argument '{name}' cannot use action '{action}'")]
    PositionalAction { name: String, action: String },

    #[error("positional argument '{name}' must have arity 1, found {arity}")]
    PositionalArity { name: String, arity: Arity },

    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("action '{0}' is already registered")]
    DuplicateAction(String),

    #[error("unknown arity '{0}'")]
    UnknownArity(String),

    #[error("action '{action}' of '{name}' does not accept arity {arity}")]
    InvalidArity {
        name: String,
        action: String,
        arity: Arity,
    },

    #[error("action '{action}' of '{name}' requires a const value")]
    MissingConst { name: String, action: String },

    #[error("action '{action}' of '{name}' only takes a const value with arity '?' or '*', found {arity}")]
    UnexpectedConst {
        name: String,
        action: String,
        arity: Arity,
    },

    #[error("action 'choice' of '{0}' requires a non-empty set of choices")]
    MissingChoices(String),

    #[error("action '{action}' of '{name}' requires a collection type, found {value_type}")]
    NotEnumerable {
        name: String,
        action: String,
        value_type: ValueType,
    },

    #[error("action '{action}' of '{name}' requires an integer type, found {value_type}")]
    NotInteger {
        name: String,
        action: String,
        value_type: ValueType,
    },

    #[error("invalid default value for '{name}': {source}")]
    InvalidDefault {
        name: String,
        #[source]
        source: ConversionError,
    },

    #[error("invalid const value for '{name}': {source}")]
    InvalidConst {
        name: String,
        #[source]
        source: ConversionError,
    },
}

/// Failures of the conversion engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The target type has no converter. This is a programming error.
    #[error("unsupported target type {0}")]
    UnsupportedType(ValueType),

    #[error("cannot convert '{token}' to {target}")]
    InvalidValue { token: String, target: ValueType },

    #[error("cannot convert element '{token}' at index {index} to {target}")]
    InvalidElement {
        token: String,
        index: usize,
        target: ValueType,
    },

    /// Several tokens were handed to a non-collection target. This is a
    /// caller contract violation, not bad input.
    #[error("{target} takes exactly one token, got {count}")]
    SingleTokenExpected { target: ValueType, count: usize },
}

impl ConversionError {
    /// Whether the failure was caused by the input text rather than by the
    /// declaration.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidValue { .. } | Self::InvalidElement { .. })
    }
}

/// Problems with the user's argv.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("argument '{argument}' expected {expected} value(s), found {found}")]
    MissingValue {
        argument: String,
        expected: usize,
        found: usize,
    },

    #[error("argument '{0}' requires at least one value")]
    AtLeastOne(String),

    #[error("invalid choice '{value}' for '{argument}' (choose from {})", join_quoted(.choices))]
    InvalidChoice {
        argument: String,
        value: String,
        choices: Vec<String>,
    },

    #[error("invalid value for '{argument}': {source}")]
    InvalidValue {
        argument: String,
        #[source]
        source: ConversionError,
    },

    #[error("missing required argument: {0}")]
    MissingRequired(String),
}

/// Structural mismatches found while binding onto a target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("cannot create {type_name} for '{key}': type has no constructor")]
    MissingConstructor {
        key: String,
        type_name: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Declaration(#[from] DeclarationError),

    #[error(transparent)]
    Conversion(ConversionError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error("missing required value '{0}'")]
    MissingRequiredValue(String),
}

impl Error {
    /// Whether the error came from user input (and so follows the parser's
    /// error mode) rather than from the program's own declarations.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// Route a conversion failure for `argument`: bad input becomes a
    /// [`ParseError`], anything else stays a hard failure.
    pub(crate) fn conversion(argument: &str, source: ConversionError) -> Self {
        if source.is_user_error() {
            Self::Parse(ParseError::InvalidValue {
                argument: argument.to_string(),
                source,
            })
        } else {
            Self::Conversion(source)
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

fn join_quoted(items: &[String]) -> String {
    items
        .iter()
        .map(|s| format!("'{s}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ScalarType;

    #[test]
    fn invalid_choice_lists_every_choice() {
        let err = ParseError::InvalidChoice {
            argument: "--color".to_string(),
            value: "blue".to_string(),
            choices: vec!["white".into(), "gray".into(), "black".into()],
        };
        assert_eq!(
            err.to_string(),
            "invalid choice 'blue' for '--color' (choose from 'white', 'gray', 'black')"
        );
    }

    #[test]
    fn conversion_routing_separates_user_and_hard_failures() {
        let bad_input = ConversionError::InvalidValue {
            token: "abc".to_string(),
            target: ValueType::Scalar(ScalarType::I32),
        };
        assert!(Error::conversion("--port", bad_input).is_user_error());

        let unsupported = ConversionError::UnsupportedType(ValueType::Scalar(ScalarType::I32));
        assert!(!Error::conversion("--port", unsupported).is_user_error());
    }
}
