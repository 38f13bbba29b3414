//! How many value tokens an argument consumes.

use std::fmt;
use std::str::FromStr;

use crate::error::DeclarationError;

/// Symbolic token count.
///
/// String forms follow the usual CLI convention: `?` is optional,
/// `*` is any number, `+` is at least one, digits are a fixed count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    Fixed(usize),
    /// Zero or one.
    Optional,
    /// Zero or more.
    Any,
    /// One or more.
    AtLeastOne,
}

impl Arity {
    pub const ZERO: Self = Self::Fixed(0);
    pub const ONE: Self = Self::Fixed(1);

    pub fn is_fixed(self) -> bool {
        matches!(self, Self::Fixed(_))
    }

    /// Whether zero tokens are acceptable without a fixed contract.
    pub fn is_optional(self) -> bool {
        matches!(self, Self::Optional | Self::Any)
    }

    /// Whether more than one value token may be consumed.
    pub fn accepts_multiple(self) -> bool {
        match self {
            Self::Fixed(n) => n > 1,
            Self::Optional => false,
            Self::Any | Self::AtLeastOne => true,
        }
    }

    /// The smallest number of value tokens this arity accepts.
    pub fn min_values(self) -> usize {
        match self {
            Self::Fixed(n) => n,
            Self::Optional | Self::Any => 0,
            Self::AtLeastOne => 1,
        }
    }

    /// The largest number of value tokens, if bounded.
    pub fn max_values(self) -> Option<usize> {
        match self {
            Self::Fixed(n) => Some(n),
            Self::Optional => Some(1),
            Self::Any | Self::AtLeastOne => None,
        }
    }

    pub fn is_exactly(self, n: usize) -> bool {
        self == Self::Fixed(n)
    }
}

impl Default for Arity {
    fn default() -> Self {
        Self::ONE
    }
}

impl From<usize> for Arity {
    fn from(n: usize) -> Self {
        Self::Fixed(n)
    }
}

impl FromStr for Arity {
    type Err = DeclarationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "?" => Ok(Self::Optional),
            "*" => Ok(Self::Any),
            "+" => Ok(Self::AtLeastOne),
            other => other
                .parse::<usize>()
                .map(Self::Fixed)
                .map_err(|_| DeclarationError::UnknownArity(s.to_string())),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "{n}"),
            Self::Optional => f.write_str("?"),
            Self::Any => f.write_str("*"),
            Self::AtLeastOne => f.write_str("+"),
        }
    }
}
