//! Raw argv classification.

use std::fmt;

/// The literal token that switches the parser into positional-only mode.
pub const SEPARATOR: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A value or positional (`file.txt`, `42`, ``).
    Argument,
    /// Anything dash-prefixed other than the separator (`-v`, `--name`, `-`).
    Option,
    /// Exactly `--`.
    Separator,
}

impl TokenKind {
    /// Classify a raw string.
    ///
    /// The separator check comes first, so `--` is never an option.
    pub fn classify(raw: &str) -> Self {
        if raw == SEPARATOR {
            Self::Separator
        } else if raw.starts_with('-') {
            Self::Option
        } else {
            Self::Argument
        }
    }
}

/// One classified argv entry.
///
/// Equality compares the text only; two tokens with the same value at
/// different positions are equal.
#[derive(Debug, Clone, Eq)]
pub struct Token {
    value: String,
    kind: TokenKind,
    position: usize,
}

impl Token {
    pub fn new(value: impl Into<String>, position: usize) -> Self {
        let value = value.into();
        let kind = TokenKind::classify(&value);
        Self {
            value,
            kind,
            position,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Index of this token in the original argv.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_argument(&self) -> bool {
        self.kind == TokenKind::Argument
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Classify a whole argv, keeping each entry's index.
pub fn tokenize<I, S>(args: I) -> Vec<Token>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    args.into_iter()
        .enumerate()
        .map(|(position, raw)| Token::new(raw, position))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_follows_separator_then_dash_rule() {
        assert_eq!(TokenKind::classify("--"), TokenKind::Separator);
        assert_eq!(TokenKind::classify("--name"), TokenKind::Option);
        assert_eq!(TokenKind::classify("-v"), TokenKind::Option);
        assert_eq!(TokenKind::classify("-"), TokenKind::Option);
        assert_eq!(TokenKind::classify("---"), TokenKind::Option);
        assert_eq!(TokenKind::classify("value"), TokenKind::Argument);
        assert_eq!(TokenKind::classify(""), TokenKind::Argument);
    }

    #[test]
    fn tokens_compare_by_value_only() {
        let a = Token::new("x", 0);
        let b = Token::new("x", 5);
        assert_eq!(a, b);
        assert_ne!(a.position(), b.position());
    }

    #[test]
    fn tokenize_keeps_positions() {
        let tokens = tokenize(["--name", "argx", "--", "-v"]);
        let kinds: Vec<TokenKind> = tokens.iter().map(Token::kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Option,
                TokenKind::Argument,
                TokenKind::Separator,
                TokenKind::Option
            ]
        );
        assert_eq!(tokens[3].position(), 3);
    }
}
