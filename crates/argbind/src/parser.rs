use std::collections::VecDeque;

use crate::action::{self, Action, ActionContext, ActionRegistry};
use crate::arguments::Arguments;
use crate::arity::Arity;
use crate::convert::{ConversionOptions, Converter};
use crate::declaration::{Argument, ArgumentBuilder};
use crate::error::{DeclarationError, Error, ParseError};
use crate::repository::ValueRepository;
use crate::token::{Token, TokenKind, tokenize};
use crate::value::ValueType;

/// Exit status used by [`ErrorMode::Exit`] unless configured otherwise.
pub const DEFAULT_EXIT_CODE: i32 = 2;

/// What to do with a malformed command line.
///
/// Only user input errors follow this mode. Declaration and conversion
/// failures caused by the program itself are always returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMode {
    /// Print the usage line and the error to stderr, then exit the process.
    Exit { code: i32 },
    /// Return the error to the caller.
    Return,
}

impl Default for ErrorMode {
    fn default() -> Self {
        Self::Exit {
            code: DEFAULT_EXIT_CODE,
        }
    }
}

/// A set of argument declarations and the machinery to parse against them.
#[derive(Debug, Clone)]
pub struct ArgumentParser {
    program: String,
    description: String,
    positionals: Vec<Argument>,
    options: Vec<Argument>,
    registry: ActionRegistry,
    converter: Converter,
    error_mode: ErrorMode,
}

impl ArgumentParser {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            description: String::new(),
            positionals: Vec::new(),
            options: Vec::new(),
            registry: ActionRegistry::default(),
            converter: Converter::default(),
            error_mode: ErrorMode::default(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    pub fn conversion_options(mut self, options: ConversionOptions) -> Self {
        self.converter = Converter::new(options);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn about(&self) -> &str {
        &self.description
    }

    pub fn mode(&self) -> ErrorMode {
        self.error_mode
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    /// Positional declarations in consumption order.
    pub fn positionals(&self) -> &[Argument] {
        &self.positionals
    }

    /// Option declarations in declaration order.
    pub fn options(&self) -> &[Argument] {
        &self.options
    }

    /// Make a custom action available under `tag` for later declarations.
    pub fn register_action(
        &mut self,
        tag: impl Into<String>,
        action: impl Action + 'static,
    ) -> Result<&mut Self, DeclarationError> {
        self.registry.register(tag, action)?;
        Ok(self)
    }

    /// Validate and add a declaration.
    pub fn add(&mut self, builder: ArgumentBuilder) -> Result<&mut Self, DeclarationError> {
        let argument = builder.build(&self.registry, &self.converter)?;
        tracing::debug!(
            name = argument.name(),
            action = argument.action(),
            destination = argument.destination(),
            arity = %argument.arity(),
            "declared argument"
        );
        if argument.is_positional() {
            self.positionals.push(argument);
        } else {
            self.options.push(argument);
        }
        Ok(self)
    }

    pub fn add_positional(
        &mut self,
        name: impl Into<String>,
        value_type: impl Into<ValueType>,
    ) -> Result<&mut Self, DeclarationError> {
        self.add(ArgumentBuilder::positional(name).value_type(value_type))
    }

    pub fn add_option(
        &mut self,
        name: impl Into<String>,
        value_type: impl Into<ValueType>,
    ) -> Result<&mut Self, DeclarationError> {
        self.add(ArgumentBuilder::option(name).value_type(value_type))
    }

    /// Add a boolean switch that stores `value` when present.
    pub fn add_flag(
        &mut self,
        name: impl Into<String>,
        value: bool,
    ) -> Result<&mut Self, DeclarationError> {
        self.add(ArgumentBuilder::flag(name, value))
    }

    /// Parse `args` (without the program name).
    ///
    /// User input errors follow the configured [`ErrorMode`]; in exit mode
    /// this function does not return for them.
    pub fn parse<I, S>(&self, args: I) -> Result<Arguments, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(tokenize(args)).map_err(|err| self.raise(err))
    }

    fn run(&self, tokens: Vec<Token>) -> Result<Arguments, Error> {
        tracing::debug!(program = %self.program, tokens = tokens.len(), "parsing arguments");

        if let Some(argument) = self.positionals.iter().find(|a| a.arity() != Arity::ONE) {
            return Err(DeclarationError::PositionalArity {
                name: argument.name().to_string(),
                arity: argument.arity(),
            }
            .into());
        }

        let mut repository = self.seed_defaults();
        let mut positionals: VecDeque<&Argument> = self.positionals.iter().collect();
        let mut extras = Vec::new();
        let mut consume_options = true;

        let mut index = 0;
        while index < tokens.len() {
            let token = &tokens[index];
            tracing::trace!(index, token = token.value(), kind = ?token.kind(), "token");

            match token.kind() {
                TokenKind::Separator => {
                    consume_options = false;
                    index += 1;
                }
                TokenKind::Option if consume_options => {
                    let Some(argument) = self.find_option(token.value()) else {
                        extras.push(token.value().to_string());
                        index += 1;
                        continue;
                    };
                    let consumed = resolve_arity(argument, &tokens[index + 1..])?;
                    tracing::trace!(argument = argument.name(), consumed, "resolved arity");
                    let end = (index + 1 + consumed).min(tokens.len());
                    let action = self
                        .registry
                        .resolve(argument.action())
                        .ok_or_else(|| DeclarationError::UnknownAction(argument.action().to_string()))?;
                    let mut context = ActionContext::new(&self.converter, &mut repository);
                    action.execute(argument, &mut context, &tokens[index..end])?;
                    index += 1 + consumed;
                }
                _ => {
                    match positionals.pop_front() {
                        Some(argument) => {
                            let mut context = ActionContext::new(&self.converter, &mut repository);
                            action::store_values(argument, &mut context, std::slice::from_ref(token))?;
                        }
                        None => extras.push(token.value().to_string()),
                    }
                    index += 1;
                }
            }
        }

        if let Some(argument) = self
            .positionals
            .iter()
            .chain(&self.options)
            .find(|a| a.is_required() && !repository.contains_key(a.destination()))
        {
            return Err(ParseError::MissingRequired(argument.display_name()).into());
        }

        tracing::debug!(values = repository.len(), extras = extras.len(), "parsed arguments");
        Ok(Arguments::new(repository, extras))
    }

    /// Primary names win over aliases.
    fn find_option(&self, name: &str) -> Option<&Argument> {
        self.options
            .iter()
            .find(|a| a.name() == name)
            .or_else(|| self.options.iter().find(|a| a.aliases().contains(name)))
    }

    /// Defaults were brought to their declared types when added.
    fn seed_defaults(&self) -> ValueRepository {
        let mut repository = ValueRepository::new();
        for argument in self.positionals.iter().chain(&self.options) {
            if let Some(default) = argument.default_value() {
                repository.set(argument.destination(), default.clone());
            }
        }
        repository
    }

    /// The single exit point for parse failures.
    fn raise(&self, err: Error) -> Error {
        match self.error_mode {
            ErrorMode::Exit { code } if err.is_user_error() => {
                tracing::debug!(code, error = %err, "exiting on parse error");
                eprintln!("{}", self.usage());
                eprintln!("{}: error: {err}", self.program);
                std::process::exit(code)
            }
            _ => err,
        }
    }
}

/// Number of value tokens an option takes at this occurrence. `rest` is
/// everything after the option's own token.
fn resolve_arity(argument: &Argument, rest: &[Token]) -> Result<usize, ParseError> {
    let run = || rest.iter().take_while(|t| t.is_argument()).count();
    match argument.arity() {
        Arity::Fixed(n) => Ok(n),
        Arity::Optional => Ok(usize::from(rest.first().is_some_and(Token::is_argument))),
        Arity::Any => Ok(run()),
        Arity::AtLeastOne => match run() {
            0 => Err(ParseError::AtLeastOne(argument.name().to_string())),
            n => Ok(n),
        },
    }
}
