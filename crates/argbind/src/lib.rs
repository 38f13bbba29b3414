//! Declarative command-line parsing with typed values and struct binding.
//!
//! # Example
//!
//! ```rust
//! use argbind::{ArgumentBuilder, ArgumentParser, Arity, Bind, ErrorMode};
//!
//! #[derive(Debug, Default, Bind)]
//! pub struct Config {
//!     pub name: String,
//!     pub max_connections: i32,
//!     pub tags: Vec<String>,
//! }
//!
//! let mut parser = ArgumentParser::new("demo").error_mode(ErrorMode::Return);
//! parser.add(ArgumentBuilder::option("--name"))?;
//! parser.add(ArgumentBuilder::option("--max-connections").of::<i32>())?;
//! parser.add(
//!     ArgumentBuilder::option("--tags")
//!         .of::<Vec<String>>()
//!         .arity(Arity::Any),
//! )?;
//!
//! let args = parser.parse(["--name", "argbind", "--max-connections", "100", "--tags", "a", "b"])?;
//!
//! let mut config = Config::default();
//! args.bind(&mut config)?;
//! assert_eq!(config.name, "argbind");
//! assert_eq!(config.max_connections, 100);
//! assert_eq!(config.tags, ["a", "b"]);
//! # Ok::<(), argbind::Error>(())
//! ```

pub mod action;
pub mod arguments;
pub mod arity;
pub mod bind;
pub mod convert;
pub mod declaration;
pub mod error;
mod help;
pub mod parser;
pub mod repository;
pub mod token;
pub mod value;

pub use action::{Action, ActionContext, ActionRegistry, BuiltinAction};
pub use arguments::Arguments;
pub use arity::Arity;
pub use bind::{Bindable, Binder, FieldName, bind, to_dash_case};
pub use convert::{ConversionOptions, Converter, NumberFormat, NumberStyles};
pub use declaration::{AliasSet, Argument, ArgumentBuilder};
pub use error::{BindError, ConversionError, DeclarationError, Error, ParseError, Result};
pub use parser::{ArgumentParser, DEFAULT_EXIT_CODE, ErrorMode};
pub use repository::ValueRepository;
pub use token::{SEPARATOR, Token, TokenKind, tokenize};
pub use value::{ArgType, CollectionShape, FromValue, ScalarType, Value, ValueType};

#[cfg(feature = "derive")]
pub use argbind_macros::Bind;
