use anyhow::{Context, Result};
use argbind::{ArgumentBuilder, ArgumentParser, Arity, Bind, DeclarationError};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Default, Serialize, Bind)]
#[bind(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub use_ssl: bool,
    pub tags: Vec<String>,
    pub pool_size: Option<u32>,
}

#[derive(Debug, Default, Serialize, Bind)]
pub struct ServerConfig {
    pub root: String,
    pub name: String,
    pub max_connections: i32,
    pub verbose: i32,
    pub log_format: String,
    pub database: DatabaseConfig,
    /// Tokens no declaration claimed.
    #[bind(skip)]
    pub extras: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing();

    let parser = build_parser().context("failed to declare arguments")?;
    let args = parser.parse(std::env::args().skip(1))?;

    if args.try_get::<bool>("help").unwrap_or(false) {
        print!("{}", parser.help());
        return Ok(());
    }

    let mut config = ServerConfig::default();
    args.bind(&mut config)
        .context("failed to bind arguments onto the server configuration")?;
    config.extras = args.extras().to_vec();
    tracing::debug!(name = %config.name, extras = config.extras.len(), "bound configuration");

    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn build_parser() -> Result<ArgumentParser, DeclarationError> {
    let mut parser = ArgumentParser::new("argbind-demo")
        .description("Print the server configuration described by the command line");

    parser
        .add(ArgumentBuilder::positional("root").usage("Directory to serve"))?
        .add(
            ArgumentBuilder::flag("--help", true)
                .alias("-h")
                .usage("Print help"),
        )?
        .add(
            ArgumentBuilder::option("--name")
                .alias("-n")
                .usage("Server name")
                .default_value("argbind"),
        )?
        .add(
            ArgumentBuilder::option("--max-connections")
                .of::<i32>()
                .usage("Connection limit")
                .default_value(100),
        )?
        .add(
            ArgumentBuilder::option("--verbose")
                .alias("-v")
                .action("count")
                .usage("Increase verbosity (repeatable)"),
        )?
        .add(
            ArgumentBuilder::option("--log-format")
                .action("choice")
                .choices(["text", "json"])
                .default_value("text")
                .usage("Log output format"),
        )?
        .add(
            ArgumentBuilder::option("--database-url")
                .value_name("URL")
                .usage("Database connection string"),
        )?
        .add(ArgumentBuilder::flag("--database-use-ssl", true).usage("Connect over TLS"))?
        .add(
            ArgumentBuilder::option("--database-tags")
                .action("append")
                .of::<Vec<String>>()
                .arity(Arity::AtLeastOne)
                .usage("Tags attached to the connection"),
        )?
        .add(
            ArgumentBuilder::option("--database-pool-size")
                .of::<u32>()
                .usage("Connection pool size"),
        )?;

    Ok(parser)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
