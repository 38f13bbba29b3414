use argbind::{
    ArgumentBuilder, ArgumentParser, Arguments, Arity, Bind, BindError, Error, ErrorMode,
    ScalarType, ValueRepository,
};
use chrono::TimeDelta;

#[derive(Debug, Default, PartialEq, Bind)]
#[bind(default)]
pub struct Child {
    pub label: String,
}

#[derive(Debug, Default, Bind)]
pub struct Holder {
    pub child: Option<Child>,
}

#[derive(Debug, Default, PartialEq, Bind)]
#[bind(default)]
pub struct DatabaseConfig {
    pub use_ssl: bool,
    pub tags: Vec<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Bind)]
pub struct ServerConfig {
    pub name: String,
    pub max_connections: i32,
    pub database: DatabaseConfig,
    #[bind(rename = "log-level")]
    pub verbosity: String,
    #[bind(skip)]
    pub skipped: String,
    hidden: String,
}

#[derive(Debug, Default, Bind)]
pub struct Timeouts {
    pub connect: TimeDelta,
    #[bind(value)]
    pub idle: chrono::Duration,
    pub retry: Option<TimeDelta>,
}

fn arguments(entries: &[(&str, &str)]) -> Arguments {
    let mut repo = ValueRepository::new();
    for (key, value) in entries {
        repo.set(key, *value);
    }
    Arguments::new(repo, Vec::new())
}

#[test]
fn nested_object_is_created_and_bound() {
    let args = arguments(&[("child-label", "x")]);
    let mut holder = Holder::default();
    assert!(holder.child.is_none());

    args.bind(&mut holder).unwrap();

    assert_eq!(holder.child.as_ref().map(|c| c.label.as_str()), Some("x"));
}

#[test]
fn parsed_arguments_bind_onto_nested_config() {
    let mut parser = ArgumentParser::new("server").error_mode(ErrorMode::Return);
    parser.add_option("--name", ScalarType::String).unwrap();
    parser
        .add_option("--max-connections", ScalarType::I32)
        .unwrap();
    parser.add_flag("--database-use-ssl", true).unwrap();
    parser
        .add(
            ArgumentBuilder::option("--database-tags")
                .of::<Vec<String>>()
                .arity(Arity::Any),
        )
        .unwrap();
    parser.add_option("--log-level", ScalarType::String).unwrap();
    parser.add_option("--skipped", ScalarType::String).unwrap();
    parser.add_option("--hidden", ScalarType::String).unwrap();

    let args = parser
        .parse([
            "--name",
            "argx",
            "--max-connections",
            "100",
            "--database-use-ssl",
            "--database-tags",
            "a",
            "b",
            "--log-level",
            "debug",
            "--skipped",
            "nope",
            "--hidden",
            "nope",
        ])
        .unwrap();

    let mut config = ServerConfig::default();
    args.bind(&mut config).unwrap();

    assert_eq!(config.name, "argx");
    assert_eq!(config.max_connections, 100);
    assert_eq!(
        config.database,
        DatabaseConfig {
            use_ssl: true,
            tags: vec!["a".to_string(), "b".to_string()],
            port: None,
        }
    );
    assert_eq!(config.verbosity, "debug");
    assert_eq!(config.skipped, "");
    assert_eq!(config.hidden, "");
}

#[test]
fn absent_keys_leave_fields_untouched() {
    let args = arguments(&[("database-port", "not-a-number")]);
    let mut config = ServerConfig {
        name: "preset".to_string(),
        max_connections: 7,
        ..ServerConfig::default()
    };
    args.bind(&mut config).unwrap();
    assert_eq!(config.name, "preset");
    assert_eq!(config.max_connections, 7);
    assert_eq!(config.database.port, None);
}

#[derive(Debug, Bind)]
pub struct NoConstructor {
    pub label: String,
}

#[derive(Debug, Default, Bind)]
pub struct NeedsConstructor {
    pub inner: Option<NoConstructor>,
}

#[test]
fn nested_type_without_constructor_is_a_hard_failure() {
    let args = arguments(&[("inner-label", "x")]);
    let mut target = NeedsConstructor::default();
    let err = args.bind(&mut target).unwrap_err();
    assert!(!err.is_user_error());
    match err {
        Error::Bind(BindError::MissingConstructor { key, type_name }) => {
            assert_eq!(key, "inner");
            assert!(type_name.ends_with("NoConstructor"), "{type_name}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(target.inner.is_none());
}

#[test]
fn duration_fields_bind_as_values() {
    let mut parser = ArgumentParser::new("timeouts").error_mode(ErrorMode::Return);
    parser.add_option("--connect", ScalarType::Duration).unwrap();
    parser.add_option("--idle", ScalarType::Duration).unwrap();
    parser.add_option("--retry", ScalarType::Duration).unwrap();

    let args = parser
        .parse(["--connect", "00:00:30", "--idle", "5m", "--retry", "1"])
        .unwrap();
    let mut timeouts = Timeouts::default();
    args.bind(&mut timeouts).unwrap();

    assert_eq!(timeouts.connect, TimeDelta::seconds(30));
    assert_eq!(timeouts.idle, TimeDelta::minutes(5));
    assert_eq!(timeouts.retry, Some(TimeDelta::days(1)));
}
