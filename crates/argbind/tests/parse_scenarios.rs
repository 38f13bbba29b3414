use argbind::{
    ArgumentBuilder, ArgumentParser, Arity, DeclarationError, Error, ErrorMode, ParseError,
    ScalarType, Value, ValueType,
};

fn parser() -> ArgumentParser {
    ArgumentParser::new("scenario").error_mode(ErrorMode::Return)
}

fn server_parser() -> ArgumentParser {
    let mut p = parser();
    p.add_option("--name", ScalarType::String).unwrap();
    p.add_option("--max-connections", ScalarType::I32).unwrap();
    p.add(ArgumentBuilder::option("--database-use-ssl").action("store_true"))
        .unwrap();
    p.add(
        ArgumentBuilder::option("--database-tags")
            .of::<Vec<String>>()
            .arity(Arity::Any),
    )
    .unwrap();
    p
}

#[test]
fn server_configuration_scenario() {
    let args = server_parser()
        .parse([
            "--name",
            "argx",
            "--max-connections",
            "100",
            "--database-use-ssl",
            "--database-tags",
            "a",
            "b",
        ])
        .unwrap();

    assert_eq!(args.get("name"), Some("argx"));
    assert_eq!(args.try_get::<i32>("max-connections"), Some(100));
    assert_eq!(args.try_get::<bool>("database-use-ssl"), Some(true));
    assert_eq!(
        args.try_get::<Vec<String>>("database-tags"),
        Some(vec!["a".to_string(), "b".to_string()])
    );
    assert!(args.extras().is_empty());
}

#[test]
fn positionals_fill_in_declaration_order() {
    let mut p = parser();
    p.add_positional("first", ScalarType::String).unwrap();
    p.add_positional("second", ScalarType::I64).unwrap();

    let args = p.parse(["a", "42", "leftover"]).unwrap();
    assert_eq!(args.get("first"), Some("a"));
    assert_eq!(args.try_get::<i64>("second"), Some(42));
    assert_eq!(args.extras(), ["leftover"]);
}

#[test]
fn separator_turns_everything_after_into_positionals() {
    let mut p = parser();
    p.add_positional("pattern", ScalarType::String).unwrap();
    p.add_flag("--foo", true).unwrap();

    let args = p.parse(["--", "--foo", "x", "--", "y"]).unwrap();
    assert_eq!(args.get("pattern"), Some("--foo"));
    assert_eq!(args.try_get::<bool>("foo"), Some(false));
    assert_eq!(args.extras(), ["x", "y"]);
}

#[test]
fn append_accumulates_for_every_collection_shape() {
    for value_type in [
        ValueType::array(ScalarType::String),
        ValueType::list(ScalarType::String),
        ValueType::sequence(ScalarType::String),
    ] {
        let mut p = parser();
        p.add(
            ArgumentBuilder::option("--item")
                .action("append")
                .value_type(value_type.clone())
                .arity(Arity::AtLeastOne),
        )
        .unwrap();

        let args = p.parse(["--item", "a", "b", "--item", "c", "d"]).unwrap();
        assert_eq!(
            args.try_get::<Vec<String>>("item"),
            Some(vec!["a".into(), "b".into(), "c".into(), "d".into()]),
            "append into {value_type}"
        );
    }
}

#[test]
fn count_increments_per_occurrence() {
    let mut p = parser();
    p.add(ArgumentBuilder::option("-v").action("count")).unwrap();

    let args = p.parse(["-v", "-v", "-v"]).unwrap();
    assert_eq!(args.try_get::<i32>("v"), Some(3));

    let args = p.parse(Vec::<String>::new()).unwrap();
    assert_eq!(args.try_get::<i32>("v"), None);
}

#[test]
fn choice_rejects_values_outside_the_set() {
    let mut p = parser();
    p.add(
        ArgumentBuilder::option("--color")
            .action("choice")
            .choices(["white", "gray", "black"]),
    )
    .unwrap();

    let err = p.parse(["--color", "blue"]).unwrap_err();
    assert!(err.is_user_error());
    let message = err.to_string();
    for expected in ["blue", "white", "gray", "black"] {
        assert!(message.contains(expected), "missing {expected} in: {message}");
    }

    let args = p.parse(["--color", "white"]).unwrap();
    assert_eq!(args.get("color"), Some("white"));
}

#[test]
fn unknown_options_are_kept_as_extras() {
    let mut p = parser();
    p.add_option("--name", ScalarType::String).unwrap();

    let args = p.parse(["--baz", "--name", "x", "--qux"]).unwrap();
    assert_eq!(args.extras(), ["--baz", "--qux"]);
    assert_eq!(args.get("name"), Some("x"));
    assert!(!args.contains("baz"));
}

#[test]
fn positional_with_multiple_values_fails_before_parsing() {
    let mut p = parser();
    p.add(ArgumentBuilder::positional("files").arity(2usize))
        .unwrap();

    let err = p.parse(["a", "b"]).unwrap_err();
    assert_eq!(
        err,
        Error::Declaration(DeclarationError::PositionalArity {
            name: "files".to_string(),
            arity: Arity::Fixed(2),
        })
    );
    assert!(!err.is_user_error());

    assert!(matches!(
        p.parse(Vec::<String>::new()),
        Err(Error::Declaration(DeclarationError::PositionalArity { .. }))
    ));
}

#[test]
fn store_const_and_store_false() {
    let mut p = parser();
    p.add(
        ArgumentBuilder::option("--fast")
            .action("store_const")
            .destination("mode")
            .const_value("fast"),
    )
    .unwrap();
    p.add_flag("--no-color", false).unwrap();

    let args = p.parse(["--fast", "--no-color"]).unwrap();
    assert_eq!(args.get("mode"), Some("fast"));
    assert_eq!(args.try_get::<bool>("no-color"), Some(false));
}

#[test]
fn optional_arity_with_collection_target_writes_empty_collection() {
    let mut p = parser();
    p.add(
        ArgumentBuilder::option("--include")
            .of::<Vec<String>>()
            .arity(Arity::Any),
    )
    .unwrap();

    let args = p.parse(["--include"]).unwrap();
    assert_eq!(args.value("include"), Some(&Value::List(Vec::new())));
}

#[test]
fn invalid_collection_element_is_a_user_error() {
    let mut p = parser();
    p.add(
        ArgumentBuilder::option("--ports")
            .of::<Vec<u16>>()
            .arity(Arity::AtLeastOne),
    )
    .unwrap();

    let err = p.parse(["--ports", "80", "http"]).unwrap_err();
    assert!(matches!(err, Error::Parse(ParseError::InvalidValue { .. })));
    assert!(err.to_string().contains("http"));
}

#[test]
fn typed_reads_treat_mismatches_as_absence() {
    let args = server_parser().parse(["--name", "argx"]).unwrap();
    assert_eq!(args.try_get::<i32>("name"), None);
    assert_eq!(args.get_or_default::<i32>("max-connections"), 0);
    assert!(matches!(
        args.get_required::<i32>("max-connections"),
        Err(Error::MissingRequiredValue(key)) if key == "max-connections"
    ));
}
