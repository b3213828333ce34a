use flagscope_core::{
    EmptyArgs, ErrorKind, FlagHandle, ParseError, PositionalHandle, Registry, Scope,
    SubcommandHandle,
};

struct Testing<'a> {
    fab: FlagHandle<bool>,
    install: SubcommandHandle,
    build: FlagHandle<&'a str>,
    package: PositionalHandle,
}

fn declare_testing<'a>(registry: &mut Registry<'a>) -> Testing<'a> {
    let fab = registry
        .declare_flag(Scope::Global, "fab", None, false, "fab is great!")
        .unwrap();
    let install = registry
        .declare_subcommand("install", "installing a programs")
        .unwrap();
    let build = registry
        .declare_flag(
            Scope::Subcommand("install"),
            "build",
            Some('b'),
            "./build",
            "building directory",
        )
        .unwrap();
    let package = registry
        .declare_positional(Scope::Subcommand("install"), "package", "what to install")
        .unwrap();
    Testing {
        fab,
        install,
        build,
        package,
    }
}

#[test]
fn test_end_to_end_install_with_build_dir() {
    let mut registry = Registry::new("testing", "A test program for testing");
    let t = declare_testing(&mut registry);

    registry
        .parse(&["testing", "install", "--build", "/tmp/x"], EmptyArgs::Allow)
        .unwrap();

    assert!(registry.is_active(t.install));
    assert_eq!(registry.value(t.build), "/tmp/x");
    assert!(!registry.value(t.fab));
    assert_eq!(registry.positional(t.package), None);
    assert!(registry.error().is_none());
    assert!(!registry.help_requested());
}

#[test]
fn test_inline_value_after_subcommand() {
    let mut registry = Registry::new("testing", "");
    let t = declare_testing(&mut registry);

    registry
        .parse(&["testing", "install", "--build=./out", "ripgrep"], EmptyArgs::Allow)
        .unwrap();

    assert_eq!(registry.active_subcommand().unwrap().name(), "install");
    assert_eq!(registry.value(t.build), "./out");
    assert_eq!(registry.positional(t.package), Some("ripgrep"));
}

#[test]
fn test_global_flags_are_out_of_scope_after_subcommand() {
    let mut registry = Registry::new("testing", "");
    let t = declare_testing(&mut registry);

    let err = registry
        .parse(&["testing", "install", "--fab"], EmptyArgs::Allow)
        .unwrap_err();

    assert_eq!(err, ParseError::FlagNotFound("--fab".to_string()));
    assert!(registry.is_active(t.install));
    assert!(!registry.value(t.fab));
}

#[test]
fn test_global_flags_when_first_token_is_a_flag() {
    let mut registry = Registry::new("testing", "");
    let t = declare_testing(&mut registry);

    registry.parse(&["testing", "--fab"], EmptyArgs::Allow).unwrap();

    assert!(registry.value(t.fab));
    assert!(!registry.is_active(t.install));
    assert!(registry.active_subcommand().is_none());
}

#[test]
fn test_subcommand_name_later_in_vector_is_positional() {
    let mut registry = Registry::new("testing", "");
    let t = declare_testing(&mut registry);

    let err = registry
        .parse(&["testing", "--fab", "install"], EmptyArgs::Allow)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PositionalArgOverflow);
    assert!(!registry.is_active(t.install));
}

#[test]
fn test_unknown_subcommand_activates_nothing() {
    let mut registry = Registry::new("testing", "");
    let t = declare_testing(&mut registry);

    let err = registry
        .parse(&["testing", "uninstall"], EmptyArgs::Allow)
        .unwrap_err();

    assert_eq!(err, ParseError::SubcommandNotFound("uninstall".to_string()));
    assert!(!registry.is_active(t.install));
    assert!(registry.active_subcommand().is_none());
    assert_eq!(
        registry.error_message(),
        Some("cannot find an appropriate subcommand")
    );
}

#[test]
fn test_positionals_fill_in_declaration_order() {
    let mut registry = Registry::new("cp", "");
    let verbose = registry
        .declare_flag(Scope::Global, "verbose", Some('v'), false, "")
        .unwrap();
    let a = registry.declare_positional(Scope::Global, "a", "").unwrap();
    let b = registry.declare_positional(Scope::Global, "b", "").unwrap();

    registry
        .parse(&["cp", "x", "-v", "y"], EmptyArgs::Allow)
        .unwrap();
    assert_eq!(registry.positional(a), Some("x"));
    assert_eq!(registry.positional(b), Some("y"));
    assert!(registry.value(verbose));

    registry.reset();
    let err = registry
        .parse(&["cp", "x", "y", "z"], EmptyArgs::Allow)
        .unwrap_err();
    assert_eq!(err, ParseError::PositionalArgOverflow("z".to_string()));
    // Assignments made before the failure are kept.
    assert_eq!(registry.positional(a), Some("x"));
    assert_eq!(registry.positional(b), Some("y"));
}

#[test]
fn test_bool_absent_keeps_default_present_sets_true() {
    let mut registry = Registry::new("prog", "");
    let on_by_default = registry
        .declare_flag(Scope::Global, "color", Some('c'), true, "")
        .unwrap();
    let off_by_default = registry
        .declare_flag(Scope::Global, "dry-run", Some('n'), false, "")
        .unwrap();

    registry.parse(&["prog", "--color"], EmptyArgs::Allow).unwrap();
    assert!(registry.value(on_by_default));
    assert!(!registry.value(off_by_default));

    registry.reset();
    registry.parse(&["prog", "-n"], EmptyArgs::Allow).unwrap();
    assert!(registry.value(on_by_default));
    assert!(registry.value(off_by_default));
}

macro_rules! width_case {
    ($name:ident, $ty:ty) => {
        #[test]
        fn $name() {
            let min = <$ty>::MIN.to_string();
            let max = <$ty>::MAX.to_string();
            let below = (i128::from(<$ty>::MIN) - 1).to_string();
            let above = (i128::from(<$ty>::MAX) + 1).to_string();
            let malformed = "12ab".to_string();

            for (token, expected) in [(&min, <$ty>::MIN), (&max, <$ty>::MAX)] {
                let mut registry = Registry::new("prog", "");
                let n = registry
                    .declare_flag(Scope::Global, "n", None, <$ty>::default(), "")
                    .unwrap();
                let args = ["prog", "--n", token.as_str()];
                registry.parse(&args, EmptyArgs::Allow).unwrap();
                assert_eq!(registry.value(n), expected);
            }

            for token in [&below, &above, &malformed] {
                let mut registry = Registry::new("prog", "");
                let n = registry
                    .declare_flag(Scope::Global, "n", None, <$ty>::default(), "")
                    .unwrap();
                let args = ["prog", "--n", token.as_str()];
                let err = registry.parse(&args, EmptyArgs::Allow).unwrap_err();
                assert_eq!(err.kind(), ErrorKind::InvalidNumber, "token {token}");
                assert_eq!(registry.value(n), <$ty>::default());
            }
        }
    };
}

width_case!(test_i8_width, i8);
width_case!(test_i16_width, i16);
width_case!(test_i32_width, i32);
width_case!(test_i64_width, i64);
width_case!(test_u8_width, u8);
width_case!(test_u16_width, u16);
width_case!(test_u32_width, u32);
width_case!(test_u64_width, u64);

#[test]
fn test_two_chars_after_single_dash() {
    let mut registry = Registry::new("prog", "");
    registry
        .declare_flag(Scope::Global, "ab", Some('a'), false, "")
        .unwrap();

    let err = registry.parse(&["prog", "-ab"], EmptyArgs::Allow).unwrap_err();
    assert_eq!(err, ParseError::LongFlagGivenAsShort("-ab".to_string()));
}

#[test]
fn test_first_error_wins_and_stops_scanning() {
    let mut registry = Registry::new("prog", "");
    let first = registry
        .declare_flag(Scope::Global, "first", None, false, "")
        .unwrap();
    let last = registry
        .declare_flag(Scope::Global, "last", None, false, "")
        .unwrap();

    let err = registry
        .parse(&["prog", "--first", "--missing", "--last"], EmptyArgs::Allow)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FlagNotFound);
    assert!(registry.value(first));
    assert!(!registry.value(last));

    // A later failure does not replace the recorded one.
    let _ = registry.parse(&["prog", "-xy"], EmptyArgs::Allow);
    assert_eq!(registry.error(), Some(&err));
}

#[test]
fn test_help_detection_global_and_scoped() {
    let mut registry = Registry::new("testing", "");
    declare_testing(&mut registry);

    registry.parse(&["testing", "-h"], EmptyArgs::Allow).unwrap();
    assert!(registry.help_requested());

    registry.reset();
    registry
        .parse(&["testing", "install", "--help"], EmptyArgs::Allow)
        .unwrap();
    assert!(registry.help_requested());

    registry.reset();
    registry.parse(&["testing", "install"], EmptyArgs::Allow).unwrap();
    assert!(!registry.help_requested());
}

#[test]
fn test_teardown_then_reinit_starts_clean() {
    let names: Vec<String> = (0..40).map(|i| format!("cmd{i}")).collect();

    let mut registry = Registry::new("testing", "");
    let t = declare_testing(&mut registry);
    for name in &names {
        registry.declare_subcommand(name, "").unwrap();
    }
    let _ = registry.parse(&["testing", "install", "--build", "x", "-zz"], EmptyArgs::Allow);
    assert!(registry.error().is_some());
    assert_eq!(registry.value(t.build), "x");
    registry.teardown();

    let mut registry = Registry::new("testing", "");
    let t = declare_testing(&mut registry);
    assert!(registry.error().is_none());
    assert_eq!(registry.value(t.build), "./build");
    assert!(!registry.value(t.fab));
    assert!(!registry.is_active(t.install));
    assert_eq!(registry.teardown(), 0);
}

#[test]
fn test_reset_restores_defaults_and_clears_error() {
    let mut registry = Registry::new("testing", "");
    let t = declare_testing(&mut registry);

    let _ = registry.parse(
        &["testing", "install", "-b", "out", "pkg", "extra"],
        EmptyArgs::Allow,
    );
    assert_eq!(registry.error().map(ParseError::kind), Some(ErrorKind::PositionalArgOverflow));

    registry.reset();
    assert!(registry.error().is_none());
    assert_eq!(registry.value(t.build), "./build");
    assert_eq!(registry.positional(t.package), None);
    assert!(!registry.is_active(t.install));

    registry
        .parse(&["testing", "install", "pkg"], EmptyArgs::Allow)
        .unwrap();
    assert_eq!(registry.positional(t.package), Some("pkg"));
}
