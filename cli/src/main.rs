use std::path::PathBuf;
use std::process::ExitCode;

use flagscope_core::{
    ConfigError, DeclareError, EmptyArgs, FlagHandle, ParserConfig, PositionalHandle, Registry,
    Scope, SubcommandHandle, render_help,
};
use tracing::{debug, info};

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable naming an optional YAML/JSON parser config file.
const CONFIG_ENV: &str = "FLAGSCOPE_CONFIG";

struct Handles<'a> {
    fab: FlagHandle<bool>,
    verbose: FlagHandle<bool>,
    jobs: FlagHandle<u8>,
    dump_schema: FlagHandle<bool>,
    install: SubcommandHandle,
    build: FlagHandle<&'a str>,
    retries: FlagHandle<u16>,
    package: PositionalHandle,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: failed to load parser config: {e}");
            return ExitCode::FAILURE;
        }
    };

    let args: Vec<String> = std::env::args().collect();
    let mut registry =
        Registry::with_config("testing", "A test program for testing flagscope", config);
    let code = match declare(&mut registry) {
        Ok(handles) => run(&mut registry, &handles, &args),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    };

    let released = registry.teardown();
    debug!(released, "Released subcommand index");
    code
}

fn load_config() -> Result<ParserConfig, ConfigError> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            let path = PathBuf::from(path);
            debug!(path = %path.display(), "Loading parser config");
            ParserConfig::load(path)
        }
        None => Ok(ParserConfig::default()),
    }
}

fn declare<'a>(registry: &mut Registry<'a>) -> Result<Handles<'a>, DeclareError> {
    let fab = registry.declare_flag(Scope::Global, "fab", None, false, "fab is great!")?;
    let verbose =
        registry.declare_flag(Scope::Global, "verbose", Some('v'), false, "Print parsed values")?;
    let jobs = registry.declare_flag(Scope::Global, "jobs", Some('j'), 1u8, "Parallel jobs")?;
    let dump_schema = registry.declare_flag(
        Scope::Global,
        "dump-schema",
        None,
        false,
        "Print the declared interface as JSON",
    )?;

    let install = registry.declare_subcommand("install", "installing a programs")?;
    let build = registry.declare_flag(
        Scope::Subcommand("install"),
        "build",
        Some('b'),
        "./build",
        "Build directory",
    )?;
    let retries = registry.declare_flag(
        Scope::Subcommand("install"),
        "retries",
        Some('r'),
        3u16,
        "Download retries",
    )?;
    let package =
        registry.declare_positional(Scope::Subcommand("install"), "package", "Package to install")?;

    Ok(Handles {
        fab,
        verbose,
        jobs,
        dump_schema,
        install,
        build,
        retries,
        package,
    })
}

fn run<'a>(registry: &mut Registry<'a>, handles: &Handles<'a>, args: &'a [String]) -> ExitCode {
    info!(
        version = PACKAGE_VERSION,
        tokens = args.len().saturating_sub(1),
        "Parsing arguments"
    );
    if let Err(e) = registry.parse(args, EmptyArgs::Allow) {
        eprintln!("error: {e}");
        if let Some(message) = registry.error_message() {
            eprintln!("{message}");
        }
        return ExitCode::FAILURE;
    }

    if registry.help_requested() {
        print!("{}", render_help(registry));
        return ExitCode::SUCCESS;
    }

    if registry.value(handles.dump_schema) {
        return match serde_json::to_string_pretty(&registry.snapshot()) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: JSON serialization failed: {e}");
                ExitCode::FAILURE
            }
        };
    }

    // `build` falls back to its default outside `install`.
    if registry.value(handles.fab) {
        println!("Hello World!");
    } else {
        println!("{}", registry.value(handles.build));
    }

    if registry.value(handles.verbose) {
        println!("jobs: {}", registry.value(handles.jobs));
    }
    if registry.is_active(handles.install) {
        println!("retries: {}", registry.value(handles.retries));
        if let Some(package) = registry.positional(handles.package) {
            println!("package: {package}");
        }
    }

    ExitCode::SUCCESS
}
