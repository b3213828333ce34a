//! Scoped command-line parsing with borrowed values.
//!
//! A host declares flags, positional arguments and subcommands on a
//! [`Registry`], then hands it the argument vector:
//!
//! - [`Registry::declare_flag`] — a typed scalar flag (`bool`, 8 to 64-bit
//!   signed and unsigned integers, or `&str`) with long and/or short names.
//! - [`Registry::declare_positional`] — a slot filled by the N-th bare token.
//! - [`Registry::declare_subcommand`] — a one-level subcommand with its own
//!   flags and positionals, looked up through a chained hash
//!   [`index`](index::SubcommandIndex).
//! - [`Registry::parse`] — activates at most one subcommand, matches flags,
//!   fills positionals in order and decodes values, stopping at the first
//!   [`ParseError`].
//!
//! Names, descriptions and string values are borrowed for the registry's
//! lifetime; nothing is copied. The library never prints or exits: hosts
//! query [`Registry::error_message`] and [`Registry::help_requested`] and
//! decide, using [`render_help`] if they want stock help output.
//!
//! # Example
//!
//! ```
//! use flagscope_core::*;
//!
//! let mut registry = Registry::new("testing", "A test program");
//! let fab = registry
//!     .declare_flag(Scope::Global, "fab", None, false, "fab is great")
//!     .unwrap();
//! registry.declare_subcommand("install", "install a program").unwrap();
//! let build = registry
//!     .declare_flag(Scope::Subcommand("install"), "build", None, "./build", "")
//!     .unwrap();
//!
//! let args = vec!["testing".to_string(), "install".into(), "--fab".into()];
//! let err = registry.parse(&args, EmptyArgs::Allow).unwrap_err();
//!
//! // Global flags are out of scope once a subcommand is active.
//! assert_eq!(err.kind(), ErrorKind::FlagNotFound);
//! assert_eq!(registry.active_subcommand().unwrap().name(), "install");
//! assert_eq!(registry.value(build), "./build");
//! assert!(!registry.value(fab));
//! ```

mod config;
mod error;
mod help;
pub mod index;
mod parser;
mod registry;
mod snapshot;
mod value;

pub use config::{DEFAULT_INDEX_CAPACITY, DoubleDash, Limits, ParserConfig};
pub use error::{ConfigError, DeclareError, ErrorKind, ParseError};
pub use help::{render_help, write_help};
pub use parser::EmptyArgs;
pub use registry::{
    Flag, FlagHandle, Positional, PositionalHandle, Registry, Scope, Subcommand, SubcommandHandle,
};
pub use snapshot::{FlagSnapshot, PositionalSnapshot, RegistrySnapshot, SubcommandSnapshot};
pub use value::{DecodeError, FlagValue, Value, ValueKind, decode};
