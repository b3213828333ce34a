//! Error types for declaration, parsing and configuration.
//!
//! Parse failures are reported through [`ParseError`] and recorded once per
//! parse in the registry's error slot. Each error maps to an [`ErrorKind`]
//! whose [`message`](ErrorKind::message) is a fixed string, so hosts can
//! print a stable message without formatting the offending token.

use thiserror::Error;

use crate::value::ValueKind;

/// Category of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SubcommandNotFound,
    FlagNotFound,
    PositionalArgOverflow,
    InvalidNumber,
    LongFlagGivenAsShort,
    MissingValue,
    UnexpectedValue,
    EmptyArguments,
    Internal,
}

impl ErrorKind {
    /// Static human-readable message for this kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use flagscope_core::ErrorKind;
    ///
    /// assert_eq!(
    ///     ErrorKind::FlagNotFound.message(),
    ///     "cannot find an appropriate flag"
    /// );
    /// ```
    pub fn message(self) -> &'static str {
        match self {
            Self::SubcommandNotFound => "cannot find an appropriate subcommand",
            Self::FlagNotFound => "cannot find an appropriate flag",
            Self::PositionalArgOverflow => "too many positional arguments were given",
            Self::InvalidNumber => "invalid number or overflowed number is given",
            Self::LongFlagGivenAsShort => "long flag name is given with a single dash",
            Self::MissingValue => "flag requires a value but none was given",
            Self::UnexpectedValue => "boolean flag does not take a value",
            Self::EmptyArguments => "no arguments were given",
            Self::Internal => "internal error",
        }
    }
}

/// A terminal parse failure.
///
/// The parser stops at the first one; values assigned before it are kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The first token named no declared subcommand.
    #[error("unknown subcommand: {0}")]
    SubcommandNotFound(String),
    /// No flag in the active scope matches the token.
    #[error("unknown flag: {0}")]
    FlagNotFound(String),
    /// More positional tokens than declared positional slots.
    #[error("unexpected positional argument: {0}")]
    PositionalArgOverflow(String),
    /// A value token could not be decoded for the flag's kind.
    #[error("invalid {kind} value for {flag}: {value}")]
    InvalidNumber {
        flag: String,
        value: String,
        kind: ValueKind,
    },
    /// A single-dash token longer than one character (e.g. `-ab`).
    #[error("long flag given with a single dash: {0}")]
    LongFlagGivenAsShort(String),
    /// A value-taking flag was the last token.
    #[error("missing value for flag: {0}")]
    MissingValue(String),
    /// `--flag=value` was given for a boolean flag.
    #[error("flag does not take a value: {0}")]
    UnexpectedValue(String),
    /// No user tokens and empty input is rejected.
    #[error("no arguments were given")]
    EmptyArguments,
    /// Declaration-time misuse, e.g. an undeclared subcommand scope.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ParseError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SubcommandNotFound(_) => ErrorKind::SubcommandNotFound,
            Self::FlagNotFound(_) => ErrorKind::FlagNotFound,
            Self::PositionalArgOverflow(_) => ErrorKind::PositionalArgOverflow,
            Self::InvalidNumber { .. } => ErrorKind::InvalidNumber,
            Self::LongFlagGivenAsShort(_) => ErrorKind::LongFlagGivenAsShort,
            Self::MissingValue(_) => ErrorKind::MissingValue,
            Self::UnexpectedValue(_) => ErrorKind::UnexpectedValue,
            Self::EmptyArguments => ErrorKind::EmptyArguments,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Declaration-time failures.
///
/// These describe misuse of the declaration API rather than bad user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclareError {
    /// The scope names a subcommand that was never declared.
    #[error("no subcommand named '{0}' has been declared")]
    UnknownScope(String),
    /// A configured capacity was exhausted.
    #[error("cannot declare more than {limit} {what}")]
    CapacityExceeded { what: &'static str, limit: usize },
    /// A subcommand with this name already exists.
    #[error("subcommand '{0}' is already declared")]
    DuplicateSubcommand(String),
}

/// Configuration loading and validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A field holds a value the parser cannot work with.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
