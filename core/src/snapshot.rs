//! Serializable view of a registry.
//!
//! Hosts that render help themselves, or want to export the declared
//! interface as JSON or YAML, take a [`RegistrySnapshot`] instead of
//! walking the registry by hand.

use serde::Serialize;

use crate::registry::{Flag, Positional, Registry};
use crate::value::{Value, ValueKind};

/// A declared flag with its default and current value.
#[derive(Debug, Clone, Serialize)]
pub struct FlagSnapshot<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    pub long: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    pub kind: ValueKind,
    pub default: Value<'a>,
    pub value: Value<'a>,
    pub description: &'a str,
}

/// A declared positional argument and its assigned token.
#[derive(Debug, Clone, Serialize)]
pub struct PositionalSnapshot<'a> {
    pub name: &'a str,
    pub value: Option<&'a str>,
    pub description: &'a str,
}

/// A declared subcommand with its scoped declarations.
#[derive(Debug, Clone, Serialize)]
pub struct SubcommandSnapshot<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub active: bool,
    pub flags: Vec<FlagSnapshot<'a>>,
    pub positionals: Vec<PositionalSnapshot<'a>>,
}

/// Everything a registry declares, plus parse results.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrySnapshot<'a> {
    pub program: &'a str,
    pub description: &'a str,
    pub flags: Vec<FlagSnapshot<'a>>,
    pub positionals: Vec<PositionalSnapshot<'a>>,
    pub subcommands: Vec<SubcommandSnapshot<'a>>,
    pub active: Option<&'a str>,
    pub error: Option<String>,
}

impl<'a> From<&Flag<'a>> for FlagSnapshot<'a> {
    fn from(flag: &Flag<'a>) -> Self {
        Self {
            long: flag.long(),
            short: flag.short(),
            kind: flag.kind(),
            default: flag.default_value(),
            value: flag.value(),
            description: flag.description(),
        }
    }
}

impl<'a> From<&Positional<'a>> for PositionalSnapshot<'a> {
    fn from(positional: &Positional<'a>) -> Self {
        Self {
            name: positional.name(),
            value: positional.value(),
            description: positional.description(),
        }
    }
}

impl<'a> Registry<'a> {
    /// Captures declarations and current values.
    ///
    /// # Examples
    ///
    /// ```
    /// use flagscope_core::{Registry, Scope};
    ///
    /// let mut registry = Registry::new("prog", "demo");
    /// registry
    ///     .declare_flag(Scope::Global, "jobs", Some('j'), 2u8, "parallel jobs")
    ///     .unwrap();
    ///
    /// let json = serde_json::to_value(registry.snapshot()).unwrap();
    /// assert_eq!(json["program"], "prog");
    /// assert_eq!(json["flags"][1]["kind"], "u8");
    /// assert_eq!(json["flags"][1]["default"], 2);
    /// ```
    pub fn snapshot(&self) -> RegistrySnapshot<'a> {
        RegistrySnapshot {
            program: self.program_name(),
            description: self.description(),
            flags: self.global_flags().iter().map(FlagSnapshot::from).collect(),
            positionals: self
                .global_positionals()
                .iter()
                .map(PositionalSnapshot::from)
                .collect(),
            subcommands: self
                .subcommands()
                .iter()
                .map(|sub| SubcommandSnapshot {
                    name: sub.name(),
                    description: sub.description(),
                    active: sub.is_active(),
                    flags: sub.flags().iter().map(FlagSnapshot::from).collect(),
                    positionals: sub.positionals().iter().map(PositionalSnapshot::from).collect(),
                })
                .collect(),
            active: self.active_subcommand().map(|sub| sub.name()),
            error: self.error().map(ToString::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::parser::EmptyArgs;
    use crate::registry::{Registry, Scope};

    #[test]
    fn test_snapshot_reflects_parse_results() {
        let mut registry = Registry::new("testing", "");
        registry.declare_subcommand("install", "install things").unwrap();
        registry
            .declare_flag(Scope::Subcommand("install"), "build", None, "./build", "")
            .unwrap();
        registry
            .declare_positional(Scope::Subcommand("install"), "package", "")
            .unwrap();

        registry
            .parse(&["testing", "install", "--build", "out", "ripgrep"], EmptyArgs::Allow)
            .unwrap();

        let json = serde_json::to_value(registry.snapshot()).unwrap();
        assert_eq!(json["active"], "install");
        assert_eq!(json["error"], serde_json::Value::Null);
        let install = &json["subcommands"][0];
        assert_eq!(install["active"], true);
        assert_eq!(
            install["flags"][1],
            json!({
                "long": "build",
                "kind": "str",
                "default": "./build",
                "value": "out",
                "description": ""
            })
        );
        assert_eq!(install["positionals"][0]["value"], "ripgrep");
    }

    #[test]
    fn test_snapshot_carries_error_text() {
        let mut registry = Registry::new("prog", "");
        let _ = registry.parse(&["prog", "--nope"], EmptyArgs::Allow);
        let snapshot = registry.snapshot();
        assert_eq!(snapshot.error.as_deref(), Some("unknown flag: --nope"));
    }
}
