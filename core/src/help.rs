//! Help text rendering.
//!
//! A read-only view over a [`Registry`]: when a subcommand is active only
//! its flags and positionals are listed, otherwise the global ones plus the
//! subcommand table. Columns are aligned to the widest entry.

use std::io;

use crate::registry::{Flag, Positional, Registry};

const INDENT: &str = "    ";
const GAP: usize = 4;
const UNNAMED_PROGRAM: &str = "(*.*)";

/// Renders help for the active scope.
///
/// # Examples
///
/// ```
/// use flagscope_core::{Registry, Scope, render_help};
///
/// let mut registry = Registry::new("prog", "");
/// registry
///     .declare_flag(Scope::Global, "fab", None, false, "fab is great")
///     .unwrap();
///
/// let help = render_help(&registry);
/// assert!(help.starts_with("Usage: prog [FLAGS]\n"));
/// assert!(help.contains("--fab"));
/// ```
pub fn render_help(registry: &Registry<'_>) -> String {
    let mut out = String::new();

    if !registry.description().is_empty() {
        out.push_str(registry.description());
        out.push_str("\n\n");
    }

    let program = match registry.program_name() {
        "" => UNNAMED_PROGRAM,
        name => name,
    };

    let (flags, positionals, subcommand) = match registry.active_subcommand() {
        Some(sub) => (sub.flags(), sub.positionals(), Some(sub.name())),
        None => (registry.global_flags(), registry.global_positionals(), None),
    };

    let mut usage = format!("Usage: {program}");
    match subcommand {
        Some(name) => {
            usage.push(' ');
            usage.push_str(name);
        }
        None if !registry.subcommands().is_empty() => usage.push_str(" [SUBCOMMAND]"),
        None => {}
    }
    if !flags.is_empty() {
        usage.push_str(" [FLAGS]");
    }
    for positional in positionals {
        usage.push_str(&format!(" <{}>", positional.name()));
    }
    out.push_str(&usage);
    out.push('\n');

    if !flags.is_empty() {
        out.push_str("\nOptions:\n");
        let rows: Vec<(String, String)> = flags.iter().map(flag_row).collect();
        push_table(&mut out, &rows);
    }

    if !positionals.is_empty() {
        out.push_str("\nArguments:\n");
        let rows: Vec<(String, String)> = positionals.iter().map(positional_row).collect();
        push_table(&mut out, &rows);
    }

    if subcommand.is_none() && !registry.subcommands().is_empty() {
        out.push_str("\nSubcommands:\n");
        let rows: Vec<(String, String)> = registry
            .subcommands()
            .iter()
            .map(|sub| (sub.name().to_string(), sub.description().to_string()))
            .collect();
        push_table(&mut out, &rows);
    }

    out
}

/// Writes [`render_help`] output to `out`.
pub fn write_help(registry: &Registry<'_>, mut out: impl io::Write) -> io::Result<()> {
    out.write_all(render_help(registry).as_bytes())
}

fn flag_row(flag: &Flag<'_>) -> (String, String) {
    let mut label = match (flag.short(), flag.long()) {
        (Some(short), "") => format!("-{short}"),
        (Some(short), long) => format!("-{short}, --{long}"),
        (None, long) => format!("    --{long}"),
    };
    let mut description = flag.description().to_string();

    if flag.kind().takes_value() {
        label.push_str(&format!(" <{}>", flag.kind()));
        let default = flag.default_value().to_string();
        if !default.is_empty() {
            if !description.is_empty() {
                description.push(' ');
            }
            description.push_str(&format!("[default: {default}]"));
        }
    }
    (label, description)
}

fn positional_row(positional: &Positional<'_>) -> (String, String) {
    (
        format!("<{}>", positional.name()),
        positional.description().to_string(),
    )
}

fn push_table(out: &mut String, rows: &[(String, String)]) {
    let width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0)
        + GAP;
    for (label, description) in rows {
        let line = format!("{INDENT}{label:<width$}{description}");
        out.push_str(line.trim_end());
        out.push('\n');
    }
}
