//! Declarations of flags, positional arguments and subcommands.
//!
//! A [`Registry`] is the parsing context: it owns every declared entity,
//! the subcommand index and the error slot. Names, descriptions and parsed
//! string values are borrowed for `'a`, never copied. Declarations hand
//! back typed handles that index into the registry and stay valid for its
//! whole life.

use std::fmt;
use std::marker::PhantomData;

use tracing::debug;

use crate::config::ParserConfig;
use crate::error::{DeclareError, ParseError};
use crate::index::SubcommandIndex;
use crate::value::{FlagValue, Value, ValueKind};

const HELP_NAME: &str = "help";
const HELP_DESCRIPTION: &str = "Print help information";

/// Where a declaration lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'s> {
    /// The top-level program.
    Global,
    /// A previously declared subcommand, by name.
    Subcommand(&'s str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Owner {
    Global,
    Subcommand(usize),
}

/// A declared flag and its current value.
#[derive(Debug, Clone)]
pub struct Flag<'a> {
    long: &'a str,
    short: Option<char>,
    value: Value<'a>,
    default: Value<'a>,
    description: &'a str,
}

impl<'a> Flag<'a> {
    fn new(long: &'a str, short: Option<char>, default: Value<'a>, description: &'a str) -> Self {
        Self {
            long,
            short,
            value: default,
            default,
            description,
        }
    }

    /// Long name without dashes; may be empty for short-only flags.
    pub fn long(&self) -> &'a str {
        self.long
    }

    /// Short name, if any.
    pub fn short(&self) -> Option<char> {
        self.short
    }

    /// Kind of value this flag holds.
    pub fn kind(&self) -> ValueKind {
        self.default.kind()
    }

    /// Current value (the default until the parser assigns one).
    pub fn value(&self) -> Value<'a> {
        self.value
    }

    /// Declared default value.
    pub fn default_value(&self) -> Value<'a> {
        self.default
    }

    /// Help description.
    pub fn description(&self) -> &'a str {
        self.description
    }

    /// Name as written on the command line, long form preferred.
    ///
    /// # Examples
    ///
    /// ```
    /// use flagscope_core::{Registry, Scope};
    ///
    /// let mut registry = Registry::new("demo", "");
    /// let jobs = registry
    ///     .declare_flag(Scope::Global, "", Some('j'), 1u8, "parallel jobs")
    ///     .unwrap();
    /// assert_eq!(registry.flag(jobs).unwrap().display_name(), "-j");
    /// ```
    pub fn display_name(&self) -> String {
        match (self.long.is_empty(), self.short) {
            (false, _) => format!("--{}", self.long),
            (true, Some(short)) => format!("-{short}"),
            (true, None) => String::from("--"),
        }
    }

    pub(crate) fn set_value(&mut self, value: Value<'a>) {
        self.value = value;
    }

    fn reset(&mut self) {
        self.value = self.default;
    }
}

/// A declared positional argument.
#[derive(Debug, Clone)]
pub struct Positional<'a> {
    name: &'a str,
    value: Option<&'a str>,
    description: &'a str,
}

impl<'a> Positional<'a> {
    /// Declared name, used only for help output.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Matched token, if one was assigned.
    pub fn value(&self) -> Option<&'a str> {
        self.value
    }

    /// Help description.
    pub fn description(&self) -> &'a str {
        self.description
    }

    pub(crate) fn assign(&mut self, token: &'a str) {
        self.value = Some(token);
    }
}

/// Flags and positionals belonging to one scope, in declaration order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Declarations<'a> {
    pub(crate) flags: Vec<Flag<'a>>,
    pub(crate) positionals: Vec<Positional<'a>>,
    help: Option<usize>,
}

impl Declarations<'_> {
    /// Any flag named `help` in this scope, implicit or declared by the
    /// host, counts.
    fn help_set(&self) -> bool {
        self.flags
            .iter()
            .any(|flag| flag.long == HELP_NAME && flag.value == Value::Bool(true))
    }

    fn reset(&mut self) {
        self.flags.iter_mut().for_each(Flag::reset);
        self.positionals.iter_mut().for_each(|p| p.value = None);
    }
}

/// A declared subcommand.
#[derive(Debug, Clone)]
pub struct Subcommand<'a> {
    name: &'a str,
    description: &'a str,
    active: bool,
    items: Declarations<'a>,
}

impl<'a> Subcommand<'a> {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Help description.
    pub fn description(&self) -> &'a str {
        self.description
    }

    /// Returns `true` once the parser has selected this subcommand.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Flags scoped to this subcommand.
    pub fn flags(&self) -> &[Flag<'a>] {
        &self.items.flags
    }

    /// Positional arguments scoped to this subcommand.
    pub fn positionals(&self) -> &[Positional<'a>] {
        &self.items.positionals
    }
}

/// Typed reference to a declared flag.
pub struct FlagHandle<T> {
    owner: Owner,
    index: usize,
    kind: PhantomData<fn() -> T>,
}

impl<T> Clone for FlagHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FlagHandle<T> {}

impl<T> fmt::Debug for FlagHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagHandle")
            .field("owner", &self.owner)
            .field("index", &self.index)
            .finish()
    }
}

/// Reference to a declared positional argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionalHandle {
    owner: Owner,
    index: usize,
}

/// Reference to a declared subcommand's activation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubcommandHandle {
    slot: usize,
}

/// The parsing context: declarations, subcommand index and error slot.
///
/// # Examples
///
/// ```
/// use flagscope_core::{EmptyArgs, Registry, Scope};
///
/// let mut registry = Registry::new("testing", "A test program");
/// let fab = registry
///     .declare_flag(Scope::Global, "fab", None, false, "fab is great")
///     .unwrap();
/// let install = registry
///     .declare_subcommand("install", "install a program")
///     .unwrap();
/// let build = registry
///     .declare_flag(Scope::Subcommand("install"), "build", None, "./build", "build dir")
///     .unwrap();
///
/// let args = ["testing", "install", "--build", "/tmp/x"];
/// registry.parse(&args, EmptyArgs::Allow).unwrap();
///
/// assert!(registry.is_active(install));
/// assert_eq!(registry.value(build), "/tmp/x");
/// assert!(!registry.value(fab));
/// assert!(registry.error().is_none());
/// ```
#[derive(Debug)]
pub struct Registry<'a> {
    name: &'a str,
    description: &'a str,
    config: ParserConfig,
    global: Declarations<'a>,
    subcommands: Vec<Subcommand<'a>>,
    index: SubcommandIndex<'a>,
    active: Option<usize>,
    error: Option<ParseError>,
}

impl<'a> Registry<'a> {
    /// Creates an empty registry with the default configuration.
    pub fn new(name: &'a str, description: &'a str) -> Self {
        Self::with_config(name, description, ParserConfig::default())
    }

    /// Creates an empty registry with an explicit configuration.
    ///
    /// When `config.implicit_help` is set, a boolean `help` flag is declared
    /// in the global scope right away. A scope whose flag limit is zero
    /// gets no implicit flag; [`ParserConfig::validate`] rejects that
    /// combination.
    pub fn with_config(name: &'a str, description: &'a str, config: ParserConfig) -> Self {
        let index = SubcommandIndex::with_capacity(config.index_capacity);
        let mut registry = Self {
            name,
            description,
            config,
            global: Declarations::default(),
            subcommands: Vec::new(),
            index,
            active: None,
            error: None,
        };
        registry.global.help = registry.declare_help(Owner::Global);
        registry
    }

    fn declare_help(&mut self, owner: Owner) -> Option<usize> {
        if !self.config.implicit_help {
            return None;
        }
        let short = self.config.help_short;
        self.push_flag(owner, Flag::new(HELP_NAME, short, Value::Bool(false), HELP_DESCRIPTION))
            .ok()
    }

    /// Declares a flag in `scope` and returns a handle to its value.
    ///
    /// `long` is the name without dashes (may be empty when `short` is
    /// set). The value starts out as `default`.
    ///
    /// Declaring a boolean `help` flag in a scope that already carries the
    /// implicit one returns a handle to the implicit flag, so the caller's
    /// handle observes `--help`. Its short name and description are kept.
    ///
    /// # Errors
    ///
    /// - [`DeclareError::UnknownScope`] if `scope` names an undeclared
    ///   subcommand. The error slot also records a
    ///   [`ParseError::Internal`].
    /// - [`DeclareError::CapacityExceeded`] if the scope already holds
    ///   `limits.max_flags` flags.
    pub fn declare_flag<T: FlagValue<'a>>(
        &mut self,
        scope: Scope<'_>,
        long: &'a str,
        short: Option<char>,
        default: T,
        description: &'a str,
    ) -> Result<FlagHandle<T>, DeclareError> {
        let owner = self.resolve_scope(scope)?;
        if long == HELP_NAME && T::KIND == ValueKind::Bool {
            if let Some(index) = self.items_mut(owner).help {
                debug!(?owner, "Reusing implicit help flag");
                return Ok(FlagHandle {
                    owner,
                    index,
                    kind: PhantomData,
                });
            }
        }
        let index = self.push_flag(owner, Flag::new(long, short, default.into_value(), description))?;
        Ok(FlagHandle {
            owner,
            index,
            kind: PhantomData,
        })
    }

    fn push_flag(&mut self, owner: Owner, flag: Flag<'a>) -> Result<usize, DeclareError> {
        let limit = self.config.limits.max_flags;
        let items = self.items_mut(owner);
        if items.flags.len() >= limit {
            return Err(DeclareError::CapacityExceeded {
                what: "flags",
                limit,
            });
        }
        items.flags.push(flag);
        Ok(items.flags.len() - 1)
    }

    /// Declares a positional argument in `scope`.
    ///
    /// Positionals are filled in declaration order.
    ///
    /// # Errors
    ///
    /// Same as [`declare_flag`](Self::declare_flag), with
    /// `limits.max_positionals` as the capacity.
    pub fn declare_positional(
        &mut self,
        scope: Scope<'_>,
        name: &'a str,
        description: &'a str,
    ) -> Result<PositionalHandle, DeclareError> {
        let owner = self.resolve_scope(scope)?;
        let limit = self.config.limits.max_positionals;
        let items = self.items_mut(owner);
        if items.positionals.len() >= limit {
            return Err(DeclareError::CapacityExceeded {
                what: "positional arguments",
                limit,
            });
        }
        items.positionals.push(Positional {
            name,
            value: None,
            description,
        });
        Ok(PositionalHandle {
            owner,
            index: items.positionals.len() - 1,
        })
    }

    /// Declares a subcommand and returns a handle to its activation state.
    ///
    /// The subcommand gets its own implicit `help` flag when
    /// `implicit_help` is configured.
    ///
    /// # Errors
    ///
    /// - [`DeclareError::CapacityExceeded`] past `limits.max_subcommands`.
    /// - [`DeclareError::DuplicateSubcommand`] if `name` is taken.
    pub fn declare_subcommand(
        &mut self,
        name: &'a str,
        description: &'a str,
    ) -> Result<SubcommandHandle, DeclareError> {
        let limit = self.config.limits.max_subcommands;
        if self.subcommands.len() >= limit {
            return Err(DeclareError::CapacityExceeded {
                what: "subcommands",
                limit,
            });
        }
        let slot = self.subcommands.len();
        if !self.index.insert(name, slot) {
            return Err(DeclareError::DuplicateSubcommand(name.to_string()));
        }
        self.subcommands.push(Subcommand {
            name,
            description,
            active: false,
            items: Declarations::default(),
        });
        let help = self.declare_help(Owner::Subcommand(slot));
        self.subcommands[slot].items.help = help;
        Ok(SubcommandHandle { slot })
    }

    fn resolve_scope(&mut self, scope: Scope<'_>) -> Result<Owner, DeclareError> {
        let name = match scope {
            Scope::Global => return Ok(Owner::Global),
            Scope::Subcommand(name) => name,
        };
        match self.index.get(name) {
            Some(slot) => Ok(Owner::Subcommand(slot)),
            None => {
                debug!(scope = name, "Declaration references an undeclared subcommand");
                self.record(ParseError::Internal(format!(
                    "no subcommand named '{name}' has been declared"
                )));
                Err(DeclareError::UnknownScope(name.to_string()))
            }
        }
    }

    /// Current value of a flag, or `None` if the handle belongs elsewhere.
    pub fn try_value<T: FlagValue<'a>>(&self, handle: FlagHandle<T>) -> Option<T> {
        self.flag(handle).and_then(|flag| T::from_value(flag.value))
    }

    /// Current value of a flag.
    ///
    /// # Panics
    ///
    /// Panics if `handle` was issued by a different registry.
    pub fn value<T: FlagValue<'a>>(&self, handle: FlagHandle<T>) -> T {
        match self.try_value(handle) {
            Some(value) => value,
            None => panic!("flag handle {handle:?} does not belong to this registry"),
        }
    }

    /// Flag metadata for a handle.
    pub fn flag<T>(&self, handle: FlagHandle<T>) -> Option<&Flag<'a>> {
        self.items(handle.owner)?.flags.get(handle.index)
    }

    /// Token assigned to a positional argument, if any.
    pub fn positional(&self, handle: PositionalHandle) -> Option<&'a str> {
        self.items(handle.owner)?
            .positionals
            .get(handle.index)
            .and_then(Positional::value)
    }

    /// Returns `true` if the subcommand was selected by the parse.
    pub fn is_active(&self, handle: SubcommandHandle) -> bool {
        self.subcommands
            .get(handle.slot)
            .is_some_and(Subcommand::is_active)
    }

    /// The subcommand selected by the parse, if any.
    pub fn active_subcommand(&self) -> Option<&Subcommand<'a>> {
        self.active.and_then(|slot| self.subcommands.get(slot))
    }

    /// Finds a subcommand by name through the index.
    pub fn find_subcommand(&self, name: &str) -> Option<&Subcommand<'a>> {
        self.index.get(name).and_then(|slot| self.subcommands.get(slot))
    }

    /// Returns `true` if the global `help` flag or the active subcommand's
    /// `help` flag was given.
    pub fn help_requested(&self) -> bool {
        self.global.help_set()
            || self
                .active_subcommand()
                .is_some_and(|sub| sub.items.help_set())
    }

    /// The first error recorded since construction or the last reset.
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Static message for the recorded error, if any.
    pub fn error_message(&self) -> Option<&'static str> {
        self.error.as_ref().map(|err| err.kind().message())
    }

    /// Program name given at construction.
    pub fn program_name(&self) -> &'a str {
        self.name
    }

    /// Program description given at construction.
    pub fn description(&self) -> &'a str {
        self.description
    }

    /// Active configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Global flags in declaration order.
    pub fn global_flags(&self) -> &[Flag<'a>] {
        &self.global.flags
    }

    /// Global positional arguments in declaration order.
    pub fn global_positionals(&self) -> &[Positional<'a>] {
        &self.global.positionals
    }

    /// All subcommands in declaration order.
    pub fn subcommands(&self) -> &[Subcommand<'a>] {
        &self.subcommands
    }

    /// Restores every value to its default and clears activation and the
    /// error slot. Declarations are kept.
    pub fn reset(&mut self) {
        self.global.reset();
        for sub in &mut self.subcommands {
            sub.active = false;
            sub.items.reset();
        }
        self.active = None;
        self.error = None;
    }

    /// Consumes the registry, releasing every subcommand index chain node.
    ///
    /// Returns the number of chain nodes released.
    pub fn teardown(mut self) -> usize {
        let released = self.index.clear();
        debug!(released, program = self.name, "Registry torn down");
        released
    }

    pub(crate) fn has_subcommands(&self) -> bool {
        !self.subcommands.is_empty()
    }

    pub(crate) fn lookup_subcommand(&self, name: &str) -> Option<usize> {
        self.index.get(name)
    }

    /// Clears the activation left by an earlier parse.
    pub(crate) fn deactivate(&mut self) {
        if let Some(sub) = self.active.take().and_then(|slot| self.subcommands.get_mut(slot)) {
            sub.active = false;
        }
    }

    pub(crate) fn activate(&mut self, slot: usize) {
        if let Some(sub) = self.subcommands.get_mut(slot) {
            sub.active = true;
            self.active = Some(slot);
        }
    }

    pub(crate) fn record(&mut self, err: ParseError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    pub(crate) fn items(&self, owner: Owner) -> Option<&Declarations<'a>> {
        match owner {
            Owner::Global => Some(&self.global),
            Owner::Subcommand(slot) => self.subcommands.get(slot).map(|sub| &sub.items),
        }
    }

    pub(crate) fn items_mut(&mut self, owner: Owner) -> &mut Declarations<'a> {
        match owner {
            Owner::Global => &mut self.global,
            Owner::Subcommand(slot) => &mut self.subcommands[slot].items,
        }
    }
}
