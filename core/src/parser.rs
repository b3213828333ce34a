//! Token scanning.
//!
//! The parser walks the argument vector once, left to right:
//!
//! 1. `Init`: no user tokens succeeds (or fails, per [`EmptyArgs`]) at once.
//! 2. `ScopeResolved`: a first token without a leading dash selects a
//!    subcommand through the index when any are declared.
//! 3. `Scanning`: each token is a bare `--`, a long flag, a short flag or a
//!    positional. Value-taking flags consume the next token.
//! 4. `Done` or `Failed`: the first error stops the scan. Values assigned
//!    before it are kept.

use tracing::{debug, trace};

use crate::config::DoubleDash;
use crate::error::ParseError;
use crate::registry::{Flag, Owner, Registry};
use crate::value::{Value, decode};

/// What to do when no user tokens follow the program name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyArgs {
    /// Succeed without touching any value.
    #[default]
    Allow,
    /// Fail with [`ParseError::EmptyArguments`] so the host can show help.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Init,
    ScopeResolved,
    Scanning,
    Done,
    Failed,
}

impl<'a> Registry<'a> {
    /// Parses `args` against the declarations.
    ///
    /// `args[0]` is the program name and is skipped. On failure the error
    /// is returned and, if the error slot is still empty, recorded there.
    ///
    /// A subcommand activated by an earlier parse is deactivated first, so
    /// at most one is ever active. Values and the error slot are kept; call
    /// [`reset`](Registry::reset) to restore defaults between parses.
    ///
    /// # Examples
    ///
    /// ```
    /// use flagscope_core::{EmptyArgs, ErrorKind, Registry, Scope};
    ///
    /// let mut registry = Registry::new("prog", "");
    /// let level = registry
    ///     .declare_flag(Scope::Global, "level", Some('l'), 0i32, "")
    ///     .unwrap();
    ///
    /// registry.parse(&["prog", "-l", "0x10"], EmptyArgs::Allow).unwrap();
    /// assert_eq!(registry.value(level), 16);
    ///
    /// registry.reset();
    /// let err = registry
    ///     .parse(&["prog", "--level", "ten"], EmptyArgs::Allow)
    ///     .unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::InvalidNumber);
    /// assert_eq!(registry.error_message(), Some(ErrorKind::InvalidNumber.message()));
    /// ```
    pub fn parse<S: AsRef<str>>(
        &mut self,
        args: &'a [S],
        empty: EmptyArgs,
    ) -> Result<(), ParseError> {
        let tokens = args.iter().skip(1).map(|arg| arg.as_ref()).collect();
        self.deactivate();
        Scanner::new(self, tokens).run(empty)
    }
}

struct Scanner<'r, 'a> {
    registry: &'r mut Registry<'a>,
    tokens: Vec<&'a str>,
    cursor: usize,
    owner: Owner,
    next_positional: usize,
    flags_ended: bool,
    state: State,
}

impl<'r, 'a> Scanner<'r, 'a> {
    fn new(registry: &'r mut Registry<'a>, tokens: Vec<&'a str>) -> Self {
        Self {
            registry,
            tokens,
            cursor: 0,
            owner: Owner::Global,
            next_positional: 0,
            flags_ended: false,
            state: State::Init,
        }
    }

    fn run(mut self, empty: EmptyArgs) -> Result<(), ParseError> {
        match self.drive(empty) {
            Ok(()) => {
                self.transition(State::Done);
                Ok(())
            }
            Err(err) => {
                self.transition(State::Failed);
                debug!(error = %err, token_index = self.cursor, "Parse failed");
                self.registry.record(err.clone());
                Err(err)
            }
        }
    }

    fn transition(&mut self, next: State) {
        trace!(from = ?self.state, to = ?next, "Parser state");
        self.state = next;
    }

    fn drive(&mut self, empty: EmptyArgs) -> Result<(), ParseError> {
        if self.tokens.is_empty() {
            return match empty {
                EmptyArgs::Allow => Ok(()),
                EmptyArgs::Reject => Err(ParseError::EmptyArguments),
            };
        }

        self.resolve_scope()?;
        self.transition(State::Scanning);
        while let Some(token) = self.next_token() {
            self.scan(token)?;
        }
        Ok(())
    }

    fn next_token(&mut self) -> Option<&'a str> {
        let token = self.tokens.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(token)
    }

    fn resolve_scope(&mut self) -> Result<(), ParseError> {
        let first = self.tokens[0];
        if self.registry.has_subcommands() && !first.starts_with('-') {
            let slot = self
                .registry
                .lookup_subcommand(first)
                .ok_or_else(|| ParseError::SubcommandNotFound(first.to_string()))?;
            self.registry.activate(slot);
            self.owner = Owner::Subcommand(slot);
            self.cursor = 1;
            debug!(subcommand = first, "Activated subcommand");
        }
        self.transition(State::ScopeResolved);
        Ok(())
    }

    fn scan(&mut self, token: &'a str) -> Result<(), ParseError> {
        if self.flags_ended {
            return self.assign_positional(token);
        }
        if token == "--" {
            if self.registry.config().double_dash == DoubleDash::EndOfFlags {
                self.flags_ended = true;
            }
            trace!("Bare -- consumed");
            return Ok(());
        }
        if let Some(body) = token.strip_prefix("--") {
            return self.match_long(token, body);
        }
        if let Some(body) = token.strip_prefix('-') {
            let mut chars = body.chars();
            return match (chars.next(), chars.next()) {
                // A lone dash conventionally names stdin.
                (None, _) => self.assign_positional(token),
                (Some(short), None) => self.match_short(token, short),
                (Some(_), Some(_)) => Err(ParseError::LongFlagGivenAsShort(token.to_string())),
            };
        }
        self.assign_positional(token)
    }

    fn match_long(&mut self, token: &'a str, body: &'a str) -> Result<(), ParseError> {
        if let Some(index) = self.find_flag(|flag| flag.long() == body) {
            return self.apply(index, None);
        }
        if let Some((name, inline)) = body.split_once('=').filter(|(name, _)| !name.is_empty()) {
            if let Some(index) = self.find_flag(|flag| flag.long() == name) {
                return self.apply(index, Some(inline));
            }
        }
        Err(ParseError::FlagNotFound(token.to_string()))
    }

    fn match_short(&mut self, token: &'a str, short: char) -> Result<(), ParseError> {
        let index = self
            .find_flag(|flag| flag.short() == Some(short))
            .ok_or_else(|| ParseError::FlagNotFound(token.to_string()))?;
        self.apply(index, None)
    }

    /// Position of the first flag in the active scope accepted by `matches`.
    fn find_flag(&self, matches: impl Fn(&Flag<'a>) -> bool) -> Option<usize> {
        self.registry
            .items(self.owner)?
            .flags
            .iter()
            .position(matches)
    }

    fn apply(&mut self, index: usize, inline: Option<&'a str>) -> Result<(), ParseError> {
        let (kind, name) = {
            let flag = &self.registry.items_mut(self.owner).flags[index];
            (flag.kind(), flag.display_name())
        };

        let value = if kind.takes_value() {
            let raw = match inline {
                Some(raw) => raw,
                None => self
                    .next_token()
                    .ok_or_else(|| ParseError::MissingValue(name.clone()))?,
            };
            decode(kind, raw).map_err(|_| ParseError::InvalidNumber {
                flag: name.clone(),
                value: raw.to_string(),
                kind,
            })?
        } else if inline.is_some() {
            return Err(ParseError::UnexpectedValue(name));
        } else {
            Value::Bool(true)
        };

        trace!(flag = %name, value = %value, "Flag matched");
        self.registry.items_mut(self.owner).flags[index].set_value(value);
        Ok(())
    }

    fn assign_positional(&mut self, token: &'a str) -> Result<(), ParseError> {
        let slot = self.next_positional;
        let positional = self
            .registry
            .items_mut(self.owner)
            .positionals
            .get_mut(slot)
            .ok_or_else(|| ParseError::PositionalArgOverflow(token.to_string()))?;
        positional.assign(token);
        self.next_positional += 1;
        trace!(slot, token, "Positional assigned");
        Ok(())
    }
}
