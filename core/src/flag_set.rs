//! Named flag registry and command-line parser.
//!
//! A [`FlagSet`] stores one [`Value`] per flag name and, when given the
//! command-line tokens, routes each flag's text to its value. It knows nothing
//! about defaults, environment variables or value types; flags take care of
//! that before registering.
//!
//! Parsing follows the conventional rules:
//!
//! - a flag may be written with one or two dashes: `-name` or `--name`;
//! - a value is given inline (`--name=value`) or as the next token
//!   (`--name value`), except for bool flags, which only take inline values;
//! - parsing stops at the first token that is not a flag, or after `--`;
//!   everything left over is available from [`FlagSet::args`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::debug;

use crate::error::{FlagError, Origin, Result};
use crate::value::Value;

struct Registration {
    value: Box<dyn Value>,
    usage: String,
    default_text: String,
}

/// A set of registered flags and the result of parsing arguments against it.
///
/// # Examples
///
/// ```
/// use envflag_core::{FlagSet, GenericValue, destination};
///
/// let port = destination(8080i32);
/// let mut set = FlagSet::new("serve");
/// set.register("port", Box::new(GenericValue::new(port.clone())), "Listen port", "8080")
///     .unwrap();
///
/// set.parse(["--port", "9000", "public/"]).unwrap();
/// assert_eq!(*port.borrow(), 9000);
/// assert!(set.was_supplied("port"));
/// assert_eq!(set.args(), ["public/"]);
/// ```
pub struct FlagSet {
    name: String,
    formal: BTreeMap<String, Registration>,
    actual: BTreeSet<String>,
    args: Vec<String>,
    parsed: bool,
}

impl FlagSet {
    /// Creates an empty flag set. `name` identifies the set in logs.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            formal: BTreeMap::new(),
            actual: BTreeSet::new(),
            args: Vec::new(),
            parsed: false,
        }
    }

    /// The name given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers `value` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`FlagError::InvalidName`] if `name` is empty, starts with a
    /// dash, or contains `=`, and [`FlagError::Redefined`] if `name` is
    /// already registered.
    pub fn register(
        &mut self,
        name: &str,
        value: Box<dyn Value>,
        usage: &str,
        default_text: &str,
    ) -> Result<()> {
        if name.is_empty() || name.starts_with('-') || name.contains('=') {
            return Err(FlagError::InvalidName(name.to_string()));
        }
        if self.formal.contains_key(name) {
            return Err(FlagError::Redefined(name.to_string()));
        }

        self.formal.insert(
            name.to_string(),
            Registration {
                value,
                usage: usage.to_string(),
                default_text: default_text.to_string(),
            },
        );
        Ok(())
    }

    /// Parses command-line tokens, excluding the program name.
    ///
    /// Stops at the first error; values set before the failing token keep
    /// their new content.
    ///
    /// # Errors
    ///
    /// - [`FlagError::InvalidValue`] when a value rejects its text, including
    ///   a flag given more than once.
    /// - [`FlagError::NotDefined`] for an unregistered flag name.
    /// - [`FlagError::HelpRequested`] for `-h`/`-help` when not registered.
    /// - [`FlagError::MissingArgument`] when a value-taking flag ends the
    ///   token list.
    /// - [`FlagError::BadSyntax`] for tokens like `---x` or `-=x`.
    pub fn parse<I, S>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.parsed = true;
        let mut tokens = args.into_iter().map(|arg| arg.as_ref().to_string());

        while let Some(token) = tokens.next() {
            if token.len() < 2 || !token.starts_with('-') {
                self.args.push(token);
                break;
            }

            let mut body = &token[1..];
            if let Some(rest) = body.strip_prefix('-') {
                if rest.is_empty() {
                    break;
                }
                body = rest;
            }

            if body.starts_with('-') || body.starts_with('=') {
                return Err(FlagError::BadSyntax(token.clone()));
            }

            let (name, inline) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (body, None),
            };
            self.parse_one(name, inline, &mut tokens)?;
        }

        self.args.extend(tokens);

        debug!(
            flag_set = %self.name,
            supplied = ?self.actual,
            positionals = self.args.len(),
            "Parsed arguments"
        );
        Ok(())
    }

    fn parse_one(
        &mut self,
        name: &str,
        inline: Option<&str>,
        tokens: &mut impl Iterator<Item = String>,
    ) -> Result<()> {
        let Some(registration) = self.formal.get_mut(name) else {
            if matches!(name, "h" | "help") {
                return Err(FlagError::HelpRequested);
            }
            return Err(FlagError::NotDefined(name.to_string()));
        };

        let raw = match inline {
            Some(value) => value.to_string(),
            None if registration.value.is_bool_flag() => "true".to_string(),
            None => tokens
                .next()
                .ok_or_else(|| FlagError::MissingArgument(name.to_string()))?,
        };

        registration
            .value
            .set(&raw)
            .map_err(|reason| FlagError::InvalidValue {
                origin: Origin::Flag(name.to_string()),
                value: raw.clone(),
                reason,
            })?;

        self.actual.insert(name.to_string());
        Ok(())
    }

    /// Whether [`parse`](Self::parse) has been called.
    pub fn parsed(&self) -> bool {
        self.parsed
    }

    /// Positional arguments left over after parsing.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the value registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<&dyn Value> {
        self.formal.get(name).map(|r| r.value.as_ref())
    }

    /// Returns the usage text registered under `name`.
    pub fn usage(&self, name: &str) -> Option<&str> {
        self.formal.get(name).map(|r| r.usage.as_str())
    }

    /// Returns the default text registered under `name`.
    pub fn default_text(&self, name: &str) -> Option<&str> {
        self.formal.get(name).map(|r| r.default_text.as_str())
    }

    /// Whether `name` was given explicitly on the command line.
    pub fn was_supplied(&self, name: &str) -> bool {
        self.actual.contains(name)
    }

    /// All registered names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.formal.keys().map(String::as_str)
    }
}

impl fmt::Debug for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagSet")
            .field("name", &self.name)
            .field("flags", &self.formal.keys().collect::<Vec<_>>())
            .field("supplied", &self.actual)
            .field("args", &self.args)
            .field("parsed", &self.parsed)
            .finish()
    }
}
