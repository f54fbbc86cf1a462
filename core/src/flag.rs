//! Flags: identity, environment fallback, and introspection.
//!
//! [`GenericFlag<T>`] is the one flag implementation for every
//! [`GenericType`]; [`BoolFlag`] is the switch kind that takes no argument.
//! Both resolve their value with the same precedence:
//!
//! 1. an explicit command-line argument,
//! 2. the first listed environment variable that is defined,
//! 3. whatever the destination held before the flag was applied.
//!
//! Code that renders help or assembles commands works through the
//! object-safe [`Flag`] trait and never needs the concrete value type.

use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::convert::GenericType;
use crate::error::Result;
use crate::flag_set::FlagSet;
use crate::value::{
    BoolValue, Destination, FlagValue, GenericValue, ValueSource, destination,
};

/// Looks up an environment variable by name.
///
/// Stored on each flag so that tests can substitute a private mapping for the
/// process environment.
pub type LookupEnvFn = Rc<dyn Fn(&str) -> Option<String>>;

/// The process environment as a [`LookupEnvFn`].
///
/// Variables whose content is not valid Unicode are treated as undefined.
pub fn default_lookup_env() -> LookupEnvFn {
    Rc::new(|key: &str| std::env::var_os(key).and_then(|value| value.into_string().ok()))
}

/// A command-line flag, seen without its value type.
pub trait Flag: fmt::Debug {
    /// Primary name, used without dashes.
    fn name(&self) -> &str;

    /// Additional names registered for the same value.
    fn aliases(&self) -> &[String];

    /// Environment variables consulted, in order, when no argument is given.
    fn env_vars(&self) -> &[String];

    /// One-line description for help output.
    fn usage(&self) -> &str;

    /// Registers the flag on `set` and applies any environment override.
    ///
    /// Must be called once per parse cycle, before [`FlagSet::parse`].
    ///
    /// # Errors
    ///
    /// Propagates registration errors from the flag set and returns
    /// [`FlagError::InvalidValue`](crate::FlagError::InvalidValue) naming the
    /// variable when an environment value does not parse.
    fn apply(&mut self, set: &mut FlagSet) -> Result<()>;

    /// The current value rendered as text.
    fn value_text(&self) -> String;

    /// Whether an argument or environment variable supplied the value.
    fn is_set(&self) -> bool;

    /// The value rendered as text before any argument or environment
    /// variable was applied.
    fn initial_text(&self) -> String;

    /// Whether the flag is a switch.
    fn is_bool_flag(&self) -> bool;

    /// Whether the flag consumes an argument token.
    fn takes_value(&self) -> bool;

    /// Where the current value came from, or `None` for the default.
    fn value_source(&self) -> Option<ValueSource>;

    /// Primary name followed by aliases.
    fn names(&self) -> Vec<&str> {
        std::iter::once(self.name())
            .chain(self.aliases().iter().map(String::as_str))
            .collect()
    }
}

/// Registers `tracker` under every name and resolves the environment.
fn register_and_resolve(
    set: &mut FlagSet,
    tracker: &FlagValue,
    name: &str,
    aliases: &[String],
    usage: &str,
    env_vars: &[String],
    lookup_env: &LookupEnvFn,
) -> Result<()> {
    let default_text = tracker.initial_text();
    for flag_name in std::iter::once(name).chain(aliases.iter().map(String::as_str)) {
        set.register(flag_name, Box::new(tracker.clone()), usage, &default_text)?;
    }
    debug!(flag = %name, aliases = ?aliases, default = %default_text, "Applied flag");

    let found = env_vars
        .iter()
        .find_map(|var| lookup_env(var.as_str()).map(|raw| (var, raw)));
    if let Some((var, raw)) = found {
        tracker.set_from_env(var, &raw)?;
        debug!(flag = %name, env_var = %var, "Resolved flag from environment");
    }

    Ok(())
}

/// A flag holding any [`GenericType`].
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
///
/// use envflag_core::{Flag, FlagSet, GenericFlag};
///
/// let env = HashMap::from([("APP_PORT".to_string(), "9000".to_string())]);
/// let mut port = GenericFlag::<i32>::new("port")
///     .with_env_var("APP_PORT")
///     .with_default(8080)
///     .with_lookup_env(move |key| env.get(key).cloned());
///
/// let mut set = FlagSet::new("serve");
/// port.apply(&mut set).unwrap();
/// set.parse(Vec::<String>::new()).unwrap();
///
/// assert_eq!(port.value(), 9000);
/// assert!(port.is_set());
/// assert_eq!(port.initial_text(), "8080");
/// assert!(port.takes_value());
/// assert!(!port.is_bool_flag());
/// ```
pub struct GenericFlag<T: GenericType> {
    /// Primary name, unique within a flag set.
    pub name: String,
    /// Additional names for the same flag.
    pub aliases: Vec<String>,
    /// One-line description for help output.
    pub usage: String,
    /// Environment variables consulted in order.
    pub env_vars: Vec<String>,
    /// Storage for the default and, after parsing, the resolved value.
    /// Allocated with `T::default()` on apply when absent.
    pub destination: Option<Destination<T>>,
    /// Environment lookup, the process environment unless replaced.
    pub lookup_env: LookupEnvFn,
    value: Option<FlagValue>,
}

impl<T: GenericType> GenericFlag<T> {
    /// Creates a flag with no environment variables and no destination.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            usage: String::new(),
            env_vars: Vec::new(),
            destination: None,
            lookup_env: default_lookup_env(),
            value: None,
        }
    }

    /// Adds an alternative name.
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Sets the usage text.
    pub fn with_usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    /// Appends an environment variable to consult.
    pub fn with_env_var(mut self, var: &str) -> Self {
        self.env_vars.push(var.to_string());
        self
    }

    /// Uses `dest` as storage, so the caller can read the resolved value
    /// directly.
    pub fn with_destination(mut self, dest: Destination<T>) -> Self {
        self.destination = Some(dest);
        self
    }

    /// Allocates a destination holding `value` as the default.
    pub fn with_default(self, value: T) -> Self {
        self.with_destination(destination(value))
    }

    /// Replaces the environment lookup.
    pub fn with_lookup_env(mut self, lookup: impl Fn(&str) -> Option<String> + 'static) -> Self {
        self.lookup_env = Rc::new(lookup);
        self
    }

    /// The current typed value, or `T::default()` before a destination exists.
    pub fn value(&self) -> T {
        self.destination
            .as_ref()
            .map(|dest| dest.borrow().clone())
            .unwrap_or_default()
    }

    /// The tracked value registered on the flag set, once applied.
    pub fn flag_value(&self) -> Option<&FlagValue> {
        self.value.as_ref()
    }
}

impl<T: GenericType> Flag for GenericFlag<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> &[String] {
        &self.aliases
    }

    fn env_vars(&self) -> &[String] {
        &self.env_vars
    }

    fn usage(&self) -> &str {
        &self.usage
    }

    fn apply(&mut self, set: &mut FlagSet) -> Result<()> {
        let dest = self
            .destination
            .get_or_insert_with(|| destination(T::default()))
            .clone();
        let tracker = FlagValue::new(GenericValue::new(dest));
        self.value = Some(tracker.clone());

        register_and_resolve(
            set,
            &tracker,
            &self.name,
            &self.aliases,
            &self.usage,
            &self.env_vars,
            &self.lookup_env,
        )
    }

    fn value_text(&self) -> String {
        self.value().format_value()
    }

    fn is_set(&self) -> bool {
        self.value.as_ref().is_some_and(FlagValue::is_set)
    }

    fn initial_text(&self) -> String {
        match &self.value {
            Some(tracker) => tracker.initial_text(),
            None => self.value_text(),
        }
    }

    fn is_bool_flag(&self) -> bool {
        false
    }

    fn takes_value(&self) -> bool {
        true
    }

    fn value_source(&self) -> Option<ValueSource> {
        self.value.as_ref().and_then(FlagValue::source)
    }
}

impl<T: GenericType> fmt::Debug for GenericFlag<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericFlag")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("env_vars", &self.env_vars)
            .field("destination", &self.destination)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

/// An on/off switch.
///
/// Given as `--name` it becomes `true`; an inline value (`--name=false`) or
/// an environment variable may set either state.
///
/// # Examples
///
/// ```
/// use envflag_core::{BoolFlag, Flag, FlagSet};
///
/// let mut verbose = BoolFlag::new("verbose")
///     .with_alias("v")
///     .with_lookup_env(|_| None);
/// let mut set = FlagSet::new("tool");
/// verbose.apply(&mut set).unwrap();
/// set.parse(["-v", "input"]).unwrap();
///
/// assert!(verbose.value());
/// assert!(!verbose.takes_value());
/// assert_eq!(set.args(), ["input"]);
/// ```
pub struct BoolFlag {
    pub name: String,
    pub aliases: Vec<String>,
    pub usage: String,
    pub env_vars: Vec<String>,
    pub destination: Option<Destination<bool>>,
    pub lookup_env: LookupEnvFn,
    value: Option<FlagValue>,
}

impl BoolFlag {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            usage: String::new(),
            env_vars: Vec::new(),
            destination: None,
            lookup_env: default_lookup_env(),
            value: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn with_usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    pub fn with_env_var(mut self, var: &str) -> Self {
        self.env_vars.push(var.to_string());
        self
    }

    pub fn with_destination(mut self, dest: Destination<bool>) -> Self {
        self.destination = Some(dest);
        self
    }

    pub fn with_default(self, value: bool) -> Self {
        self.with_destination(destination(value))
    }

    pub fn with_lookup_env(mut self, lookup: impl Fn(&str) -> Option<String> + 'static) -> Self {
        self.lookup_env = Rc::new(lookup);
        self
    }

    pub fn value(&self) -> bool {
        self.destination
            .as_ref()
            .is_some_and(|dest| *dest.borrow())
    }
}

impl Flag for BoolFlag {
    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> &[String] {
        &self.aliases
    }

    fn env_vars(&self) -> &[String] {
        &self.env_vars
    }

    fn usage(&self) -> &str {
        &self.usage
    }

    fn apply(&mut self, set: &mut FlagSet) -> Result<()> {
        let dest = self
            .destination
            .get_or_insert_with(|| destination(false))
            .clone();
        let tracker = FlagValue::new(BoolValue::new(dest));
        self.value = Some(tracker.clone());

        register_and_resolve(
            set,
            &tracker,
            &self.name,
            &self.aliases,
            &self.usage,
            &self.env_vars,
            &self.lookup_env,
        )
    }

    fn value_text(&self) -> String {
        self.value().to_string()
    }

    fn is_set(&self) -> bool {
        self.value.as_ref().is_some_and(FlagValue::is_set)
    }

    fn initial_text(&self) -> String {
        match &self.value {
            Some(tracker) => tracker.initial_text(),
            None => self.value_text(),
        }
    }

    fn is_bool_flag(&self) -> bool {
        true
    }

    fn takes_value(&self) -> bool {
        false
    }

    fn value_source(&self) -> Option<ValueSource> {
        self.value.as_ref().and_then(FlagValue::source)
    }
}

impl fmt::Debug for BoolFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoolFlag")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("env_vars", &self.env_vars)
            .field("destination", &self.destination)
            .finish_non_exhaustive()
    }
}

/// Applies every flag to `set`, then parses `args`.
///
/// Stops at the first error.
///
/// # Errors
///
/// Any error from [`Flag::apply`] or [`FlagSet::parse`].
pub fn apply_and_parse<I, S>(set: &mut FlagSet, flags: &mut [Box<dyn Flag>], args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for flag in flags.iter_mut() {
        flag.apply(set)?;
    }
    set.parse(args)
}
