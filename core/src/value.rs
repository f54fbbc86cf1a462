//! Settable values that back registered flags.
//!
//! A [`Value`] is what a [`FlagSet`](crate::FlagSet) stores for each flag
//! name: something that can be set from a string and read back as text.
//! [`GenericValue`] adapts a [`Destination`] cell of any [`GenericType`] to
//! that interface, [`BoolValue`] does the same for booleans, and [`FlagValue`]
//! wraps either one to remember where its content came from.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::convert::{GenericType, parse_bool};
use crate::error::{FlagError, Origin, ValueError};

/// Shared storage cell for a flag's default-then-resolved value.
///
/// The flag and the value registered on the flag set hold clones of the same
/// `Rc`, so a write through one is visible through the other.
pub type Destination<T> = Rc<RefCell<T>>;

/// Creates a [`Destination`] holding `value`.
///
/// # Examples
///
/// ```
/// use envflag_core::destination;
///
/// let dest = destination(55i32);
/// assert_eq!(*dest.borrow(), 55);
/// ```
pub fn destination<T>(value: T) -> Destination<T> {
    Rc::new(RefCell::new(value))
}

/// A value that a flag set can assign from command-line text.
pub trait Value {
    /// Parses `raw` and stores the result.
    fn set(&mut self, raw: &str) -> Result<(), ValueError>;

    /// Returns a copy of the current content for callers that know its type.
    fn get(&self) -> Box<dyn Any>;

    /// Renders the current content as text.
    fn text(&self) -> String;

    /// Whether the flag is a switch that does not consume an argument token.
    fn is_bool_flag(&self) -> bool {
        false
    }
}

/// Adapts a [`Destination<T>`] to the [`Value`] interface.
///
/// # Examples
///
/// ```
/// use envflag_core::{GenericValue, Value, destination};
///
/// let dest = destination(0i64);
/// let mut value = GenericValue::new(dest.clone());
/// value.set("20").unwrap();
///
/// assert_eq!(*dest.borrow(), 20);
/// assert_eq!(value.text(), "20");
/// assert_eq!(*value.get().downcast::<i64>().unwrap(), 20);
/// assert!(!value.is_bool_flag());
/// ```
pub struct GenericValue<T> {
    typed_value: Destination<T>,
}

impl<T: GenericType> GenericValue<T> {
    pub fn new(typed_value: Destination<T>) -> Self {
        Self { typed_value }
    }
}

impl<T: GenericType> Value for GenericValue<T> {
    fn set(&mut self, raw: &str) -> Result<(), ValueError> {
        let parsed = T::parse_value(raw)?;
        *self.typed_value.borrow_mut() = parsed;
        Ok(())
    }

    fn get(&self) -> Box<dyn Any> {
        Box::new(self.typed_value.borrow().clone())
    }

    fn text(&self) -> String {
        self.typed_value.borrow().format_value()
    }
}

/// [`Value`] for on/off switches. Unlike [`GenericValue`] it reports itself as
/// a bool flag, so the flag set does not hand it the next argument.
pub struct BoolValue {
    dest: Destination<bool>,
}

impl BoolValue {
    pub fn new(dest: Destination<bool>) -> Self {
        Self { dest }
    }
}

impl Value for BoolValue {
    fn set(&mut self, raw: &str) -> Result<(), ValueError> {
        *self.dest.borrow_mut() = parse_bool(raw)?;
        Ok(())
    }

    fn get(&self) -> Box<dyn Any> {
        Box::new(*self.dest.borrow())
    }

    fn text(&self) -> String {
        self.dest.borrow().to_string()
    }

    fn is_bool_flag(&self) -> bool {
        true
    }
}

/// Where a flag's current value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// Read from an environment variable while the flag was applied.
    EnvVar,
    /// Given explicitly on the command line.
    Argument,
}

struct TrackedValue {
    value: Box<dyn Value>,
    initial_text: String,
    source: Option<ValueSource>,
}

/// A [`Value`] that remembers its initial text and the source of its content.
///
/// Clones share state. One clone is registered on the flag set under every
/// name of the flag, and the flag keeps another to answer introspection
/// queries after parsing. Because all names share the tracker, giving the
/// flag twice under different aliases is still a duplicate.
///
/// An environment value may be overridden by one explicit argument; a second
/// explicit argument fails with [`ValueError::MultipleTimes`].
#[derive(Clone)]
pub struct FlagValue {
    inner: Rc<RefCell<TrackedValue>>,
}

impl FlagValue {
    /// Wraps `value`, capturing its current text as the initial text.
    pub fn new(value: impl Value + 'static) -> Self {
        let initial_text = value.text();
        Self {
            inner: Rc::new(RefCell::new(TrackedValue {
                value: Box::new(value),
                initial_text,
                source: None,
            })),
        }
    }

    /// The text of the value before anything was applied to it.
    pub fn initial_text(&self) -> String {
        self.inner.borrow().initial_text.clone()
    }

    /// Where the current content came from, if anywhere but the default.
    pub fn source(&self) -> Option<ValueSource> {
        self.inner.borrow().source
    }

    /// Whether an argument or an environment variable supplied the value.
    pub fn is_set(&self) -> bool {
        self.source().is_some()
    }

    /// Applies the content of environment variable `var`.
    ///
    /// # Errors
    ///
    /// Returns [`FlagError::InvalidValue`] naming the variable when `raw`
    /// does not parse.
    pub fn set_from_env(&self, var: &str, raw: &str) -> Result<(), FlagError> {
        let mut tracked = self.inner.borrow_mut();
        tracked
            .value
            .set(raw)
            .map_err(|reason| FlagError::InvalidValue {
                origin: Origin::EnvVar(var.to_string()),
                value: raw.to_string(),
                reason,
            })?;
        tracked.source = Some(ValueSource::EnvVar);
        Ok(())
    }
}

impl Value for FlagValue {
    fn set(&mut self, raw: &str) -> Result<(), ValueError> {
        let mut tracked = self.inner.borrow_mut();
        if tracked.source == Some(ValueSource::Argument) {
            return Err(ValueError::MultipleTimes);
        }
        tracked.value.set(raw)?;
        tracked.source = Some(ValueSource::Argument);
        Ok(())
    }

    fn get(&self) -> Box<dyn Any> {
        self.inner.borrow().value.get()
    }

    fn text(&self) -> String {
        self.inner.borrow().value.text()
    }

    fn is_bool_flag(&self) -> bool {
        self.inner.borrow().value.is_bool_flag()
    }
}

impl fmt::Debug for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tracked = self.inner.borrow();
        f.debug_struct("FlagValue")
            .field("text", &tracked.value.text())
            .field("initial_text", &tracked.initial_text)
            .field("source", &tracked.source)
            .finish()
    }
}
