//! Typed command-line flags with environment variable fallback.
//!
//! This crate provides one flag implementation that works for every supported
//! value kind:
//!
//! - [`GenericFlag<T>`]: a flag over any [`GenericType`] (`String`, `i32`,
//!   `i64`, `u32`, `u64`), resolved from an argument, then the first defined
//!   environment variable, then its default.
//! - [`BoolFlag`]: the on/off switch, which takes no argument token.
//! - [`Flag`]: the object-safe view used for help rendering and for holding
//!   flags of mixed kinds in one list.
//! - [`FlagSet`]: the registry that parses command-line tokens into values.
//! - [`FlagInfo`]: a serializable snapshot of one flag's state.
//!
//! Flags can also be declared as data in a YAML [`FlagManifest`] and checked
//! with [`validate_manifest`] before they are built.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//!
//! use envflag_core::*;
//!
//! let env = HashMap::from([("APP_WORKERS".to_string(), "8".to_string())]);
//! let lookup = move |key: &str| env.get(key).cloned();
//!
//! let workers = destination(2i64);
//! let mut flags: Vec<Box<dyn Flag>> = vec![
//!     Box::new(
//!         GenericFlag::new("workers")
//!             .with_env_var("APP_WORKERS")
//!             .with_destination(workers.clone())
//!             .with_lookup_env(lookup.clone()),
//!     ),
//!     Box::new(GenericFlag::<String>::new("name").with_lookup_env(lookup)),
//! ];
//!
//! let mut set = FlagSet::new("app");
//! apply_and_parse(&mut set, &mut flags, ["--name", "api", "serve"]).unwrap();
//!
//! assert_eq!(*workers.borrow(), 8);
//! assert_eq!(flags[0].initial_text(), "2");
//! assert_eq!(flags[1].value_text(), "api");
//! assert_eq!(set.args(), ["serve"]);
//! ```

mod convert;
mod error;
mod flag;
mod flag_set;
mod info;
mod manifest;
mod validate;
mod value;

pub use convert::{GenericType, parse_bool};
pub use error::{FlagError, ManifestError, Origin, Result, ValueError};
pub use flag::{
    BoolFlag, Flag, GenericFlag, LookupEnvFn, apply_and_parse, default_lookup_env,
};
pub use flag_set::FlagSet;
pub use info::FlagInfo;
pub use manifest::{FlagKind, FlagManifest, FlagSpec};
pub use validate::{ValidationError, validate_manifest};
pub use value::{
    BoolValue, Destination, FlagValue, GenericValue, Value, ValueSource, destination,
};
