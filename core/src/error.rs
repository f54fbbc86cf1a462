//! Error types for flag registration, resolution, and parsing.
//!
//! Errors are layered: a [`ValueError`] says why a raw string was rejected by
//! a single value, and [`FlagError`] adds where that string came from (a
//! command-line flag or an environment variable) along with the failures that
//! belong to the flag set itself, like unknown or duplicate registrations.

use std::fmt;

use thiserror::Error;

/// Reason a value rejected a raw string.
///
/// The `Display` form is the tail of the full message, e.g.
/// `must be 32-bit integer`.
///
/// # Examples
///
/// ```
/// use envflag_core::ValueError;
///
/// assert_eq!(ValueError::Invalid("32-bit integer").to_string(), "must be 32-bit integer");
/// assert_eq!(ValueError::MultipleTimes.to_string(), "setting the flag multiple times");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The string does not conform to the value kind.
    #[error("must be {0}")]
    Invalid(&'static str),
    /// The flag was given more than once on the command line.
    #[error("setting the flag multiple times")]
    MultipleTimes,
}

/// Where a raw value string came from.
///
/// # Examples
///
/// ```
/// use envflag_core::Origin;
///
/// assert_eq!(Origin::Flag("foo".into()).to_string(), "flag -foo");
/// assert_eq!(Origin::EnvVar("FOO".into()).to_string(), "env var FOO");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// A command-line flag, by the name it was given under.
    Flag(String),
    /// An environment variable.
    EnvVar(String),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Flag(name) => write!(f, "flag -{name}"),
            Origin::EnvVar(name) => write!(f, "env var {name}"),
        }
    }
}

/// Errors returned while applying flags to a [`FlagSet`](crate::FlagSet) or
/// parsing arguments with it.
///
/// None of these are recoverable within the same parse cycle; a flag whose
/// apply or parse failed holds an untrustworthy value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    /// A value string from the command line or environment was rejected.
    #[error("invalid value {value:?} for {origin}: {reason}")]
    InvalidValue {
        /// Where the string came from.
        origin: Origin,
        /// The offending literal.
        value: String,
        /// Why it was rejected.
        reason: ValueError,
    },

    /// A flag was registered with an empty or malformed name.
    #[error("invalid flag name {0:?}: must be non-empty and must not start with '-' or contain '='")]
    InvalidName(String),

    /// A flag name was registered twice on the same flag set.
    #[error("flag redefined: {0}")]
    Redefined(String),

    /// The command line named a flag that was never registered.
    #[error("flag provided but not defined: -{0}")]
    NotDefined(String),

    /// A value-taking flag was the last token on the command line.
    #[error("flag needs an argument: -{0}")]
    MissingArgument(String),

    /// A token started with a dash but could not be read as a flag.
    #[error("bad flag syntax: {0}")]
    BadSyntax(String),

    /// `-h`, `-help` or `--help` was given and no such flag is registered.
    #[error("flag: help requested")]
    HelpRequested,
}

impl FlagError {
    /// Returns `true` if this error reports a type conversion failure.
    pub fn is_conversion(&self) -> bool {
        matches!(
            self,
            FlagError::InvalidValue {
                reason: ValueError::Invalid(_),
                ..
            }
        )
    }

    /// Returns `true` if this error reports a flag given more than once.
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            FlagError::InvalidValue {
                reason: ValueError::MultipleTimes,
                ..
            }
        )
    }

    /// Returns `true` if this error was raised while registering a flag.
    pub fn is_registration(&self) -> bool {
        matches!(self, FlagError::InvalidName(_) | FlagError::Redefined(_))
    }
}

/// Convenience alias for results with [`FlagError`].
pub type Result<T> = std::result::Result<T, FlagError>;

/// Errors from loading, saving, or building a [`FlagManifest`](crate::FlagManifest).
#[derive(Debug, Error)]
pub enum ManifestError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A declared default does not parse as the flag's kind.
    #[error("invalid default {value:?} for flag -{flag}: {reason}")]
    InvalidDefault {
        /// Name of the flag.
        flag: String,
        /// The declared default literal.
        value: String,
        /// Why it was rejected.
        reason: ValueError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_conversion_message() {
        let err = FlagError::InvalidValue {
            origin: Origin::EnvVar("FOO".to_string()),
            value: "monkey".to_string(),
            reason: ValueError::Invalid("32-bit integer"),
        };
        assert_eq!(
            err.to_string(),
            r#"invalid value "monkey" for env var FOO: must be 32-bit integer"#
        );
        assert!(err.is_conversion());
        assert!(!err.is_duplicate());
    }

    #[test]
    fn test_duplicate_message() {
        let err = FlagError::InvalidValue {
            origin: Origin::Flag("foo".to_string()),
            value: "b".to_string(),
            reason: ValueError::MultipleTimes,
        };
        assert_eq!(
            err.to_string(),
            r#"invalid value "b" for flag -foo: setting the flag multiple times"#
        );
        assert!(err.is_duplicate());
    }

    #[test]
    fn test_value_is_quoted_with_escapes() {
        let err = FlagError::InvalidValue {
            origin: Origin::Flag("n".to_string()),
            value: "a\"b".to_string(),
            reason: ValueError::Invalid("64-bit integer"),
        };
        assert_eq!(
            err.to_string(),
            r#"invalid value "a\"b" for flag -n: must be 64-bit integer"#
        );
    }

    #[test]
    fn test_registration_errors() {
        assert!(FlagError::Redefined("foo".into()).is_registration());
        assert!(FlagError::InvalidName("-foo".into()).is_registration());
        assert!(!FlagError::HelpRequested.is_registration());
        assert_eq!(
            FlagError::NotDefined("bar".into()).to_string(),
            "flag provided but not defined: -bar"
        );
    }
}
