//! Manifest validation.
//!
//! Catches problems that would otherwise surface only when the flags are
//! applied: names a flag set would refuse, names that collide, environment
//! variable names no shell can export, and defaults that do not parse.
//!
//! # Examples
//!
//! ```
//! use envflag_core::*;
//!
//! let mut manifest = FlagManifest::new("1.0");
//! manifest.flags.push(FlagSpec::new("verbose", FlagKind::Bool));
//! assert!(validate_manifest(&manifest).is_empty());
//!
//! // Invalid: name starts with a dash
//! manifest.flags.push(FlagSpec::new("-quiet", FlagKind::Bool));
//! assert!(!validate_manifest(&manifest).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::error::ValueError;
use crate::manifest::{FlagManifest, FlagSpec};

/// Manifest validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Manifest version string is empty.
    #[error("manifest version cannot be empty")]
    EmptyVersion,
    /// A flag or alias name is empty.
    #[error("flag name cannot be empty")]
    EmptyFlagName,
    /// A flag or alias name starts with a dash, contains `=` or whitespace.
    #[error("invalid flag name: {0}")]
    InvalidFlagName(String),
    /// Two flags, or a flag and an alias, share a name.
    #[error("duplicate flag name: {0}")]
    DuplicateFlag(String),
    /// An environment variable name is not `[A-Za-z_][A-Za-z0-9_]*`.
    #[error("invalid env var name for flag -{flag}: {var:?}")]
    InvalidEnvVar { flag: String, var: String },
    /// A default literal does not parse as the flag's kind.
    #[error("invalid default {value:?} for flag -{flag}: {reason}")]
    InvalidDefault {
        flag: String,
        value: String,
        reason: ValueError,
    },
}

/// Validates a flag manifest, stopping at the first problem.
///
/// # Examples
///
/// ```
/// use envflag_core::*;
///
/// let mut manifest = FlagManifest::new("1.0");
/// manifest.flags.push(FlagSpec::new("output", FlagKind::String));
///
/// let mut dup = FlagSpec::new("out", FlagKind::String);
/// dup.aliases.push("output".into());
/// manifest.flags.push(dup);
///
/// let errors = validate_manifest(&manifest);
/// assert_eq!(errors, vec![ValidationError::DuplicateFlag("output".into())]);
/// ```
pub fn validate_manifest(manifest: &FlagManifest) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if manifest.version.trim().is_empty() {
        errors.push(ValidationError::EmptyVersion);
        return errors;
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for spec in &manifest.flags {
        for name in std::iter::once(&spec.name).chain(&spec.aliases) {
            if let Err(err) = check_flag_name(name) {
                errors.push(err);
                return errors;
            }
            if !seen.insert(name.as_str()) {
                errors.push(ValidationError::DuplicateFlag(name.clone()));
                return errors;
            }
        }

        errors.extend(validate_spec(spec));
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}

fn check_flag_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyFlagName);
    }
    if name.starts_with('-') || name.contains('=') || name.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFlagName(name.to_string()));
    }
    Ok(())
}

fn validate_spec(spec: &FlagSpec) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for var in &spec.env_vars {
        if !is_env_var_name(var) {
            errors.push(ValidationError::InvalidEnvVar {
                flag: spec.name.clone(),
                var: var.clone(),
            });
            return errors;
        }
    }

    if let Some(value) = &spec.default {
        if let Err(reason) = spec.kind.check_literal(value) {
            errors.push(ValidationError::InvalidDefault {
                flag: spec.name.clone(),
                value: value.clone(),
                reason,
            });
        }
    }

    errors
}

fn is_env_var_name(var: &str) -> bool {
    let mut chars = var.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
