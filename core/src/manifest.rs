//! YAML flag manifests.
//!
//! A manifest declares a set of flags as data, so a tool can be configured
//! without writing Rust for every option.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! name: deploy
//! flags:
//!   - name: region
//!     kind: string
//!     env_vars: [DEPLOY_REGION]
//!     default: us-east-1
//!     usage: Target region
//!   - name: replicas
//!     kind: int
//!     aliases: [r]
//!     default: 3
//!   - name: dry-run
//!     kind: bool
//! ```

use std::fmt;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::convert::{GenericType, parse_bool};
use crate::error::{ManifestError, ValueError};
use crate::flag::{BoolFlag, Flag, GenericFlag, LookupEnvFn};

/// The value kind of a declared flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    /// Any text (the default).
    #[default]
    String,
    /// Signed 32-bit integer.
    Int,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 32-bit integer.
    Uint,
    /// Unsigned 64-bit integer.
    Uint64,
    /// On/off switch.
    Bool,
}

impl FlagKind {
    /// Checks that `raw` is a valid literal for this kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use envflag_core::{FlagKind, ValueError};
    ///
    /// assert!(FlagKind::Int.check_literal("12").is_ok());
    /// assert_eq!(
    ///     FlagKind::Uint.check_literal("-1"),
    ///     Err(ValueError::Invalid("32-bit unsigned integer"))
    /// );
    /// ```
    pub fn check_literal(self, raw: &str) -> Result<(), ValueError> {
        match self {
            FlagKind::String => String::parse_value(raw).map(drop),
            FlagKind::Int => i32::parse_value(raw).map(drop),
            FlagKind::Int64 => i64::parse_value(raw).map(drop),
            FlagKind::Uint => u32::parse_value(raw).map(drop),
            FlagKind::Uint64 => u64::parse_value(raw).map(drop),
            FlagKind::Bool => parse_bool(raw).map(drop),
        }
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlagKind::String => "string",
            FlagKind::Int => "int",
            FlagKind::Int64 => "int64",
            FlagKind::Uint => "uint",
            FlagKind::Uint64 => "uint64",
            FlagKind::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// One declared flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSpec {
    /// Primary name, without dashes.
    pub name: String,
    /// Value kind.
    #[serde(default)]
    pub kind: FlagKind,
    /// Alternative names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Environment variables consulted in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env_vars: Vec<String>,
    /// Default literal. Scalars of any YAML type are accepted and read as text.
    #[serde(
        default,
        deserialize_with = "scalar_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<String>,
    /// Usage text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub usage: String,
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_yaml::Value>::deserialize(deserializer)? {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_yaml::Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "default must be a scalar, got {other:?}"
        ))),
    }
}

impl FlagSpec {
    /// Creates a spec with no default, aliases or environment variables.
    pub fn new(name: &str, kind: FlagKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            aliases: Vec::new(),
            env_vars: Vec::new(),
            default: None,
            usage: String::new(),
        }
    }

    /// Builds the flag this spec declares, reading the environment through
    /// `lookup_env`.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::InvalidDefault`] if the default literal does
    /// not parse as the declared kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::rc::Rc;
    ///
    /// use envflag_core::{Flag, FlagKind, FlagSpec, LookupEnvFn};
    ///
    /// let mut spec = FlagSpec::new("replicas", FlagKind::Int);
    /// spec.default = Some("3".into());
    ///
    /// let no_env: LookupEnvFn = Rc::new(|_: &str| None::<String>);
    /// let flag = spec.build(&no_env).unwrap();
    /// assert_eq!(flag.initial_text(), "3");
    /// assert!(flag.takes_value());
    /// ```
    pub fn build(&self, lookup_env: &LookupEnvFn) -> Result<Box<dyn Flag>, ManifestError> {
        match self.kind {
            FlagKind::String => self.build_generic::<String>(lookup_env),
            FlagKind::Int => self.build_generic::<i32>(lookup_env),
            FlagKind::Int64 => self.build_generic::<i64>(lookup_env),
            FlagKind::Uint => self.build_generic::<u32>(lookup_env),
            FlagKind::Uint64 => self.build_generic::<u64>(lookup_env),
            FlagKind::Bool => {
                let mut flag = BoolFlag::new(&self.name).with_usage(&self.usage);
                flag.aliases = self.aliases.clone();
                flag.env_vars = self.env_vars.clone();
                flag.lookup_env = lookup_env.clone();
                if let Some(default) = self.parse_default(parse_bool)? {
                    flag = flag.with_default(default);
                }
                Ok(Box::new(flag))
            }
        }
    }

    fn build_generic<T: GenericType>(
        &self,
        lookup_env: &LookupEnvFn,
    ) -> Result<Box<dyn Flag>, ManifestError> {
        let mut flag = GenericFlag::<T>::new(&self.name).with_usage(&self.usage);
        flag.aliases = self.aliases.clone();
        flag.env_vars = self.env_vars.clone();
        flag.lookup_env = lookup_env.clone();
        if let Some(default) = self.parse_default(T::parse_value)? {
            flag = flag.with_default(default);
        }
        Ok(Box::new(flag))
    }

    fn parse_default<T>(
        &self,
        parse: impl Fn(&str) -> Result<T, ValueError>,
    ) -> Result<Option<T>, ManifestError> {
        self.default
            .as_deref()
            .map(|raw| {
                parse(raw).map_err(|reason| ManifestError::InvalidDefault {
                    flag: self.name.clone(),
                    value: raw.to_string(),
                    reason,
                })
            })
            .transpose()
    }
}

/// A set of flag declarations loaded from YAML.
///
/// # Examples
///
/// ```
/// use envflag_core::{FlagKind, FlagManifest};
///
/// let manifest = FlagManifest::from_yaml_str(r#"
/// version: "1.0"
/// flags:
///   - name: port
///     kind: int
///     default: 8080
/// "#).unwrap();
///
/// let port = manifest.find("port").unwrap();
/// assert_eq!(port.kind, FlagKind::Int);
/// assert_eq!(port.default.as_deref(), Some("8080"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagManifest {
    /// Manifest format version (e.g., `"1.0"`).
    pub version: String,
    /// Name of the tool or command the flags belong to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Declared flags, in registration order.
    #[serde(default)]
    pub flags: Vec<FlagSpec>,
}

impl FlagManifest {
    /// Creates an empty manifest.
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            name: None,
            flags: Vec::new(),
        }
    }

    /// Parses a manifest from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`YamlError`](ManifestError::YamlError) if parsing fails.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ManifestError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads a manifest from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ManifestError::IoError) if the file cannot be
    /// read, or [`YamlError`](ManifestError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let manifest = serde_yaml::from_reader(reader)?;
        Ok(manifest)
    }

    /// Saves the manifest as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ManifestError::IoError) if the file cannot be
    /// written, or [`YamlError`](ManifestError::YamlError) if serialization
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ManifestError> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Finds a declared flag by primary name or alias.
    pub fn find(&self, name: &str) -> Option<&FlagSpec> {
        self.flags
            .iter()
            .find(|f| f.name == name || f.aliases.iter().any(|a| a == name))
    }

    /// Builds every declared flag in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`ManifestError::InvalidDefault`] encountered.
    pub fn build_flags(&self, lookup_env: &LookupEnvFn) -> Result<Vec<Box<dyn Flag>>, ManifestError> {
        self.flags.iter().map(|spec| spec.build(lookup_env)).collect()
    }
}
