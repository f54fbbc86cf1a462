//! Serializable snapshots of flag state.

use serde::{Deserialize, Serialize};

use crate::flag::Flag;
use crate::value::ValueSource;

/// Everything a help renderer or report needs to know about one flag.
///
/// # Examples
///
/// ```
/// use envflag_core::{FlagInfo, GenericFlag};
///
/// let flag = GenericFlag::<i64>::new("timeout")
///     .with_usage("Seconds to wait")
///     .with_env_var("TIMEOUT")
///     .with_default(30);
///
/// let info = FlagInfo::from_flag(&flag);
/// assert_eq!(info.default_text, "30");
/// assert!(info.takes_value);
/// assert!(!info.is_set);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagInfo {
    /// Primary name.
    pub name: String,
    /// Alternative names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Environment variables consulted, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env_vars: Vec<String>,
    /// Usage text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub usage: String,
    /// The value as text before resolution.
    pub default_text: String,
    /// The current value as text.
    pub value: String,
    /// Whether an argument or environment variable supplied the value.
    pub is_set: bool,
    /// Where the value came from, when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ValueSource>,
    /// Whether the flag consumes an argument token.
    pub takes_value: bool,
    /// Whether the flag is a switch.
    pub is_bool_flag: bool,
}

impl FlagInfo {
    /// Captures the current state of `flag`.
    pub fn from_flag(flag: &dyn Flag) -> Self {
        Self {
            name: flag.name().to_string(),
            aliases: flag.aliases().to_vec(),
            env_vars: flag.env_vars().to_vec(),
            usage: flag.usage().to_string(),
            default_text: flag.initial_text(),
            value: flag.value_text(),
            is_set: flag.is_set(),
            source: flag.value_source(),
            takes_value: flag.takes_value(),
            is_bool_flag: flag.is_bool_flag(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoolFlag, FlagSet, GenericFlag};

    #[test]
    fn test_snapshot_after_resolution() {
        let mut flag = GenericFlag::<String>::new("region")
            .with_env_var("REGION")
            .with_default("us-east-1".to_string())
            .with_lookup_env(|key| (key == "REGION").then(|| "eu-west-1".to_string()));

        let mut set = FlagSet::new("deploy");
        flag.apply(&mut set).unwrap();

        let info = FlagInfo::from_flag(&flag);
        assert_eq!(info.default_text, "us-east-1");
        assert_eq!(info.value, "eu-west-1");
        assert_eq!(info.source, Some(ValueSource::EnvVar));
        assert!(info.is_set);
    }

    #[test]
    fn test_json_omits_empty_fields() {
        let flag = BoolFlag::new("verbose");
        let json = serde_json::to_value(FlagInfo::from_flag(&flag)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "name": "verbose",
                "default_text": "false",
                "value": "false",
                "is_set": false,
                "takes_value": false,
                "is_bool_flag": true
            })
        );
    }

    #[test]
    fn test_source_serializes_snake_case() {
        let mut flag = GenericFlag::<i32>::new("n").with_lookup_env(|_| None);
        let mut set = FlagSet::new("test-cmd");
        flag.apply(&mut set).unwrap();
        set.parse(["-n", "4"]).unwrap();

        let json = serde_json::to_string(&FlagInfo::from_flag(&flag)).unwrap();
        assert!(json.contains(r#""source":"argument""#), "{json}");
    }
}
