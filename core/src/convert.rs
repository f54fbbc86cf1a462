//! Conversion between primitive flag values and their textual form.
//!
//! Each supported kind implements [`GenericType`], which is the only place
//! that knows how to read a kind from a string and render it back. The rest
//! of the crate is written once against the trait.

use std::fmt::Debug;

use crate::error::ValueError;

/// A primitive value kind that a [`GenericFlag`](crate::GenericFlag) can hold.
///
/// Implemented for [`String`], [`i32`], [`i64`], [`u32`] and [`u64`]. Other
/// crates may implement it for their own primitive-like types.
///
/// # Examples
///
/// ```
/// use envflag_core::{GenericType, ValueError};
///
/// assert_eq!(i32::parse_value("42"), Ok(42));
/// assert_eq!(i32::parse_value("0x10"), Ok(16));
/// assert_eq!(
///     i32::parse_value("monkey"),
///     Err(ValueError::Invalid("32-bit integer"))
/// );
/// assert_eq!(String::parse_value("anything").unwrap(), "anything");
/// assert_eq!((-7i64).format_value(), "-7");
/// ```
pub trait GenericType: Clone + Default + Debug + 'static {
    /// Description of the accepted values, used as `must be <KIND>`.
    const KIND: &'static str;

    /// Reads a value from its textual form.
    fn parse_value(raw: &str) -> Result<Self, ValueError>;

    /// Renders the value in its canonical textual form.
    fn format_value(&self) -> String;
}

impl GenericType for String {
    const KIND: &'static str = "string";

    fn parse_value(raw: &str) -> Result<Self, ValueError> {
        Ok(raw.to_string())
    }

    fn format_value(&self) -> String {
        self.clone()
    }
}

macro_rules! integer_types {
    ($($type:ty => $kind:literal),* $(,)?) => {
        $(
            impl GenericType for $type {
                const KIND: &'static str = $kind;

                fn parse_value(raw: &str) -> Result<Self, ValueError> {
                    parse_integer(raw)
                        .and_then(|value| <$type>::try_from(value).ok())
                        .ok_or(ValueError::Invalid(Self::KIND))
                }

                fn format_value(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

integer_types! {
    i32 => "32-bit integer",
    i64 => "64-bit integer",
    u32 => "32-bit unsigned integer",
    u64 => "64-bit unsigned integer",
}

/// Parses an integer literal into the widest type, leaving the range check to
/// the caller.
///
/// Accepts an optional sign followed by decimal digits or a `0x`, `0o` or `0b`
/// prefixed literal.
fn parse_integer(raw: &str) -> Option<i128> {
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };

    let (radix, digits) = match unsigned.get(..2) {
        Some("0x" | "0X") => (16, &unsigned[2..]),
        Some("0o" | "0O") => (8, &unsigned[2..]),
        Some("0b" | "0B") => (2, &unsigned[2..]),
        _ => (10, unsigned),
    };

    // from_str_radix accepts its own sign, which would allow "--1" or "0x-1"
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = i128::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Reads a boolean the way command-line tools conventionally do.
///
/// Accepts `1`, `t`, `T`, `TRUE`, `true`, `True` and their false
/// counterparts `0`, `f`, `F`, `FALSE`, `false`, `False`.
pub fn parse_bool(raw: &str) -> Result<bool, ValueError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ValueError::Invalid("boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_never_fails() {
        assert_eq!(String::parse_value("").unwrap(), "");
        assert_eq!(String::parse_value("--weird=value").unwrap(), "--weird=value");
    }

    #[test]
    fn test_i32_bounds() {
        assert_eq!(i32::parse_value("2147483647"), Ok(i32::MAX));
        assert_eq!(i32::parse_value("-2147483648"), Ok(i32::MIN));
        assert_eq!(
            i32::parse_value("2147483648"),
            Err(ValueError::Invalid("32-bit integer"))
        );
    }

    #[test]
    fn test_i64_bounds() {
        assert_eq!(i64::parse_value("9223372036854775807"), Ok(i64::MAX));
        assert_eq!(
            i64::parse_value("9223372036854775808"),
            Err(ValueError::Invalid("64-bit integer"))
        );
        assert_eq!(
            i64::parse_value("monkey"),
            Err(ValueError::Invalid("64-bit integer"))
        );
    }

    #[test]
    fn test_unsigned_rejects_negative() {
        assert_eq!(
            u32::parse_value("-1"),
            Err(ValueError::Invalid("32-bit unsigned integer"))
        );
        assert_eq!(u64::parse_value("18446744073709551615"), Ok(u64::MAX));
        assert_eq!(u64::parse_value("-0"), Ok(0));
    }

    #[test]
    fn test_radix_prefixes() {
        assert_eq!(i64::parse_value("0xff"), Ok(255));
        assert_eq!(i64::parse_value("-0X10"), Ok(-16));
        assert_eq!(i64::parse_value("0o17"), Ok(15));
        assert_eq!(i64::parse_value("0b101"), Ok(5));
        assert_eq!(i64::parse_value("+12"), Ok(12));
    }

    #[test]
    fn test_malformed_integers() {
        for raw in ["", "-", "+", "0x", "--1", "+-1", "0x-1", "1.5", " 1", "1_000"] {
            assert!(i32::parse_value(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn test_format_is_decimal() {
        assert_eq!(i32::parse_value("0x10").unwrap().format_value(), "16");
        assert_eq!(0i32.format_value(), "0");
        assert_eq!(String::new().format_value(), "");
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Ok(true));
        assert_eq!(parse_bool("T"), Ok(true));
        assert_eq!(parse_bool("0"), Ok(false));
        assert_eq!(parse_bool("False"), Ok(false));
        assert_eq!(parse_bool("yes"), Err(ValueError::Invalid("boolean")));
    }
}
