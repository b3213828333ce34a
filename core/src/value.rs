//! Scalar value kinds and the token decoder.
//!
//! Every flag owns exactly one [`Value`]. The closed set of kinds is
//! described by [`ValueKind`], and [`FlagValue`] ties each supported Rust
//! type to its kind so declarations and reads stay statically typed while
//! storage stays a single tagged union.

use std::fmt;
use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Type tag of a flag value.
///
/// # Examples
///
/// ```
/// use flagscope_core::ValueKind;
///
/// assert!(!ValueKind::Bool.takes_value());
/// assert!(ValueKind::U16.takes_value());
/// assert_eq!(ValueKind::I64.to_string(), "i64");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Str,
}

impl ValueKind {
    /// Short lowercase name (`"bool"`, `"u32"`, `"str"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Str => "str",
        }
    }

    /// Returns `true` if a flag of this kind consumes a value token.
    ///
    /// Booleans are switched on by presence alone.
    pub fn takes_value(self) -> bool {
        !matches!(self, Self::Bool)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded flag value.
///
/// String values borrow the original token; nothing is copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value<'a> {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Str(&'a str),
}

impl Value<'_> {
    /// Returns the kind tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::I8(_) => ValueKind::I8,
            Self::I16(_) => ValueKind::I16,
            Self::I32(_) => ValueKind::I32,
            Self::I64(_) => ValueKind::I64,
            Self::U8(_) => ValueKind::U8,
            Self::U16(_) => ValueKind::U16,
            Self::U32(_) => ValueKind::U32,
            Self::U64(_) => ValueKind::U64,
            Self::Str(_) => ValueKind::Str,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A Rust type that can back a flag.
///
/// Implemented for `bool`, the signed and unsigned integers from 8 to 64
/// bits, and `&'a str`. The trait is sealed; the set of kinds is closed.
pub trait FlagValue<'a>: Copy + sealed::Sealed {
    /// Kind tag stored alongside the flag.
    const KIND: ValueKind;

    /// Wraps `self` in the matching [`Value`] variant.
    fn into_value(self) -> Value<'a>;

    /// Extracts `Self` from a value of the matching kind.
    fn from_value(value: Value<'a>) -> Option<Self>;
}

macro_rules! scalar_flag_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl<'a> FlagValue<'a> for $ty {
                const KIND: ValueKind = ValueKind::$variant;

                fn into_value(self) -> Value<'a> {
                    Value::$variant(self)
                }

                fn from_value(value: Value<'a>) -> Option<Self> {
                    match value {
                        Value::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }
        )*
    };
}

scalar_flag_value!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
);

impl sealed::Sealed for &str {}

impl<'a> FlagValue<'a> for &'a str {
    const KIND: ValueKind = ValueKind::Str;

    fn into_value(self) -> Value<'a> {
        Value::Str(self)
    }

    fn from_value(value: Value<'a>) -> Option<Self> {
        match value {
            Value::Str(inner) => Some(inner),
            _ => None,
        }
    }
}

/// Token decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The token was empty.
    #[error("empty value")]
    Empty,
    /// The token is not an integer literal.
    #[error("malformed integer literal: {0}")]
    Malformed(String),
    /// The integer does not fit the declared width.
    #[error("{value} is out of range for {kind}")]
    OutOfRange { value: String, kind: ValueKind },
    /// Booleans are switched by presence and have no token form.
    #[error("{0} values cannot be decoded from a token")]
    NotDecodable(ValueKind),
}

/// Decodes `token` as a value of `kind`.
///
/// Integers accept an optional sign followed by a `0x`/`0X` hexadecimal,
/// `0`-prefixed octal, or plain decimal literal. The value must fit the
/// declared width exactly; nothing is truncated. Strings are returned as-is.
///
/// # Examples
///
/// ```
/// use flagscope_core::{DecodeError, Value, ValueKind, decode};
///
/// assert_eq!(decode(ValueKind::U8, "0xff"), Ok(Value::U8(255)));
/// assert_eq!(decode(ValueKind::I16, "-010"), Ok(Value::I16(-8)));
/// assert_eq!(decode(ValueKind::Str, "./out"), Ok(Value::Str("./out")));
/// assert!(matches!(
///     decode(ValueKind::U8, "256"),
///     Err(DecodeError::OutOfRange { .. })
/// ));
/// ```
pub fn decode(kind: ValueKind, token: &str) -> Result<Value<'_>, DecodeError> {
    match kind {
        ValueKind::Bool => Err(DecodeError::NotDecodable(kind)),
        ValueKind::Str => Ok(Value::Str(token)),
        ValueKind::I8 => narrow(token, kind).map(Value::I8),
        ValueKind::I16 => narrow(token, kind).map(Value::I16),
        ValueKind::I32 => narrow(token, kind).map(Value::I32),
        ValueKind::I64 => narrow(token, kind).map(Value::I64),
        ValueKind::U8 => narrow(token, kind).map(Value::U8),
        ValueKind::U16 => narrow(token, kind).map(Value::U16),
        ValueKind::U32 => narrow(token, kind).map(Value::U32),
        ValueKind::U64 => narrow(token, kind).map(Value::U64),
    }
}

fn narrow<T: TryFrom<i128>>(token: &str, kind: ValueKind) -> Result<T, DecodeError> {
    let out_of_range = || DecodeError::OutOfRange {
        value: token.to_string(),
        kind,
    };
    let wide = parse_integer(token).map_err(|err| match err {
        DecodeError::OutOfRange { .. } => out_of_range(),
        other => other,
    })?;
    T::try_from(wide).map_err(|_| out_of_range())
}

fn parse_integer(token: &str) -> Result<i128, DecodeError> {
    if token.is_empty() {
        return Err(DecodeError::Empty);
    }
    let malformed = || DecodeError::Malformed(token.to_string());

    let (negative, unsigned) = if let Some(rest) = token.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = token.strip_prefix('+') {
        (false, rest)
    } else {
        (false, token)
    };

    let (radix, digits) = if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        (16, hex)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (8, &unsigned[1..])
    } else {
        (10, unsigned)
    };

    // from_str_radix tolerates its own leading sign; a second one is malformed.
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(malformed());
    }

    let magnitude = u128::from_str_radix(digits, radix).map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow => DecodeError::OutOfRange {
            value: token.to_string(),
            kind: ValueKind::U64,
        },
        _ => malformed(),
    })?;
    let magnitude = i128::try_from(magnitude).map_err(|_| DecodeError::OutOfRange {
        value: token.to_string(),
        kind: ValueKind::U64,
    })?;

    Ok(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_decimal_bounds_per_width() {
        assert_eq!(decode(ValueKind::I8, "-128"), Ok(Value::I8(i8::MIN)));
        assert_eq!(decode(ValueKind::I8, "127"), Ok(Value::I8(i8::MAX)));
        assert_eq!(decode(ValueKind::U16, "65535"), Ok(Value::U16(u16::MAX)));
        assert_eq!(
            decode(ValueKind::I64, "-9223372036854775808"),
            Ok(Value::I64(i64::MIN))
        );
        assert_eq!(
            decode(ValueKind::U64, "18446744073709551615"),
            Ok(Value::U64(u64::MAX))
        );
    }

    #[test]
    fn test_decode_rejects_values_outside_width() {
        for (kind, token) in [
            (ValueKind::I8, "128"),
            (ValueKind::I8, "-129"),
            (ValueKind::U8, "256"),
            (ValueKind::U8, "-1"),
            (ValueKind::I32, "2147483648"),
            (ValueKind::U64, "18446744073709551616"),
            (ValueKind::U64, "340282366920938463463374607431768211456"),
        ] {
            assert!(
                matches!(decode(kind, token), Err(DecodeError::OutOfRange { .. })),
                "{kind} should reject {token}"
            );
        }
    }

    #[test]
    fn test_decode_prefixed_literals() {
        assert_eq!(decode(ValueKind::U32, "0x1F"), Ok(Value::U32(31)));
        assert_eq!(decode(ValueKind::U32, "0XfF"), Ok(Value::U32(255)));
        assert_eq!(decode(ValueKind::U32, "017"), Ok(Value::U32(15)));
        assert_eq!(decode(ValueKind::U32, "0"), Ok(Value::U32(0)));
        assert_eq!(decode(ValueKind::I32, "-0x10"), Ok(Value::I32(-16)));
        assert_eq!(decode(ValueKind::I32, "+42"), Ok(Value::I32(42)));
    }

    #[test]
    fn test_decode_rejects_malformed_tokens() {
        assert_eq!(decode(ValueKind::I32, ""), Err(DecodeError::Empty));
        for token in ["abc", "12abc", "0x", "09", "--1", "+-1", "1_000", " 1", "1.5"] {
            assert_eq!(
                decode(ValueKind::I32, token),
                Err(DecodeError::Malformed(token.to_string())),
                "{token} should be malformed"
            );
        }
    }

    #[test]
    fn test_decode_string_is_borrowed_verbatim() {
        let token = String::from("  spaced\\n ");
        let value = decode(ValueKind::Str, &token).unwrap();
        match value {
            Value::Str(s) => assert!(std::ptr::eq(s, token.as_str())),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_decode_bool_has_no_token_form() {
        assert_eq!(
            decode(ValueKind::Bool, "true"),
            Err(DecodeError::NotDecodable(ValueKind::Bool))
        );
    }

    #[test]
    fn test_flag_value_round_trips_through_kind() {
        assert_eq!(<u16 as FlagValue<'static>>::KIND, ValueKind::U16);
        assert_eq!(u16::from_value(7u16.into_value()), Some(7));
        assert_eq!(u16::from_value(Value::U8(7)), None);
        assert_eq!(<&str>::from_value(Value::Str("x")), Some("x"));
    }
}
