use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A single field value, as packed into or unpacked from a record.
///
/// Each variant corresponds to exactly one kind of field in a format string. Packing never
/// converts between variants: an `I32` value can only be packed into an `i`/`l` field.
///
/// Strings are raw bytes. The wire format doesn't carry an encoding, and fixed-size fields may
/// cut a multi-byte character in half.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    /// Contents of a fixed-size `s` field.
    FixedStr(#[serde(with = "serde_bytes")] Vec<u8>),
    /// Contents of a null-terminated `S` field.
    CStr(#[serde(with = "serde_bytes")] Vec<u8>),
}

impl Value {
    /// Make a value for a fixed-size string field.
    pub fn fixed_str(v: impl Into<Vec<u8>>) -> Value {
        Value::FixedStr(v.into())
    }

    /// Make a value for a null-terminated string field.
    pub fn cstr(v: impl Into<Vec<u8>>) -> Value {
        Value::CStr(v.into())
    }

    /// Name of the value's type, for error reporting.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::I8(_) => "i8",
            Value::U8(_) => "u8",
            Value::I16(_) => "i16",
            Value::U16(_) => "u16",
            Value::I32(_) => "i32",
            Value::U32(_) => "u32",
            Value::I64(_) => "i64",
            Value::U64(_) => "u64",
            Value::FixedStr(_) => "fixed-size string",
            Value::CStr(_) => "null-terminated string",
        }
    }

    pub fn is_int(&self) -> bool {
        !self.is_str()
    }

    pub fn is_str(&self) -> bool {
        matches!(self, Value::FixedStr(_) | Value::CStr(_))
    }

    /// Return the bytes of either string variant.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::FixedStr(v) | Value::CStr(v) => Some(v),
            _ => None,
        }
    }

    /// Return the value of any integer variant, widened to `i64`. `U64` values above
    /// `i64::MAX` don't fit and return `None`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I8(v) => Some(v.into()),
            Value::U8(v) => Some(v.into()),
            Value::I16(v) => Some(v.into()),
            Value::U16(v) => Some(v.into()),
            Value::I32(v) => Some(v.into()),
            Value::U32(v) => Some(v.into()),
            Value::I64(v) => Some(v),
            Value::U64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::I8(v) => fmt::Display::fmt(v, f),
            Value::U8(v) => fmt::Display::fmt(v, f),
            Value::I16(v) => fmt::Display::fmt(v, f),
            Value::U16(v) => fmt::Display::fmt(v, f),
            Value::I32(v) => fmt::Display::fmt(v, f),
            Value::U32(v) => fmt::Display::fmt(v, f),
            Value::I64(v) => fmt::Display::fmt(v, f),
            Value::U64(v) => fmt::Display::fmt(v, f),
            Value::FixedStr(v) | Value::CStr(v) => {
                write!(f, "\"{}\"", v.escape_ascii())
            }
        }
    }
}

macro_rules! impl_value_from {
    ($t: ty, $p: ident) => {
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::$p(v)
            }
        }
    };
}

impl_value_from!(i8, I8);
impl_value_from!(u8, U8);
impl_value_from!(i16, I16);
impl_value_from!(u16, U16);
impl_value_from!(i32, I32);
impl_value_from!(u32, U32);
impl_value_from!(i64, I64);
impl_value_from!(u64, U64);

macro_rules! impl_try_from_value {
    ($t: ty, $p: ident, $name: expr) => {
        impl TryFrom<Value> for $t {
            type Error = Error;
            fn try_from(v: Value) -> Result<Self, Self::Error> {
                match v {
                    Value::$p(v) => Ok(v),
                    _ => Err(Error::TypeMismatch {
                        expected: $name,
                        actual: v.type_name(),
                    }),
                }
            }
        }
    };
}

impl_try_from_value!(i8, I8, "i8");
impl_try_from_value!(u8, U8, "u8");
impl_try_from_value!(i16, I16, "i16");
impl_try_from_value!(u16, U16, "u16");
impl_try_from_value!(i32, I32, "i32");
impl_try_from_value!(u32, U32, "u32");
impl_try_from_value!(i64, I64, "i64");
impl_try_from_value!(u64, U64, "u64");

impl TryFrom<Value> for Vec<u8> {
    type Error = Error;
    fn try_from(v: Value) -> Result<Self, Self::Error> {
        match v {
            Value::FixedStr(v) | Value::CStr(v) => Ok(v),
            _ => Err(Error::TypeMismatch {
                expected: "string",
                actual: v.type_name(),
            }),
        }
    }
}
