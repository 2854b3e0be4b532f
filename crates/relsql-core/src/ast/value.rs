//! SQL values and parameter handling.
//!
//! A [`SqlValue`] is the payload of literal and bind-parameter nodes and
//! the element type of the parameter vector returned by every renderer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::quote::escape_string;

/// A SQL value that can be used as a literal or a bind parameter.
///
/// Integers of every width collapse into [`SqlValue::Int`] or
/// [`SqlValue::UInt`]; floats of both widths into [`SqlValue::Float`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Int(i64),
    /// Unsigned integer value.
    UInt(u64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
}

impl SqlValue {
    /// Returns true for [`SqlValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the SQL representation for inline use (escaped).
    ///
    /// **Warning**: Prefer parameterized rendering. This is what the
    /// renderers emit when parameterisation is switched off.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(true) => String::from("TRUE"),
            Self::Bool(false) => String::from("FALSE"),
            Self::Int(n) => n.to_string(),
            Self::UInt(n) => n.to_string(),
            Self::Float(f) => format_float(*f),
            Self::Text(s) => format!("'{}'", escape_string(s)),
        }
    }

    /// Returns a short name for the value's kind, used in graph labels.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql_inline())
    }
}

/// Formats a float the way `%g` does with the shortest precision.
///
/// Decimal notation is used while the decimal exponent lies in
/// `-4..6`, scientific notation (`1.5e+07`) otherwise.
#[must_use]
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        return String::from("NaN");
    }
    if f.is_infinite() {
        return String::from(if f > 0.0 { "+Inf" } else { "-Inf" });
    }
    if f == 0.0 {
        return String::from(if f.is_sign_negative() { "-0" } else { "0" });
    }

    let sci = format!("{f:e}");
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    if (-4..6).contains(&exp) {
        return f.to_string();
    }
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl<T: Into<SqlValue>> ToSqlValue for T {
    fn to_sql_value(self) -> SqlValue {
        self.into()
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(
            impl From<$t> for SqlValue {
                fn from(v: $t) -> Self {
                    Self::Int(i64::from(v))
                }
            }
        )*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(
            impl From<$t> for SqlValue {
                fn from(v: $t) -> Self {
                    Self::UInt(u64::from(v))
                }
            }
        )*
    };
}

impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32, u64);

impl From<isize> for SqlValue {
    fn from(v: isize) -> Self {
        // isize is at most 64 bits on every supported target.
        Self::Int(v as i64)
    }
}

impl From<usize> for SqlValue {
    fn from(v: usize) -> Self {
        Self::UInt(v as u64)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(String::from(v))
    }
}

impl From<&String> for SqlValue {
    fn from(v: &String) -> Self {
        Self::Text(v.clone())
    }
}

impl<T: Into<Self>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
