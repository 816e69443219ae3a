//! SQL values and their serialization.
//!
//! Values are bound as parameters by default. Each value has a textual
//! parameter form, used by text-protocol execution layers, and an inline
//! form with quoting done by the engine itself.

use crate::types::{ScalarType, TypeTag};

/// A literal SQL value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Integer value.
    Integer(i64),
    /// Real value.
    Real(f64),
    /// Text value.
    Text(String),
    /// Boolean value.
    Boolean(bool),
}

impl SqlValue {
    /// Returns the scalar type of a non-null value.
    #[must_use]
    pub const fn scalar(&self) -> Option<ScalarType> {
        match self {
            Self::Null => None,
            Self::Integer(_) => Some(ScalarType::Integer),
            Self::Real(_) => Some(ScalarType::Real),
            Self::Text(_) => Some(ScalarType::Text),
            Self::Boolean(_) => Some(ScalarType::Boolean),
        }
    }

    /// Returns true for NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the parameter text for this value, or `None` for NULL.
    ///
    /// Integers render as decimal, reals as fixed-point text that always
    /// contains a decimal point, booleans as `true`/`false` and text as-is.
    /// Non-finite reals have no fixed-point form and use the PostgreSQL
    /// float spellings `NaN`, `Infinity` and `-Infinity`.
    #[must_use]
    pub fn to_param_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Integer(n) => Some(n.to_string()),
            Self::Real(f) => Some(format_real(*f)),
            Self::Text(s) => Some(s.clone()),
            Self::Boolean(b) => Some(String::from(if *b { "true" } else { "false" })),
        }
    }

    /// Returns the SQL representation for inline use (escaped).
    ///
    /// **Warning**: Prefer parameter binding. Inline values are reserved for
    /// engine-generated constants and for migration scripts.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Boolean(b) => {
                if *b {
                    String::from("TRUE")
                } else {
                    String::from("FALSE")
                }
            }
            Self::Integer(n) => format!("{n}"),
            Self::Real(f) if !f.is_finite() => format!("'{}'", format_real(*f)),
            Self::Real(f) => format_real(*f),
            Self::Text(s) => {
                // Escape single quotes by doubling them
                let escaped = s.replace('\'', "''");
                format!("'{escaped}'")
            }
        }
    }
}

/// Formats a real as fixed-point text.
///
/// `f64`'s `Display` never switches to exponent notation; integral values
/// get a trailing `.0` so the text reads as a real.
fn format_real(value: f64) -> String {
    if value.is_nan() {
        return String::from("NaN");
    }
    if value.is_infinite() {
        return String::from(if value > 0.0 { "Infinity" } else { "-Infinity" });
    }
    let text = value.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// The tag of values of this type.
    const TAG: TypeTag;

    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for bool {
    const TAG: TypeTag = TypeTag::BOOLEAN;

    fn to_sql_value(self) -> SqlValue {
        SqlValue::Boolean(self)
    }
}

impl ToSqlValue for i64 {
    const TAG: TypeTag = TypeTag::INTEGER;

    fn to_sql_value(self) -> SqlValue {
        SqlValue::Integer(self)
    }
}

impl ToSqlValue for i32 {
    const TAG: TypeTag = TypeTag::INTEGER;

    fn to_sql_value(self) -> SqlValue {
        SqlValue::Integer(i64::from(self))
    }
}

impl ToSqlValue for i16 {
    const TAG: TypeTag = TypeTag::INTEGER;

    fn to_sql_value(self) -> SqlValue {
        SqlValue::Integer(i64::from(self))
    }
}

impl ToSqlValue for u32 {
    const TAG: TypeTag = TypeTag::INTEGER;

    fn to_sql_value(self) -> SqlValue {
        SqlValue::Integer(i64::from(self))
    }
}

impl ToSqlValue for u16 {
    const TAG: TypeTag = TypeTag::INTEGER;

    fn to_sql_value(self) -> SqlValue {
        SqlValue::Integer(i64::from(self))
    }
}

impl ToSqlValue for f64 {
    const TAG: TypeTag = TypeTag::REAL;

    fn to_sql_value(self) -> SqlValue {
        SqlValue::Real(self)
    }
}

impl ToSqlValue for f32 {
    const TAG: TypeTag = TypeTag::REAL;

    fn to_sql_value(self) -> SqlValue {
        SqlValue::Real(f64::from(self))
    }
}

impl ToSqlValue for String {
    const TAG: TypeTag = TypeTag::TEXT;

    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    const TAG: TypeTag = TypeTag::TEXT;

    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for &String {
    const TAG: TypeTag = TypeTag::TEXT;

    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    const TAG: TypeTag = T::TAG.nullable();

    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}
