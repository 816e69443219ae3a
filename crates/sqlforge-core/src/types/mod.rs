//! Value type tags and the rules for combining them.
//!
//! Every expression node carries a [`TypeTag`]. The [`check`] module decides,
//! before a node is built, whether two tags may be combined by an operator
//! and what the result tag is. The marker traits in this module encode the
//! same rules statically so the typed API rejects bad combinations at
//! compile time.

pub mod check;

use std::fmt;

/// The base domain of a value, without nullability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// 64-bit signed integer.
    Integer,
    /// Double-precision floating point.
    Real,
    /// UTF-8 text.
    Text,
    /// Boolean.
    Boolean,
}

impl ScalarType {
    /// Returns the name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Integer => "Integer",
            Self::Real => "Real",
            Self::Text => "Text",
            Self::Boolean => "Boolean",
        }
    }

    /// Returns true for `Integer` and `Real`.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Real)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The engine's classification of a value: a scalar type, optionally
/// wrapped in `Optional<_>` for nullable values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag {
    scalar: ScalarType,
    optional: bool,
}

impl TypeTag {
    /// `Integer`.
    pub const INTEGER: Self = Self::new(ScalarType::Integer);
    /// `Real`.
    pub const REAL: Self = Self::new(ScalarType::Real);
    /// `Text`.
    pub const TEXT: Self = Self::new(ScalarType::Text);
    /// `Boolean`.
    pub const BOOLEAN: Self = Self::new(ScalarType::Boolean);

    /// Creates a non-optional tag.
    #[must_use]
    pub const fn new(scalar: ScalarType) -> Self {
        Self {
            scalar,
            optional: false,
        }
    }

    /// Creates an `Optional<scalar>` tag.
    #[must_use]
    pub const fn optional(scalar: ScalarType) -> Self {
        Self {
            scalar,
            optional: true,
        }
    }

    /// Returns the scalar type with any `Optional` layer stripped.
    #[must_use]
    pub const fn scalar(self) -> ScalarType {
        self.scalar
    }

    /// Returns true if this is an `Optional<_>` tag.
    #[must_use]
    pub const fn is_optional(self) -> bool {
        self.optional
    }

    /// Returns the tag without its `Optional` layer.
    #[must_use]
    pub const fn strip(self) -> Self {
        Self::new(self.scalar)
    }

    /// Returns the tag wrapped in `Optional`. Already-optional tags are
    /// returned unchanged.
    #[must_use]
    pub const fn nullable(self) -> Self {
        Self::optional(self.scalar)
    }

    /// Returns `self` made optional when `optional` is true.
    #[must_use]
    pub const fn nullable_if(self, optional: bool) -> Self {
        if optional { self.nullable() } else { self }
    }

    /// Returns true if both tags are identical after stripping one
    /// `Optional` layer from each side.
    #[must_use]
    pub fn comparable_with(self, other: Self) -> bool {
        self.scalar == other.scalar
    }

    /// Returns true for numeric tags, optional or not.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        self.scalar.is_numeric()
    }

    /// Returns true for `Boolean` and `Optional<Boolean>`.
    #[must_use]
    pub fn is_boolean(self) -> bool {
        self.scalar == ScalarType::Boolean
    }
}

impl From<ScalarType> for TypeTag {
    fn from(scalar: ScalarType) -> Self {
        Self::new(scalar)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            write!(f, "Optional<{}>", self.scalar)
        } else {
            f.write_str(self.scalar.name())
        }
    }
}

// ============================================================================
// Static mirror of the checker
// ============================================================================

/// A Rust type standing for an SQL value type.
///
/// `i64`, `f64`, `String` and `bool` are the scalar types; `Option<T>` of
/// any of them is the nullable variant.
pub trait SqlType: 'static {
    /// The tag carried by expressions of this type.
    const TAG: TypeTag;

    /// The type with nullability removed.
    type NonNull: Scalar;

    /// The nullable form of the type.
    type Nullable: SqlType;
}

/// Non-nullable SQL types.
pub trait Scalar: SqlType {}

/// `Integer`, `Real` and their optional forms.
pub trait Numeric: SqlType {}

/// `Text` and `Optional<Text>`.
pub trait Textual: SqlType {
    /// Result type of `LENGTH(..)` over this type.
    type Length: SqlType;
}

/// `Boolean` and `Optional<Boolean>`.
pub trait BooleanType: SqlType {}

/// Types that may be compared with `Rhs`.
pub trait Comparable<Rhs: SqlType>: SqlType {}

/// Column types that accept a value of type `V` in INSERT or UPDATE.
pub trait Assignable<V: SqlType>: SqlType {}

/// Types that support `+ - * /` with `Rhs`.
pub trait Arithmetic<Rhs: SqlType>: SqlType {
    /// The result type.
    type Output: SqlType;
}

macro_rules! impl_scalar {
    ($($ty:ty => $scalar:ident),+ $(,)?) => {
        $(
            impl SqlType for $ty {
                const TAG: TypeTag = TypeTag::new(ScalarType::$scalar);
                type NonNull = $ty;
                type Nullable = Option<$ty>;
            }

            impl Scalar for $ty {}

            impl Comparable<$ty> for $ty {}
            impl Comparable<Option<$ty>> for $ty {}
            impl Comparable<$ty> for Option<$ty> {}
            impl Comparable<Option<$ty>> for Option<$ty> {}

            impl Assignable<$ty> for $ty {}
            impl Assignable<$ty> for Option<$ty> {}
            impl Assignable<Option<$ty>> for Option<$ty> {}
        )+
    };
}

impl_scalar!(i64 => Integer, f64 => Real, String => Text, bool => Boolean);

impl<T: Scalar> SqlType for Option<T> {
    const TAG: TypeTag = T::TAG.nullable();
    type NonNull = T;
    type Nullable = Self;
}

impl Numeric for i64 {}
impl Numeric for f64 {}
impl Numeric for Option<i64> {}
impl Numeric for Option<f64> {}

impl Textual for String {
    type Length = i64;
}
impl Textual for Option<String> {
    type Length = Option<i64>;
}

impl BooleanType for bool {}
impl BooleanType for Option<bool> {}

macro_rules! impl_arithmetic {
    ($($lhs:ty, $rhs:ty => $out:ty);+ $(;)?) => {
        $(
            impl Arithmetic<$rhs> for $lhs {
                type Output = $out;
            }
            impl Arithmetic<Option<$rhs>> for $lhs {
                type Output = Option<$out>;
            }
            impl Arithmetic<$rhs> for Option<$lhs> {
                type Output = Option<$out>;
            }
            impl Arithmetic<Option<$rhs>> for Option<$lhs> {
                type Output = Option<$out>;
            }
        )+
    };
}

impl_arithmetic! {
    i64, i64 => i64;
    i64, f64 => f64;
    f64, i64 => f64;
    f64, f64 => f64;
}
