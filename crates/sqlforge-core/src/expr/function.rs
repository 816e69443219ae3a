//! Function catalog.
//!
//! Each function declares the argument types it accepts and how its result
//! type follows from its argument.

use crate::types::{ScalarType, TypeTag};

/// A SQL function known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    /// `COUNT(x)`, `COUNT(DISTINCT x)` or `COUNT(*)`.
    Count,
    /// `SUM(x)`, numeric only.
    Sum,
    /// `AVG(x)`, numeric only.
    Avg,
    /// `MIN(x)`.
    Min,
    /// `MAX(x)`.
    Max,
    /// `LOWER(x)`, text only.
    Lower,
    /// `UPPER(x)`, text only.
    Upper,
    /// `LENGTH(x)`, text only.
    Length,
    /// `TRIM(x)`, text only.
    Trim,
    /// `ABS(x)`, numeric only.
    Abs,
}

impl Function {
    /// The SQL name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::Lower => "LOWER",
            Self::Upper => "UPPER",
            Self::Length => "LENGTH",
            Self::Trim => "TRIM",
            Self::Abs => "ABS",
        }
    }

    /// Number of arguments. `COUNT` additionally accepts none (`COUNT(*)`).
    #[must_use]
    pub const fn arity(self) -> usize {
        1
    }

    /// Returns true if `arg` is in the accepted argument set.
    #[must_use]
    pub fn accepts(self, arg: TypeTag) -> bool {
        match self {
            Self::Count | Self::Min | Self::Max => true,
            Self::Sum | Self::Avg | Self::Abs => arg.is_numeric(),
            Self::Lower | Self::Upper | Self::Length | Self::Trim => {
                arg.scalar() == ScalarType::Text
            }
        }
    }

    /// The result tag given the (already accepted) argument tag.
    ///
    /// Aggregates other than `COUNT` are optional because they yield NULL
    /// over an empty group.
    #[must_use]
    pub fn result_type(self, arg: Option<TypeTag>) -> TypeTag {
        let arg = arg.unwrap_or(TypeTag::INTEGER);
        match self {
            Self::Count => TypeTag::INTEGER,
            Self::Sum | Self::Min | Self::Max => arg.nullable(),
            Self::Avg => TypeTag::REAL.nullable(),
            Self::Lower | Self::Upper | Self::Trim | Self::Abs => arg,
            Self::Length => TypeTag::INTEGER.nullable_if(arg.is_optional()),
        }
    }
}
