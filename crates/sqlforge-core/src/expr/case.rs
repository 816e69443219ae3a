//! CASE expressions.

use std::marker::PhantomData;

use crate::error::TypeError;
use crate::types::check;
use crate::types::SqlType;

use super::typed::{Operand, TypedExpr};
use super::{Condition, Expr, ExprKind};

/// Builder for a checked, dynamically typed `CASE` expression.
///
/// ```rust
/// use sqlforge_core::expr::{Case, Condition, Expr};
///
/// let minor = Condition::try_from(Expr::value(1).lt(Expr::value(18)).unwrap()).unwrap();
/// let label = Case::new()
///     .when(minor, Expr::value("minor"))
///     .otherwise(Expr::value("adult"))
///     .end()
///     .unwrap();
/// assert_eq!(label.type_tag().to_string(), "Text");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Case {
    branches: Vec<(Expr, Expr)>,
    otherwise: Option<Expr>,
}

impl Case {
    /// Starts an empty CASE.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `WHEN condition THEN result` branch.
    #[must_use]
    pub fn when(mut self, condition: impl Into<Condition>, result: impl Into<Expr>) -> Self {
        self.branches
            .push((condition.into().into_expr(), result.into()));
        self
    }

    /// Sets the ELSE result.
    #[must_use]
    pub fn otherwise(mut self, result: impl Into<Expr>) -> Self {
        self.otherwise = Some(result.into());
        self
    }

    /// Checks the branch types and builds the node.
    pub fn end(self) -> Result<Expr, TypeError> {
        let results: Vec<_> = self.branches.iter().map(|(_, r)| r.type_tag()).collect();
        let tag = check::case_branches(&results, self.otherwise.as_ref().map(Expr::type_tag))?;
        Ok(Expr::from_kind(
            ExprKind::Case {
                branches: self.branches,
                otherwise: self.otherwise,
            },
            tag,
        ))
    }
}

/// Starts a typed CASE whose branches all produce `T`.
#[must_use]
pub fn case_when<V: Operand>(condition: impl Into<Condition>, result: V) -> TypedCase<V::Sql> {
    TypedCase {
        branches: vec![(condition.into().into_expr(), result.into_expr())],
        _type: PhantomData,
    }
}

/// A typed CASE under construction. See [`case_when`].
#[derive(Debug, Clone)]
pub struct TypedCase<T> {
    branches: Vec<(Expr, Expr)>,
    _type: PhantomData<fn() -> T>,
}

impl<T: SqlType> TypedCase<T> {
    /// Adds a `WHEN condition THEN result` branch.
    #[must_use]
    pub fn when<V: Operand<Sql = T>>(mut self, condition: impl Into<Condition>, result: V) -> Self {
        self.branches
            .push((condition.into().into_expr(), result.into_expr()));
        self
    }

    /// Sets the ELSE result and finishes the expression.
    #[must_use]
    pub fn otherwise<V: Operand<Sql = T>>(self, result: V) -> TypedExpr<T> {
        TypedExpr::from_kind(ExprKind::Case {
            branches: self.branches,
            otherwise: Some(result.into_expr()),
        })
    }

    /// Finishes the expression without ELSE; unmatched rows yield NULL.
    #[must_use]
    pub fn end(self) -> TypedExpr<T::Nullable> {
        TypedExpr::from_kind(ExprKind::Case {
            branches: self.branches,
            otherwise: None,
        })
    }
}
