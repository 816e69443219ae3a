//! Query values.
//!
//! [`Select`], [`Insert`], [`Update`] and [`Delete`] are immutable
//! aggregates of a target and a clause set. Every builder method takes
//! `&self` and returns a new value; unchanged expression sub-trees are
//! shared between the old and the new value, so a partially built query can
//! be kept and extended in several directions.
//!
//! The typestate pattern keeps incomplete statements from being rendered:
//! a `Select` needs a FROM, an `Insert` at least one VALUES row and an
//! `Update` at least one assignment before they implement
//! [`Statement`](crate::render::Statement).

mod delete;
mod insert;
mod select;
mod update;

use std::fmt;

pub use delete::{delete_from, Delete};
pub use insert::{insert_into, Insert, IntoColumnList, IntoValueRow};
pub use select::{select, select_all, select_items, IntoProjection, ProjectedColumn, Select};
pub use update::{update, Update};

use crate::expr::{Column, Condition, Expr, TypedExpr};
use crate::schema::{ColumnRef, TableRef};

// Typestate markers (zero-sized types)

/// Marker: no FROM clause specified yet.
#[derive(Debug, Clone, Copy)]
pub struct NoFrom;
/// Marker: FROM clause has been specified.
#[derive(Debug, Clone, Copy)]
pub struct HasFrom;
/// Marker: no VALUES row added yet.
#[derive(Debug, Clone, Copy)]
pub struct NoValues;
/// Marker: at least one VALUES row added.
#[derive(Debug, Clone, Copy)]
pub struct HasValues;
/// Marker: no SET assignment added yet.
#[derive(Debug, Clone, Copy)]
pub struct NoSet;
/// Marker: at least one SET assignment added.
#[derive(Debug, Clone, Copy)]
pub struct HasSet;

/// One entry of a projection list, optionally aliased.
#[derive(Debug, Clone)]
pub struct SelectItem {
    expr: Expr,
    alias: Option<String>,
}

impl SelectItem {
    /// Creates an unaliased item.
    #[must_use]
    pub fn new(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            alias: None,
        }
    }

    pub(crate) fn aliased(expr: Expr, alias: impl Into<String>) -> Self {
        Self {
            expr,
            alias: Some(alias.into()),
        }
    }

    /// The projected expression.
    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// The alias, if any.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The name a result row reports for this item: the alias, else the
    /// column name for a raw column, else nothing.
    #[must_use]
    pub fn output_name(&self) -> Option<&str> {
        self.alias
            .as_deref()
            .or_else(|| self.expr.as_column().map(ColumnRef::column_name))
    }
}

impl From<Expr> for SelectItem {
    fn from(expr: Expr) -> Self {
        Self::new(expr)
    }
}

impl From<&Expr> for SelectItem {
    fn from(expr: &Expr) -> Self {
        Self::new(expr.clone())
    }
}

impl From<ColumnRef> for SelectItem {
    fn from(column: ColumnRef) -> Self {
        Self::new(column)
    }
}

impl From<&ColumnRef> for SelectItem {
    fn from(column: &ColumnRef) -> Self {
        Self::new(column)
    }
}

impl<T> From<Column<T>> for SelectItem {
    fn from(column: Column<T>) -> Self {
        Self::new(column)
    }
}

impl<T> From<&Column<T>> for SelectItem {
    fn from(column: &Column<T>) -> Self {
        Self::new(column)
    }
}

impl<T> From<TypedExpr<T>> for SelectItem {
    fn from(expr: TypedExpr<T>) -> Self {
        Self::new(expr)
    }
}

impl<T> From<&TypedExpr<T>> for SelectItem {
    fn from(expr: &TypedExpr<T>) -> Self {
        Self::new(expr)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl Order {
    /// The SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ORDER BY key.
#[derive(Debug, Clone)]
pub struct OrderBy {
    expr: Expr,
    order: Order,
}

impl OrderBy {
    /// Creates a sort key.
    #[must_use]
    pub fn new(expr: impl Into<Expr>, order: Order) -> Self {
        Self {
            expr: expr.into(),
            order,
        }
    }

    /// The sort expression.
    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// The direction.
    #[must_use]
    pub fn order(&self) -> Order {
        self.order
    }
}

/// The kind of a join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `INNER JOIN`.
    Inner,
    /// `LEFT JOIN`.
    Left,
}

impl JoinKind {
    /// The SQL keywords.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
        }
    }
}

/// One entry of a JOIN list.
#[derive(Debug, Clone)]
pub struct Join {
    table: TableRef,
    on: Condition,
    kind: JoinKind,
}

impl Join {
    /// The joined table.
    #[must_use]
    pub fn table(&self) -> &TableRef {
        &self.table
    }

    /// The join predicate.
    #[must_use]
    pub fn on(&self) -> &Condition {
        &self.on
    }

    /// The join kind.
    #[must_use]
    pub fn kind(&self) -> JoinKind {
        self.kind
    }
}

/// A LIMIT or OFFSET count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Written into the SQL text.
    Inline(u64),
    /// Bound as an integer parameter.
    Param(u32),
}

/// Combines an optional existing predicate with a new one.
fn compose(
    existing: Option<&Condition>,
    next: Condition,
    combine: fn(&Condition, Condition) -> Condition,
) -> Condition {
    match existing {
        Some(current) => combine(current, next),
        None => next,
    }
}

fn and_condition(left: &Condition, right: Condition) -> Condition {
    left.and(right)
}

fn or_condition(left: &Condition, right: Condition) -> Condition {
    left.or(right)
}

/// WHERE clause methods shared by the statements that have one.
macro_rules! impl_where_clause {
    ($ty:ty) => {
        impl $ty {
            /// Sets the WHERE predicate, replacing any previous one.
            #[must_use]
            pub fn where_clause(&self, condition: impl Into<$crate::expr::Condition>) -> Self {
                let mut next = self.clone();
                next.where_clause = Some(condition.into());
                next
            }

            /// ANDs a predicate onto the WHERE clause.
            #[must_use]
            pub fn and_where(&self, condition: impl Into<$crate::expr::Condition>) -> Self {
                let mut next = self.clone();
                next.where_clause = Some($crate::query::compose(
                    self.where_clause.as_ref(),
                    condition.into(),
                    $crate::query::and_condition,
                ));
                next
            }

            /// ORs a predicate onto the WHERE clause.
            #[must_use]
            pub fn or_where(&self, condition: impl Into<$crate::expr::Condition>) -> Self {
                let mut next = self.clone();
                next.where_clause = Some($crate::query::compose(
                    self.where_clause.as_ref(),
                    condition.into(),
                    $crate::query::or_condition,
                ));
                next
            }
        }
    };
}

pub(crate) use impl_where_clause;
