//! Statically typed columns and expressions.
//!
//! [`Column<T>`] and [`TypedExpr<T>`] carry their SQL type as a Rust type
//! parameter. Operator methods are bounded by the marker traits in
//! [`crate::types`], so an incompatible combination is a compile error
//! instead of a runtime [`TypeError`](crate::error::TypeError). Every typed
//! node also carries the same [`TypeTag`](crate::types::TypeTag) the checker
//! would have computed, so both layers agree.

use std::borrow::Cow;
use std::marker::PhantomData;
use std::ops::{Add, BitAnd, BitOr, Div, Mul, Not, Sub};

use crate::query::{Order, OrderBy, SelectItem};
use crate::schema::ColumnRef;
use crate::types::{Arithmetic, BooleanType, Comparable, Scalar, SqlType, Textual};

use super::{BinaryOp, Condition, Expr, ExprKind, ToSqlValue, UnaryOp};

/// A column whose SQL type is `T`.
#[derive(Debug, Clone)]
pub struct Column<T> {
    column: ColumnRef,
    _type: PhantomData<fn() -> T>,
}

impl<T: SqlType> Column<T> {
    /// Declares a typed column.
    #[must_use]
    pub fn new(table: impl Into<Cow<'static, str>>, name: impl Into<Cow<'static, str>>) -> Self {
        Self::from_ref_unchecked(ColumnRef::new(table, name, T::TAG))
    }

    pub(crate) fn from_ref_unchecked(column: ColumnRef) -> Self {
        Self {
            column,
            _type: PhantomData,
        }
    }

    /// The untyped column reference.
    #[must_use]
    pub fn column_ref(&self) -> &ColumnRef {
        &self.column
    }

    /// The column name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.column.column_name()
    }
}

/// An expression whose SQL type is `T`.
#[derive(Debug, Clone)]
pub struct TypedExpr<T> {
    expr: Expr,
    _type: PhantomData<fn() -> T>,
}

impl<T: SqlType> TypedExpr<T> {
    pub(crate) fn from_kind(kind: ExprKind) -> Self {
        Self::from_expr_unchecked(Expr::from_kind(kind, T::TAG))
    }

    pub(crate) fn from_expr_unchecked(expr: Expr) -> Self {
        debug_assert_eq!(expr.type_tag(), T::TAG);
        Self {
            expr,
            _type: PhantomData,
        }
    }

    /// The untyped node.
    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Consumes the wrapper and returns the untyped node.
    #[must_use]
    pub fn into_expr(self) -> Expr {
        self.expr
    }
}

impl<B: BooleanType> TypedExpr<B> {
    /// `(self AND rhs)`.
    #[must_use]
    pub fn and(&self, rhs: impl Into<Condition>) -> TypedExpr<bool> {
        logical(BinaryOp::And, self.expr.clone(), rhs.into().into_expr())
    }

    /// `(self OR rhs)`.
    #[must_use]
    pub fn or(&self, rhs: impl Into<Condition>) -> TypedExpr<bool> {
        logical(BinaryOp::Or, self.expr.clone(), rhs.into().into_expr())
    }

    /// `(NOT self)`.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(&self) -> TypedExpr<bool> {
        TypedExpr::from_expr_unchecked(Expr::unary(UnaryOp::Not, self.expr.clone()))
    }
}

fn logical(op: BinaryOp, left: Expr, right: Expr) -> TypedExpr<bool> {
    TypedExpr::from_kind(ExprKind::Binary { op, left, right })
}

impl<B: BooleanType> From<TypedExpr<B>> for Condition {
    fn from(expr: TypedExpr<B>) -> Self {
        Self(expr.expr)
    }
}

impl<B: BooleanType> From<&TypedExpr<B>> for Condition {
    fn from(expr: &TypedExpr<B>) -> Self {
        Self(expr.expr.clone())
    }
}

impl<T> From<TypedExpr<T>> for Expr {
    fn from(expr: TypedExpr<T>) -> Self {
        expr.expr
    }
}

impl<T> From<&TypedExpr<T>> for Expr {
    fn from(expr: &TypedExpr<T>) -> Self {
        expr.expr.clone()
    }
}

impl<T> From<Column<T>> for Expr {
    fn from(column: Column<T>) -> Self {
        Self::column(column.column)
    }
}

impl<T> From<&Column<T>> for Expr {
    fn from(column: &Column<T>) -> Self {
        Self::column(column.column.clone())
    }
}

impl<T> From<Column<T>> for ColumnRef {
    fn from(column: Column<T>) -> Self {
        column.column
    }
}

impl<T> From<&Column<T>> for ColumnRef {
    fn from(column: &Column<T>) -> Self {
        column.column.clone()
    }
}

/// Anything that can stand on the right-hand side of a typed operator:
/// Rust values (bound as parameters), [`Inline`] values, typed columns and
/// typed expressions.
pub trait Operand {
    /// The SQL type of the operand.
    type Sql: SqlType;

    /// Converts the operand into an expression node.
    fn into_expr(self) -> Expr;
}

macro_rules! impl_value_operand {
    ($($ty:ty => $sql:ty),+ $(,)?) => {
        $(
            impl Operand for $ty {
                type Sql = $sql;

                fn into_expr(self) -> Expr {
                    Expr::value(self)
                }
            }
        )+
    };
}

impl_value_operand!(
    i64 => i64,
    i32 => i64,
    i16 => i64,
    u32 => i64,
    u16 => i64,
    f64 => f64,
    f32 => f64,
    bool => bool,
    String => String,
    &str => String,
    &String => String,
);

impl<V> Operand for Option<V>
where
    V: Operand + ToSqlValue,
    V::Sql: Scalar,
{
    type Sql = Option<V::Sql>;

    fn into_expr(self) -> Expr {
        Expr::value(self)
    }
}

/// A value rendered directly into the SQL text instead of being bound.
///
/// **Warning**: Only use this for constants that don't come from user input.
#[derive(Debug, Clone, Copy)]
pub struct Inline<V>(pub V);

impl<V: Operand + ToSqlValue> Operand for Inline<V> {
    type Sql = V::Sql;

    fn into_expr(self) -> Expr {
        Expr::inline(self.0)
    }
}

impl<T: SqlType> Operand for Column<T> {
    type Sql = T;

    fn into_expr(self) -> Expr {
        Expr::from(self)
    }
}

impl<T: SqlType> Operand for &Column<T> {
    type Sql = T;

    fn into_expr(self) -> Expr {
        Expr::from(self)
    }
}

impl<T: SqlType> Operand for TypedExpr<T> {
    type Sql = T;

    fn into_expr(self) -> Expr {
        self.expr
    }
}

impl<T: SqlType> Operand for &TypedExpr<T> {
    type Sql = T;

    fn into_expr(self) -> Expr {
        self.expr.clone()
    }
}

fn predicate(op: BinaryOp, left: Expr, right: Expr) -> TypedExpr<bool> {
    TypedExpr::from_kind(ExprKind::Binary { op, left, right })
}

/// Operator methods shared by [`Column<T>`] and [`TypedExpr<T>`].
pub trait SqlExpr<T: SqlType> {
    /// Returns the untyped node.
    fn to_expr(&self) -> Expr;

    /// `self = rhs`.
    fn eq<V: Operand>(&self, rhs: V) -> TypedExpr<bool>
    where
        T: Comparable<V::Sql>,
    {
        predicate(BinaryOp::Eq, self.to_expr(), rhs.into_expr())
    }

    /// `self != rhs`.
    fn not_eq<V: Operand>(&self, rhs: V) -> TypedExpr<bool>
    where
        T: Comparable<V::Sql>,
    {
        predicate(BinaryOp::NotEq, self.to_expr(), rhs.into_expr())
    }

    /// `self < rhs`.
    fn lt<V: Operand>(&self, rhs: V) -> TypedExpr<bool>
    where
        T: Comparable<V::Sql>,
    {
        predicate(BinaryOp::Lt, self.to_expr(), rhs.into_expr())
    }

    /// `self <= rhs`.
    fn lt_eq<V: Operand>(&self, rhs: V) -> TypedExpr<bool>
    where
        T: Comparable<V::Sql>,
    {
        predicate(BinaryOp::LtEq, self.to_expr(), rhs.into_expr())
    }

    /// `self > rhs`.
    fn gt<V: Operand>(&self, rhs: V) -> TypedExpr<bool>
    where
        T: Comparable<V::Sql>,
    {
        predicate(BinaryOp::Gt, self.to_expr(), rhs.into_expr())
    }

    /// `self >= rhs`.
    fn gt_eq<V: Operand>(&self, rhs: V) -> TypedExpr<bool>
    where
        T: Comparable<V::Sql>,
    {
        predicate(BinaryOp::GtEq, self.to_expr(), rhs.into_expr())
    }

    /// `self LIKE pattern`, with the pattern bound as a parameter.
    fn like(&self, pattern: impl Into<String>) -> TypedExpr<bool>
    where
        T: Textual,
    {
        predicate(BinaryOp::Like, self.to_expr(), Expr::value(pattern.into()))
    }

    /// `self NOT LIKE pattern`.
    fn not_like(&self, pattern: impl Into<String>) -> TypedExpr<bool>
    where
        T: Textual,
    {
        predicate(BinaryOp::NotLike, self.to_expr(), Expr::value(pattern.into()))
    }

    /// `self IS NULL`.
    fn is_null(&self) -> TypedExpr<bool> {
        TypedExpr::from_expr_unchecked(self.to_expr().is_null())
    }

    /// `self IS NOT NULL`.
    fn is_not_null(&self) -> TypedExpr<bool> {
        TypedExpr::from_expr_unchecked(self.to_expr().is_not_null())
    }

    /// `self IN (items...)`. An empty list is always false.
    fn is_in<V, I>(&self, items: I) -> TypedExpr<bool>
    where
        V: Operand,
        I: IntoIterator<Item = V>,
        T: Comparable<V::Sql>,
    {
        let items = items.into_iter().map(Operand::into_expr).collect();
        TypedExpr::from_expr_unchecked(Expr::in_list_unchecked(self.to_expr(), items, false))
    }

    /// `self NOT IN (items...)`. An empty list is always true.
    fn not_in<V, I>(&self, items: I) -> TypedExpr<bool>
    where
        V: Operand,
        I: IntoIterator<Item = V>,
        T: Comparable<V::Sql>,
    {
        let items = items.into_iter().map(Operand::into_expr).collect();
        TypedExpr::from_expr_unchecked(Expr::in_list_unchecked(self.to_expr(), items, true))
    }

    /// `self BETWEEN low AND high`.
    fn between<L: Operand, H: Operand>(&self, low: L, high: H) -> TypedExpr<bool>
    where
        T: Comparable<L::Sql> + Comparable<H::Sql>,
    {
        TypedExpr::from_kind(ExprKind::Between {
            subject: self.to_expr(),
            low: low.into_expr(),
            high: high.into_expr(),
            negated: false,
        })
    }

    /// `self NOT BETWEEN low AND high`.
    fn not_between<L: Operand, H: Operand>(&self, low: L, high: H) -> TypedExpr<bool>
    where
        T: Comparable<L::Sql> + Comparable<H::Sql>,
    {
        TypedExpr::from_kind(ExprKind::Between {
            subject: self.to_expr(),
            low: low.into_expr(),
            high: high.into_expr(),
            negated: true,
        })
    }

    /// `self + rhs`.
    fn plus<V: Operand>(&self, rhs: V) -> TypedExpr<<T as Arithmetic<V::Sql>>::Output>
    where
        T: Arithmetic<V::Sql>,
    {
        arithmetic(BinaryOp::Add, self.to_expr(), rhs.into_expr())
    }

    /// `self - rhs`.
    fn minus<V: Operand>(&self, rhs: V) -> TypedExpr<<T as Arithmetic<V::Sql>>::Output>
    where
        T: Arithmetic<V::Sql>,
    {
        arithmetic(BinaryOp::Sub, self.to_expr(), rhs.into_expr())
    }

    /// `self * rhs`.
    fn times<V: Operand>(&self, rhs: V) -> TypedExpr<<T as Arithmetic<V::Sql>>::Output>
    where
        T: Arithmetic<V::Sql>,
    {
        arithmetic(BinaryOp::Mul, self.to_expr(), rhs.into_expr())
    }

    /// `self / rhs`.
    fn divided_by<V: Operand>(&self, rhs: V) -> TypedExpr<<T as Arithmetic<V::Sql>>::Output>
    where
        T: Arithmetic<V::Sql>,
    {
        arithmetic(BinaryOp::Div, self.to_expr(), rhs.into_expr())
    }

    /// Names this expression in a projection list.
    fn alias(&self, name: impl Into<String>) -> SelectItem {
        SelectItem::aliased(self.to_expr(), name)
    }

    /// Ascending sort key.
    fn asc(&self) -> OrderBy {
        OrderBy::new(self.to_expr(), Order::Asc)
    }

    /// Descending sort key.
    fn desc(&self) -> OrderBy {
        OrderBy::new(self.to_expr(), Order::Desc)
    }
}

fn arithmetic<O: SqlType>(op: BinaryOp, left: Expr, right: Expr) -> TypedExpr<O> {
    TypedExpr::from_kind(ExprKind::Binary { op, left, right })
}

impl<T: SqlType> SqlExpr<T> for Column<T> {
    fn to_expr(&self) -> Expr {
        Expr::column(self.column.clone())
    }
}

impl<T: SqlType> SqlExpr<T> for TypedExpr<T> {
    fn to_expr(&self) -> Expr {
        self.expr.clone()
    }
}

macro_rules! impl_arithmetic_ops {
    ($($wrapper:ident),+) => {
        $(
            impl_arithmetic_ops!(@op $wrapper, Add, add, plus);
            impl_arithmetic_ops!(@op $wrapper, Sub, sub, minus);
            impl_arithmetic_ops!(@op $wrapper, Mul, mul, times);
            impl_arithmetic_ops!(@op $wrapper, Div, div, divided_by);
        )+
    };
    (@op $wrapper:ident, $trait:ident, $method:ident, $typed:ident) => {
        impl<T, V> $trait<V> for $wrapper<T>
        where
            T: Arithmetic<V::Sql>,
            V: Operand,
        {
            type Output = TypedExpr<<T as Arithmetic<V::Sql>>::Output>;

            fn $method(self, rhs: V) -> Self::Output {
                SqlExpr::$typed(&self, rhs)
            }
        }
    };
}

impl_arithmetic_ops!(Column, TypedExpr);

impl<B: BooleanType> Not for TypedExpr<B> {
    type Output = TypedExpr<bool>;

    fn not(self) -> Self::Output {
        TypedExpr::from_expr_unchecked(Expr::unary(UnaryOp::Not, self.expr))
    }
}

impl<B: BooleanType, R: Into<Condition>> BitAnd<R> for TypedExpr<B> {
    type Output = TypedExpr<bool>;

    fn bitand(self, rhs: R) -> Self::Output {
        logical(BinaryOp::And, self.expr, rhs.into().into_expr())
    }
}

impl<B: BooleanType, R: Into<Condition>> BitOr<R> for TypedExpr<B> {
    type Output = TypedExpr<bool>;

    fn bitor(self, rhs: R) -> Self::Output {
        logical(BinaryOp::Or, self.expr, rhs.into().into_expr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Binding;
    use crate::types::{ScalarType, TypeTag};

    fn age() -> Column<i64> {
        Column::new("users", "age")
    }

    fn score() -> Column<f64> {
        Column::new("users", "score")
    }

    fn email() -> Column<Option<String>> {
        Column::new("users", "email")
    }

    #[test]
    fn test_typed_column_tag() {
        assert_eq!(age().column_ref().type_tag(), TypeTag::INTEGER);
        assert_eq!(
            email().column_ref().type_tag(),
            TypeTag::optional(ScalarType::Text)
        );
    }

    #[test]
    fn test_typed_comparison_matches_checker() {
        let typed = age().gt(18);
        let dynamic = Expr::from(age()).gt(Expr::value(18)).unwrap();
        assert_eq!(typed.expr().type_tag(), dynamic.type_tag());
    }

    #[test]
    fn test_typed_arithmetic_widens() {
        let sum = age().plus(score());
        assert_eq!(sum.expr().type_tag(), TypeTag::REAL);
        let doubled = age() * 2_i64;
        assert_eq!(doubled.expr().type_tag(), TypeTag::INTEGER);
    }

    #[test]
    fn test_typed_optional_comparison() {
        let cond = email().eq("a@example.com");
        assert_eq!(cond.expr().type_tag(), TypeTag::BOOLEAN);
        let by_option = email().eq(Some("a@example.com"));
        assert_eq!(by_option.expr().type_tag(), TypeTag::BOOLEAN);
    }

    #[test]
    fn test_boolean_combinators() {
        let cond = age().gt(18) & email().is_not_null();
        assert!(matches!(
            cond.expr().kind(),
            ExprKind::Binary {
                op: BinaryOp::And,
                ..
            }
        ));
        let negated = !cond;
        assert!(matches!(
            negated.expr().kind(),
            ExprKind::Unary {
                op: UnaryOp::Not,
                ..
            }
        ));
    }

    #[test]
    fn test_inline_operand() {
        let cond = age().gt(Inline(21));
        match cond.expr().kind() {
            ExprKind::Binary { right, .. } => assert!(matches!(
                right.kind(),
                ExprKind::Literal {
                    binding: Binding::Inline,
                    ..
                }
            )),
            other => panic!("unexpected node {other:?}"),
        }
    }
}
