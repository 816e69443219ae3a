//! Typed function constructors.
//!
//! Each function's argument bounds and result type follow the
//! [`Function`] catalog.

use crate::types::{Numeric, SqlType, Textual};

use super::typed::{Operand, TypedExpr};
use super::{Expr, ExprKind, Function};

fn call<R: SqlType>(function: Function, args: Vec<Expr>, distinct: bool) -> TypedExpr<R> {
    TypedExpr::from_kind(ExprKind::Function {
        function,
        args,
        distinct,
    })
}

/// `COUNT(x)`.
#[must_use]
pub fn count<V: Operand>(arg: V) -> TypedExpr<i64> {
    call(Function::Count, vec![arg.into_expr()], false)
}

/// `COUNT(DISTINCT x)`.
#[must_use]
pub fn count_distinct<V: Operand>(arg: V) -> TypedExpr<i64> {
    call(Function::Count, vec![arg.into_expr()], true)
}

/// `COUNT(*)`.
#[must_use]
pub fn count_all() -> TypedExpr<i64> {
    call(Function::Count, vec![], false)
}

/// `SUM(x)`, NULL over an empty group.
#[must_use]
pub fn sum<V>(arg: V) -> TypedExpr<<V::Sql as SqlType>::Nullable>
where
    V: Operand,
    V::Sql: Numeric,
{
    call(Function::Sum, vec![arg.into_expr()], false)
}

/// `AVG(x)`, always real.
#[must_use]
pub fn avg<V>(arg: V) -> TypedExpr<Option<f64>>
where
    V: Operand,
    V::Sql: Numeric,
{
    call(Function::Avg, vec![arg.into_expr()], false)
}

/// `MIN(x)`.
#[must_use]
pub fn min<V: Operand>(arg: V) -> TypedExpr<<V::Sql as SqlType>::Nullable> {
    call(Function::Min, vec![arg.into_expr()], false)
}

/// `MAX(x)`.
#[must_use]
pub fn max<V: Operand>(arg: V) -> TypedExpr<<V::Sql as SqlType>::Nullable> {
    call(Function::Max, vec![arg.into_expr()], false)
}

/// `LOWER(x)`.
#[must_use]
pub fn lower<V>(arg: V) -> TypedExpr<V::Sql>
where
    V: Operand,
    V::Sql: Textual,
{
    call(Function::Lower, vec![arg.into_expr()], false)
}

/// `UPPER(x)`.
#[must_use]
pub fn upper<V>(arg: V) -> TypedExpr<V::Sql>
where
    V: Operand,
    V::Sql: Textual,
{
    call(Function::Upper, vec![arg.into_expr()], false)
}

/// `TRIM(x)`.
#[must_use]
pub fn trim<V>(arg: V) -> TypedExpr<V::Sql>
where
    V: Operand,
    V::Sql: Textual,
{
    call(Function::Trim, vec![arg.into_expr()], false)
}

/// `LENGTH(x)`.
#[must_use]
pub fn length<V>(arg: V) -> TypedExpr<<V::Sql as Textual>::Length>
where
    V: Operand,
    V::Sql: Textual,
{
    call(Function::Length, vec![arg.into_expr()], false)
}

/// `ABS(x)`.
#[must_use]
pub fn abs<V>(arg: V) -> TypedExpr<V::Sql>
where
    V: Operand,
    V::Sql: Numeric,
{
    call(Function::Abs, vec![arg.into_expr()], false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Column;
    use crate::types::check;

    fn assert_agrees<R: SqlType>(typed: &TypedExpr<R>) {
        let ExprKind::Function { function, args, .. } = typed.expr().kind() else {
            panic!("not a function call");
        };
        let tags: Vec<_> = args.iter().map(Expr::type_tag).collect();
        assert_eq!(check::function_call(*function, &tags), Ok(typed.expr().type_tag()));
    }

    #[test]
    fn test_typed_functions_agree_with_checker() {
        let age = Column::<i64>::new("users", "age");
        let score = Column::<Option<f64>>::new("users", "score");
        let name = Column::<String>::new("users", "name");
        let email = Column::<Option<String>>::new("users", "email");

        assert_agrees(&count(&name));
        assert_agrees(&count_distinct(&email));
        assert_agrees(&count_all());
        assert_agrees(&sum(&age));
        assert_agrees(&sum(&score));
        assert_agrees(&avg(&age));
        assert_agrees(&min(&name));
        assert_agrees(&max(&score));
        assert_agrees(&lower(&name));
        assert_agrees(&upper(&email));
        assert_agrees(&trim(&name));
        assert_agrees(&length(&email));
        assert_agrees(&abs(&age));
    }
}
