//! Expression nodes.
//!
//! An [`Expr`] is an immutable, reference-counted tree node that knows its
//! own result [`TypeTag`]. Nodes are only created through constructors that
//! consult the [type checker](crate::types::check) first, so a node with
//! incompatible operands cannot exist. Cloning an `Expr` shares the
//! sub-tree.
//!
//! Two APIs build nodes:
//! - the checked dynamic API on [`Expr`], returning `Result<Expr, TypeError>`;
//! - the typed API ([`Column`], [`TypedExpr`], [`SqlExpr`]), whose trait
//!   bounds reject incompatible combinations at compile time.
//!
//! # Example
//!
//! ```rust
//! use sqlforge_core::expr::{Condition, Expr};
//! use sqlforge_core::schema::TableRef;
//! use sqlforge_core::types::TypeTag;
//!
//! let users = TableRef::builder("users").column("age", TypeTag::INTEGER).build();
//! let age = Expr::column(users.column("age").unwrap());
//!
//! assert!(age.gt(Expr::value(18)).is_ok());
//! assert!(age.gt(Expr::value("18")).is_err());
//!
//! let adult = Condition::try_from(age.gt_eq(Expr::value(18)).unwrap()).unwrap();
//! assert_eq!(adult.expr().type_tag(), TypeTag::BOOLEAN);
//! ```

mod case;
mod function;
pub mod functions;
mod typed;
mod value;

use std::sync::Arc;

pub use case::{case_when, Case, TypedCase};
pub use function::Function;
pub use typed::{Column, Inline, Operand, SqlExpr, TypedExpr};
pub use value::{SqlValue, ToSqlValue};

use crate::error::TypeError;
use crate::query::{Order, OrderBy, SelectItem};
use crate::schema::ColumnRef;
use crate::types::check::{self, OperatorClass};
use crate::types::{ScalarType, TypeTag};

/// How a literal reaches the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Rendered as a placeholder with one entry in the parameter list.
    Parameter,
    /// Rendered directly into the SQL text.
    Inline,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `NOT x`.
    Not,
    /// `x IS NULL`.
    IsNull,
    /// `x IS NOT NULL`.
    IsNotNull,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `=`.
    Eq,
    /// `!=`.
    NotEq,
    /// `<`.
    Lt,
    /// `<=`.
    LtEq,
    /// `>`.
    Gt,
    /// `>=`.
    GtEq,
    /// `LIKE`.
    Like,
    /// `NOT LIKE`.
    NotLike,
    /// `AND`.
    And,
    /// `OR`.
    Or,
    /// `+`.
    Add,
    /// `-`.
    Sub,
    /// `*`.
    Mul,
    /// `/`.
    Div,
}

impl BinaryOp {
    /// The SQL operator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }

    /// The checker rule that governs this operator.
    #[must_use]
    pub const fn class(self) -> OperatorClass {
        match self {
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => {
                OperatorClass::Comparison
            }
            Self::Like | Self::NotLike => OperatorClass::Pattern,
            Self::And | Self::Or => OperatorClass::Logical,
            Self::Add | Self::Sub | Self::Mul | Self::Div => OperatorClass::Arithmetic,
        }
    }
}

/// The variants of an expression node.
#[derive(Debug)]
pub enum ExprKind {
    /// A literal value.
    Literal {
        /// The value.
        value: SqlValue,
        /// Parameter-bound or inline.
        binding: Binding,
    },
    /// A column reference.
    Column(ColumnRef),
    /// A unary operation.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Expr,
    },
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Expr,
        /// Right operand.
        right: Expr,
    },
    /// `subject [NOT] IN (items...)`, never empty.
    InList {
        /// The tested expression.
        subject: Expr,
        /// The candidates, in order.
        items: Vec<Expr>,
        /// NOT IN.
        negated: bool,
    },
    /// `subject [NOT] BETWEEN low AND high`.
    Between {
        /// The tested expression.
        subject: Expr,
        /// Lower bound.
        low: Expr,
        /// Upper bound.
        high: Expr,
        /// NOT BETWEEN.
        negated: bool,
    },
    /// A function call. An empty argument list renders `COUNT(*)`.
    Function {
        /// The function.
        function: Function,
        /// Arguments.
        args: Vec<Expr>,
        /// Whether `DISTINCT` precedes the argument.
        distinct: bool,
    },
    /// `CASE WHEN .. THEN .. [ELSE ..] END`.
    Case {
        /// `(condition, result)` pairs in order.
        branches: Vec<(Expr, Expr)>,
        /// The ELSE result.
        otherwise: Option<Expr>,
    },
}

/// An immutable expression node.
#[derive(Debug, Clone)]
pub struct Expr {
    kind: Arc<ExprKind>,
    tag: TypeTag,
}

impl Expr {
    pub(crate) fn from_kind(kind: ExprKind, tag: TypeTag) -> Self {
        Self {
            kind: Arc::new(kind),
            tag,
        }
    }

    /// Creates a parameter-bound literal.
    #[must_use]
    pub fn value<V: ToSqlValue>(value: V) -> Self {
        Self::from_kind(
            ExprKind::Literal {
                value: value.to_sql_value(),
                binding: Binding::Parameter,
            },
            V::TAG,
        )
    }

    /// Creates an inline literal, rendered directly into the SQL text.
    ///
    /// **Warning**: Only use this for constants that don't come from user
    /// input. Text is quoted and escaped, but binding is still preferred.
    #[must_use]
    pub fn inline<V: ToSqlValue>(value: V) -> Self {
        Self::from_kind(
            ExprKind::Literal {
                value: value.to_sql_value(),
                binding: Binding::Inline,
            },
            V::TAG,
        )
    }

    /// Creates a parameter-bound NULL of the given type.
    #[must_use]
    pub fn null(scalar: ScalarType) -> Self {
        Self::from_kind(
            ExprKind::Literal {
                value: SqlValue::Null,
                binding: Binding::Parameter,
            },
            TypeTag::optional(scalar),
        )
    }

    /// Creates a column reference expression.
    #[must_use]
    pub fn column(column: ColumnRef) -> Self {
        let tag = column.type_tag();
        Self::from_kind(ExprKind::Column(column), tag)
    }

    /// The always-true predicate `(1 = 1)`, rendered inline.
    #[must_use]
    pub fn always_true() -> Self {
        Self::constant_predicate(1)
    }

    /// The always-false predicate `(1 = 0)`, rendered inline.
    #[must_use]
    pub fn always_false() -> Self {
        Self::constant_predicate(0)
    }

    fn constant_predicate(rhs: i64) -> Self {
        Self::from_kind(
            ExprKind::Binary {
                op: BinaryOp::Eq,
                left: Self::inline(1_i64),
                right: Self::inline(rhs),
            },
            TypeTag::BOOLEAN,
        )
    }

    /// The result type of this node.
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        self.tag
    }

    /// The node's variant.
    #[must_use]
    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// Returns the column if this node is a raw column reference.
    #[must_use]
    pub fn as_column(&self) -> Option<&ColumnRef> {
        match self.kind() {
            ExprKind::Column(c) => Some(c),
            _ => None,
        }
    }

    /// Returns true if both handles point at the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.kind, &other.kind)
    }

    /// Combines two expressions with a binary operator after checking the
    /// operator's type rule.
    pub fn binary(&self, op: BinaryOp, rhs: impl Into<Self>) -> Result<Self, TypeError> {
        let rhs = rhs.into();
        if op.class() == OperatorClass::Logical {
            self.check_logical_operand(op.as_str())?;
            rhs.check_logical_operand(op.as_str())?;
        }
        let tag = check::binary(op.class(), self.tag, rhs.tag)?;
        Ok(Self::from_kind(
            ExprKind::Binary {
                op,
                left: self.clone(),
                right: rhs,
            },
            tag,
        ))
    }

    fn check_logical_operand(&self, operator: &'static str) -> Result<(), TypeError> {
        check::logical_operand(
            operator,
            self.tag,
            self.as_column().map(ColumnRef::qualified_name),
        )
    }

    /// Creates an equality expression.
    pub fn eq(&self, rhs: impl Into<Self>) -> Result<Self, TypeError> {
        self.binary(BinaryOp::Eq, rhs)
    }

    /// Creates an inequality expression.
    pub fn not_eq(&self, rhs: impl Into<Self>) -> Result<Self, TypeError> {
        self.binary(BinaryOp::NotEq, rhs)
    }

    /// Creates a less-than expression.
    pub fn lt(&self, rhs: impl Into<Self>) -> Result<Self, TypeError> {
        self.binary(BinaryOp::Lt, rhs)
    }

    /// Creates a less-than-or-equal expression.
    pub fn lt_eq(&self, rhs: impl Into<Self>) -> Result<Self, TypeError> {
        self.binary(BinaryOp::LtEq, rhs)
    }

    /// Creates a greater-than expression.
    pub fn gt(&self, rhs: impl Into<Self>) -> Result<Self, TypeError> {
        self.binary(BinaryOp::Gt, rhs)
    }

    /// Creates a greater-than-or-equal expression.
    pub fn gt_eq(&self, rhs: impl Into<Self>) -> Result<Self, TypeError> {
        self.binary(BinaryOp::GtEq, rhs)
    }

    /// Creates a LIKE expression. The pattern is always parameter-bound.
    pub fn like(&self, pattern: impl Into<String>) -> Result<Self, TypeError> {
        self.binary(BinaryOp::Like, Self::value(pattern.into()))
    }

    /// Creates a NOT LIKE expression. The pattern is always parameter-bound.
    pub fn not_like(&self, pattern: impl Into<String>) -> Result<Self, TypeError> {
        self.binary(BinaryOp::NotLike, Self::value(pattern.into()))
    }

    /// Creates an AND expression.
    pub fn and(&self, rhs: impl Into<Self>) -> Result<Self, TypeError> {
        self.binary(BinaryOp::And, rhs)
    }

    /// Creates an OR expression.
    pub fn or(&self, rhs: impl Into<Self>) -> Result<Self, TypeError> {
        self.binary(BinaryOp::Or, rhs)
    }

    /// Negates a boolean expression with NOT.
    #[allow(clippy::should_implement_trait)]
    pub fn not(&self) -> Result<Self, TypeError> {
        self.check_logical_operand("NOT")?;
        Ok(Self::unary(UnaryOp::Not, self.clone()))
    }

    /// Creates an addition.
    #[allow(clippy::should_implement_trait)]
    pub fn add(&self, rhs: impl Into<Self>) -> Result<Self, TypeError> {
        self.binary(BinaryOp::Add, rhs)
    }

    /// Creates a subtraction.
    #[allow(clippy::should_implement_trait)]
    pub fn sub(&self, rhs: impl Into<Self>) -> Result<Self, TypeError> {
        self.binary(BinaryOp::Sub, rhs)
    }

    /// Creates a multiplication.
    #[allow(clippy::should_implement_trait)]
    pub fn mul(&self, rhs: impl Into<Self>) -> Result<Self, TypeError> {
        self.binary(BinaryOp::Mul, rhs)
    }

    /// Creates a division.
    #[allow(clippy::should_implement_trait)]
    pub fn div(&self, rhs: impl Into<Self>) -> Result<Self, TypeError> {
        self.binary(BinaryOp::Div, rhs)
    }

    /// Creates an IS NULL expression. Valid for every type.
    #[must_use]
    pub fn is_null(&self) -> Self {
        Self::unary(UnaryOp::IsNull, self.clone())
    }

    /// Creates an IS NOT NULL expression. Valid for every type.
    #[must_use]
    pub fn is_not_null(&self) -> Self {
        Self::unary(UnaryOp::IsNotNull, self.clone())
    }

    pub(crate) fn unary(op: UnaryOp, operand: Self) -> Self {
        Self::from_kind(ExprKind::Unary { op, operand }, TypeTag::BOOLEAN)
    }

    /// Creates an IN expression. Each item must be comparable with `self`.
    ///
    /// An empty list yields the always-false predicate.
    pub fn is_in(&self, items: impl IntoIterator<Item = Self>) -> Result<Self, TypeError> {
        self.in_list(items.into_iter().collect(), false)
    }

    /// Creates a NOT IN expression.
    ///
    /// An empty list yields the always-true predicate.
    pub fn not_in(&self, items: impl IntoIterator<Item = Self>) -> Result<Self, TypeError> {
        self.in_list(items.into_iter().collect(), true)
    }

    fn in_list(&self, items: Vec<Self>, negated: bool) -> Result<Self, TypeError> {
        for item in &items {
            check::comparison(self.tag, item.tag)?;
        }
        Ok(Self::in_list_unchecked(self.clone(), items, negated))
    }

    pub(crate) fn in_list_unchecked(subject: Self, items: Vec<Self>, negated: bool) -> Self {
        if items.is_empty() {
            return if negated {
                Self::always_true()
            } else {
                Self::always_false()
            };
        }
        Self::from_kind(
            ExprKind::InList {
                subject,
                items,
                negated,
            },
            TypeTag::BOOLEAN,
        )
    }

    /// Creates a BETWEEN expression.
    pub fn between(&self, low: impl Into<Self>, high: impl Into<Self>) -> Result<Self, TypeError> {
        self.between_impl(low.into(), high.into(), false)
    }

    /// Creates a NOT BETWEEN expression.
    pub fn not_between(
        &self,
        low: impl Into<Self>,
        high: impl Into<Self>,
    ) -> Result<Self, TypeError> {
        self.between_impl(low.into(), high.into(), true)
    }

    fn between_impl(&self, low: Self, high: Self, negated: bool) -> Result<Self, TypeError> {
        check::comparison(self.tag, low.tag)?;
        check::comparison(self.tag, high.tag)?;
        Ok(Self::from_kind(
            ExprKind::Between {
                subject: self.clone(),
                low,
                high,
                negated,
            },
            TypeTag::BOOLEAN,
        ))
    }

    /// Calls a function with checked arguments.
    pub fn call(function: Function, args: &[Self]) -> Result<Self, TypeError> {
        Self::call_impl(function, args, false)
    }

    /// Calls a function with `DISTINCT` before its argument, e.g.
    /// `COUNT(DISTINCT x)`.
    pub fn call_distinct(function: Function, args: &[Self]) -> Result<Self, TypeError> {
        Self::call_impl(function, args, true)
    }

    fn call_impl(function: Function, args: &[Self], distinct: bool) -> Result<Self, TypeError> {
        // DISTINCT needs an argument; only plain COUNT may take none.
        if distinct && args.is_empty() {
            return Err(TypeError::Arity {
                function: function.name(),
                expected: function.arity(),
                found: 0,
            });
        }
        let tags: Vec<TypeTag> = args.iter().map(Self::type_tag).collect();
        let tag = check::function_call(function, &tags)?;
        Ok(Self::function_unchecked(function, args.to_vec(), distinct, tag))
    }

    pub(crate) fn function_unchecked(
        function: Function,
        args: Vec<Self>,
        distinct: bool,
        tag: TypeTag,
    ) -> Self {
        Self::from_kind(
            ExprKind::Function {
                function,
                args,
                distinct,
            },
            tag,
        )
    }

    /// `COUNT(*)`.
    #[must_use]
    pub fn count_all() -> Self {
        Self::function_unchecked(Function::Count, vec![], false, TypeTag::INTEGER)
    }

    /// Names this expression in a projection list.
    #[must_use]
    pub fn alias(&self, name: impl Into<String>) -> SelectItem {
        SelectItem::aliased(self.clone(), name)
    }

    /// Ascending sort key.
    #[must_use]
    pub fn asc(&self) -> OrderBy {
        OrderBy::new(self.clone(), Order::Asc)
    }

    /// Descending sort key.
    #[must_use]
    pub fn desc(&self) -> OrderBy {
        OrderBy::new(self.clone(), Order::Desc)
    }
}

impl From<ColumnRef> for Expr {
    fn from(column: ColumnRef) -> Self {
        Self::column(column)
    }
}

impl From<&ColumnRef> for Expr {
    fn from(column: &ColumnRef) -> Self {
        Self::column(column.clone())
    }
}

impl From<&Self> for Expr {
    fn from(expr: &Self) -> Self {
        expr.clone()
    }
}

/// A boolean-result expression usable as a WHERE, HAVING or JOIN predicate.
///
/// Raw column references are not predicates, even boolean ones; compare
/// them explicitly.
#[derive(Debug, Clone)]
pub struct Condition(Expr);

impl Condition {
    /// The underlying expression.
    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.0
    }

    /// Consumes the condition and returns the expression.
    #[must_use]
    pub fn into_expr(self) -> Expr {
        self.0
    }

    /// The always-true predicate.
    #[must_use]
    pub fn always_true() -> Self {
        Self(Expr::always_true())
    }

    /// `(self AND other)`.
    #[must_use]
    pub fn and(&self, other: impl Into<Self>) -> Self {
        self.combine(BinaryOp::And, other.into())
    }

    /// `(self OR other)`.
    #[must_use]
    pub fn or(&self, other: impl Into<Self>) -> Self {
        self.combine(BinaryOp::Or, other.into())
    }

    /// `(NOT self)`.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(&self) -> Self {
        Self(Expr::unary(UnaryOp::Not, self.0.clone()))
    }

    // Both sides are already valid logical operands.
    fn combine(&self, op: BinaryOp, other: Self) -> Self {
        Self(Expr::from_kind(
            ExprKind::Binary {
                op,
                left: self.0.clone(),
                right: other.0,
            },
            TypeTag::BOOLEAN,
        ))
    }
}

impl TryFrom<Expr> for Condition {
    type Error = TypeError;

    fn try_from(expr: Expr) -> Result<Self, Self::Error> {
        expr.check_logical_operand("predicate")?;
        Ok(Self(expr))
    }
}

impl TryFrom<&Expr> for Condition {
    type Error = TypeError;

    fn try_from(expr: &Expr) -> Result<Self, Self::Error> {
        Self::try_from(expr.clone())
    }
}

impl From<&Self> for Condition {
    fn from(condition: &Self) -> Self {
        condition.clone()
    }
}

impl From<Condition> for Expr {
    fn from(condition: Condition) -> Self {
        condition.0
    }
}
