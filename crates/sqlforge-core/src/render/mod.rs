//! Rendering query values into SQL text and parameters.
//!
//! Rendering is a single recursive pass over a query value. It is pure and
//! deterministic: the same value always renders to byte-identical SQL and
//! the same parameter list. Each parameter-bound literal appends exactly one
//! parameter, in the order its placeholder appears in the text. A node that
//! occurs twice in a statement is written, and its parameters bound, twice.
//!
//! # Example
//!
//! ```rust
//! use sqlforge_core::expr::{Column, SqlExpr};
//! use sqlforge_core::query::select;
//! use sqlforge_core::render::Statement;
//! use sqlforge_core::schema::TableRef;
//! use sqlforge_core::types::TypeTag;
//!
//! let users = TableRef::builder("users")
//!     .column("id", TypeTag::INTEGER)
//!     .column("name", TypeTag::TEXT)
//!     .column("age", TypeTag::INTEGER)
//!     .build();
//! let id: Column<i64> = users.typed("id").unwrap();
//! let name: Column<String> = users.typed("name").unwrap();
//! let age: Column<i64> = users.typed("age").unwrap();
//!
//! let rendered = select((&id, &name)).from(&users).where_clause(age.gt(18)).render();
//! assert_eq!(
//!     rendered.sql,
//!     "SELECT users.id, users.name FROM users WHERE (users.age > ?)"
//! );
//! assert_eq!(rendered.text_params(), vec![Some(String::from("18"))]);
//! ```

use std::fmt;

use tracing::trace;

use crate::config::RenderConfig;
use crate::dialect::{Dialect, GenericDialect};
use crate::expr::{Binding, Expr, ExprKind, SqlValue, UnaryOp};
use crate::query::Bound;

/// Rendered SQL text and its ordered parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    /// The SQL text, with placeholders in the dialect's convention.
    pub sql: String,
    /// Parameter values; `params[i]` binds to the i-th placeholder.
    pub params: Vec<SqlValue>,
}

impl Rendered {
    /// Returns each parameter's textual serialization, `None` for NULL.
    #[must_use]
    pub fn text_params(&self) -> Vec<Option<String>> {
        self.params.iter().map(SqlValue::to_param_text).collect()
    }

    /// Splits into `(sql, params)`.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.params)
    }
}

impl From<String> for Rendered {
    /// Wraps parameterless SQL, such as generated DDL.
    fn from(sql: String) -> Self {
        Self {
            sql,
            params: vec![],
        }
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Accumulates SQL text and parameters during a render pass.
pub struct SqlWriter<'d> {
    dialect: &'d dyn Dialect,
    inline: bool,
    sql: String,
    params: Vec<SqlValue>,
}

impl<'d> SqlWriter<'d> {
    /// Creates a writer that binds parameter literals.
    #[must_use]
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            dialect,
            inline: false,
            sql: String::new(),
            params: vec![],
        }
    }

    /// Creates a writer that writes every literal inline.
    #[must_use]
    pub fn inline(dialect: &'d dyn Dialect) -> Self {
        Self {
            inline: true,
            ..Self::new(dialect)
        }
    }

    /// The target dialect.
    #[must_use]
    pub fn dialect(&self) -> &'d dyn Dialect {
        self.dialect
    }

    /// Appends raw SQL text.
    pub fn push(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Appends `items` separated by `separator`.
    pub fn push_separated<T>(
        &mut self,
        items: &[T],
        separator: &str,
        mut write: impl FnMut(&mut Self, &T),
    ) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.push(separator);
            }
            write(self, item);
        }
    }

    /// Appends a value, as a placeholder plus parameter or inline.
    pub fn push_value(&mut self, value: &SqlValue, binding: Binding) {
        if self.inline || binding == Binding::Inline {
            self.sql.push_str(&value.to_sql_inline());
        } else {
            self.params.push(value.clone());
            let placeholder = self.dialect.placeholder(self.params.len());
            self.sql.push_str(&placeholder);
        }
    }

    /// Appends a LIMIT or OFFSET count.
    pub fn push_bound(&mut self, bound: Bound) {
        match bound {
            Bound::Inline(n) => self.sql.push_str(&n.to_string()),
            Bound::Param(n) => {
                self.push_value(&SqlValue::Integer(i64::from(n)), Binding::Parameter);
            }
        }
    }

    /// Appends an expression.
    pub fn push_expr(&mut self, expr: &Expr) {
        match expr.kind() {
            ExprKind::Literal { value, binding } => self.push_value(value, *binding),
            ExprKind::Column(column) => {
                self.push(column.table_name());
                self.push(".");
                self.push(column.column_name());
            }
            ExprKind::Unary { op, operand } => {
                self.push("(");
                match op {
                    UnaryOp::Not => {
                        self.push("NOT ");
                        self.push_expr(operand);
                    }
                    UnaryOp::IsNull => {
                        self.push_expr(operand);
                        self.push(" IS NULL");
                    }
                    UnaryOp::IsNotNull => {
                        self.push_expr(operand);
                        self.push(" IS NOT NULL");
                    }
                }
                self.push(")");
            }
            ExprKind::Binary { op, left, right } => {
                self.push("(");
                self.push_expr(left);
                self.push(" ");
                self.push(op.as_str());
                self.push(" ");
                self.push_expr(right);
                self.push(")");
            }
            ExprKind::InList {
                subject,
                items,
                negated,
            } => {
                self.push("(");
                self.push_expr(subject);
                self.push(if *negated { " NOT IN (" } else { " IN (" });
                self.push_separated(items, ", ", Self::push_expr);
                self.push("))");
            }
            ExprKind::Between {
                subject,
                low,
                high,
                negated,
            } => {
                self.push("(");
                self.push_expr(subject);
                self.push(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                self.push_expr(low);
                self.push(" AND ");
                self.push_expr(high);
                self.push(")");
            }
            ExprKind::Function {
                function,
                args,
                distinct,
            } => {
                self.push(function.name());
                self.push("(");
                if args.is_empty() {
                    self.push("*");
                } else {
                    if *distinct {
                        self.push("DISTINCT ");
                    }
                    self.push_separated(args, ", ", Self::push_expr);
                }
                self.push(")");
            }
            ExprKind::Case {
                branches,
                otherwise,
            } => {
                self.push("CASE");
                for (condition, result) in branches {
                    self.push(" WHEN ");
                    self.push_expr(condition);
                    self.push(" THEN ");
                    self.push_expr(result);
                }
                if let Some(otherwise) = otherwise {
                    self.push(" ELSE ");
                    self.push_expr(otherwise);
                }
                self.push(" END");
            }
        }
    }

    /// Finishes the pass.
    #[must_use]
    pub fn finish(self) -> Rendered {
        Rendered {
            sql: self.sql,
            params: self.params,
        }
    }
}

/// A complete, renderable statement.
pub trait Statement {
    /// Writes the statement into `w`.
    fn write_to(&self, w: &mut SqlWriter<'_>);

    /// Renders with the generic dialect (`?` placeholders).
    fn render(&self) -> Rendered {
        self.render_with(&GenericDialect)
    }

    /// Renders with the given dialect.
    fn render_with(&self, dialect: &dyn Dialect) -> Rendered {
        let mut writer = SqlWriter::new(dialect);
        self.write_to(&mut writer);
        let rendered = writer.finish();
        trace!(
            dialect = dialect.name(),
            sql = %rendered.sql,
            params = rendered.params.len(),
            "rendered statement"
        );
        rendered
    }

    /// Renders with every literal written inline.
    ///
    /// **Warning**: Only use this for scripts whose values are trusted,
    /// such as migrations.
    fn render_inline(&self, dialect: &dyn Dialect) -> String {
        let mut writer = SqlWriter::inline(dialect);
        self.write_to(&mut writer);
        writer.finish().sql
    }
}

/// Renders statements for a configured dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    /// Creates a renderer.
    #[must_use]
    pub const fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// The configured dialect.
    #[must_use]
    pub fn dialect(&self) -> &'static dyn Dialect {
        self.config.dialect.dialect()
    }

    /// Renders a statement.
    #[must_use]
    pub fn render(&self, statement: &dyn Statement) -> Rendered {
        statement.render_with(self.dialect())
    }
}
