//! UPDATE statements.

use std::marker::PhantomData;

use crate::error::BuildError;
use crate::expr::{Column, Condition, Expr, Operand};
use crate::render::{SqlWriter, Statement};
use crate::schema::{ColumnRef, TableRef};
use crate::types::{check, Assignable};

use super::{impl_where_clause, HasSet, NoSet};

/// An UPDATE statement.
///
/// Uses the typestate pattern to ensure that rendering is only available
/// once at least one SET assignment exists. Without a WHERE clause the
/// statement updates every row.
#[derive(Debug, Clone)]
pub struct Update<S = HasSet> {
    table: TableRef,
    assignments: Vec<(ColumnRef, Expr)>,
    where_clause: Option<Condition>,
    _state: PhantomData<S>,
}

/// Starts an UPDATE of `table`.
#[must_use]
pub fn update(table: &TableRef) -> Update<NoSet> {
    Update {
        table: table.clone(),
        assignments: vec![],
        where_clause: None,
        _state: PhantomData,
    }
}

impl<S: Clone> Update<S> {
    /// The target table.
    #[must_use]
    pub fn table(&self) -> &TableRef {
        &self.table
    }

    /// Adds `column = value`. The value type is checked statically.
    pub fn set<T, V>(&self, column: &Column<T>, value: V) -> Result<Update<HasSet>, BuildError>
    where
        V: Operand,
        T: Assignable<V::Sql>,
    {
        self.set_expr(column.column_ref(), value.into_expr())
    }

    /// Adds `column = value` after checking that the value fits the column.
    ///
    /// Setting the same column again replaces its earlier assignment.
    pub fn set_expr(
        &self,
        column: &ColumnRef,
        value: impl Into<Expr>,
    ) -> Result<Update<HasSet>, BuildError> {
        let value = value.into();
        if !self.table.owns(column) {
            return Err(BuildError::ForeignColumn {
                table: self.table.name().to_string(),
                table_of_column: column.table_name().to_string(),
                column: column.column_name().to_string(),
            });
        }
        check::assignment(&column.qualified_name(), column.type_tag(), value.type_tag())?;

        let mut assignments = self.assignments.clone();
        match assignments.iter_mut().find(|(c, _)| c.same_column(column)) {
            Some(slot) => slot.1 = value,
            None => assignments.push((column.clone(), value)),
        }
        Ok(Update {
            table: self.table.clone(),
            assignments,
            where_clause: self.where_clause.clone(),
            _state: PhantomData,
        })
    }
}

impl_where_clause!(Update<HasSet>);

impl Statement for Update<HasSet> {
    fn write_to(&self, w: &mut SqlWriter<'_>) {
        w.push("UPDATE ");
        w.push(self.table.name());
        w.push(" SET ");
        w.push_separated(&self.assignments, ", ", |w, (column, value)| {
            w.push(column.column_name());
            w.push(" = ");
            w.push_expr(value);
        });
        if let Some(condition) = &self.where_clause {
            w.push(" WHERE ");
            w.push_expr(condition.expr());
        }
    }
}
