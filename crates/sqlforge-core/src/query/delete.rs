//! DELETE statements.

use crate::expr::Condition;
use crate::render::{SqlWriter, Statement};
use crate::schema::TableRef;

use super::impl_where_clause;

/// A DELETE statement. Without a WHERE clause it deletes every row.
#[derive(Debug, Clone)]
pub struct Delete {
    table: TableRef,
    where_clause: Option<Condition>,
}

/// Starts a DELETE from `table`.
#[must_use]
pub fn delete_from(table: &TableRef) -> Delete {
    Delete {
        table: table.clone(),
        where_clause: None,
    }
}

impl Delete {
    /// The target table.
    #[must_use]
    pub fn table(&self) -> &TableRef {
        &self.table
    }
}

impl_where_clause!(Delete);

impl Statement for Delete {
    fn write_to(&self, w: &mut SqlWriter<'_>) {
        w.push("DELETE FROM ");
        w.push(self.table.name());
        if let Some(condition) = &self.where_clause {
            w.push(" WHERE ");
            w.push_expr(condition.expr());
        }
    }
}
