//! INSERT statements.

use std::marker::PhantomData;

use crate::error::BuildError;
use crate::expr::{Expr, Operand};
use crate::render::{SqlWriter, Statement};
use crate::schema::{ColumnRef, TableRef};
use crate::types::check;

use super::{HasValues, NoValues};

/// Conversion into an INSERT column list.
pub trait IntoColumnList {
    /// Returns the columns in order.
    fn into_columns(self) -> Vec<ColumnRef>;
}

impl IntoColumnList for Vec<ColumnRef> {
    fn into_columns(self) -> Vec<ColumnRef> {
        self
    }
}

impl IntoColumnList for &[ColumnRef] {
    fn into_columns(self) -> Vec<ColumnRef> {
        self.to_vec()
    }
}

impl<C: Into<ColumnRef>, const N: usize> IntoColumnList for [C; N] {
    fn into_columns(self) -> Vec<ColumnRef> {
        self.into_iter().map(Into::into).collect()
    }
}

/// Conversion into one VALUES row.
pub trait IntoValueRow {
    /// Returns the row's expressions in order.
    fn into_row(self) -> Vec<Expr>;
}

impl IntoValueRow for Vec<Expr> {
    fn into_row(self) -> Vec<Expr> {
        self
    }
}

macro_rules! impl_tuple_lists {
    ($($idx:tt: $item:ident),+) => {
        impl<$($item: Into<ColumnRef>),+> IntoColumnList for ($($item,)+) {
            fn into_columns(self) -> Vec<ColumnRef> {
                vec![$(self.$idx.into()),+]
            }
        }

        impl<$($item: Operand),+> IntoValueRow for ($($item,)+) {
            fn into_row(self) -> Vec<Expr> {
                vec![$(self.$idx.into_expr()),+]
            }
        }
    };
}

impl_tuple_lists!(0: I0);
impl_tuple_lists!(0: I0, 1: I1);
impl_tuple_lists!(0: I0, 1: I1, 2: I2);
impl_tuple_lists!(0: I0, 1: I1, 2: I2, 3: I3);
impl_tuple_lists!(0: I0, 1: I1, 2: I2, 3: I3, 4: I4);
impl_tuple_lists!(0: I0, 1: I1, 2: I2, 3: I3, 4: I4, 5: I5);
impl_tuple_lists!(0: I0, 1: I1, 2: I2, 3: I3, 4: I4, 5: I5, 6: I6);
impl_tuple_lists!(0: I0, 1: I1, 2: I2, 3: I3, 4: I4, 5: I5, 6: I6, 7: I7);
impl_tuple_lists!(0: I0, 1: I1, 2: I2, 3: I3, 4: I4, 5: I5, 6: I6, 7: I7, 8: I8);
impl_tuple_lists!(0: I0, 1: I1, 2: I2, 3: I3, 4: I4, 5: I5, 6: I6, 7: I7, 8: I8, 9: I9);
impl_tuple_lists!(0: I0, 1: I1, 2: I2, 3: I3, 4: I4, 5: I5, 6: I6, 7: I7, 8: I8, 9: I9, 10: I10);
impl_tuple_lists!(0: I0, 1: I1, 2: I2, 3: I3, 4: I4, 5: I5, 6: I6, 7: I7, 8: I8, 9: I9, 10: I10, 11: I11);

/// An INSERT statement.
///
/// Uses the typestate pattern to ensure that rendering is only available
/// once at least one VALUES row has been added.
#[derive(Debug, Clone)]
pub struct Insert<S = HasValues> {
    table: TableRef,
    columns: Vec<ColumnRef>,
    rows: Vec<Vec<Expr>>,
    _state: PhantomData<S>,
}

/// Starts an INSERT into `table`.
#[must_use]
pub fn insert_into(table: &TableRef) -> Insert<NoValues> {
    Insert {
        table: table.clone(),
        columns: vec![],
        rows: vec![],
        _state: PhantomData,
    }
}

impl Insert<NoValues> {
    /// Sets the column list. Every column must belong to the target table.
    pub fn columns(&self, columns: impl IntoColumnList) -> Result<Self, BuildError> {
        let columns = columns.into_columns();
        for column in &columns {
            if !self.table.owns(column) {
                return Err(BuildError::ForeignColumn {
                    table: self.table.name().to_string(),
                    table_of_column: column.table_name().to_string(),
                    column: column.column_name().to_string(),
                });
            }
        }
        Ok(Self {
            table: self.table.clone(),
            columns,
            rows: vec![],
            _state: PhantomData,
        })
    }
}

impl<S: Clone> Insert<S> {
    /// The target table.
    #[must_use]
    pub fn table(&self) -> &TableRef {
        &self.table
    }

    /// The column list.
    #[must_use]
    pub fn column_list(&self) -> &[ColumnRef] {
        &self.columns
    }

    /// Appends a VALUES row after checking its arity and that each value
    /// fits its column.
    pub fn values(&self, row: impl IntoValueRow) -> Result<Insert<HasValues>, BuildError> {
        if self.columns.is_empty() {
            return Err(BuildError::NoColumns {
                table: self.table.name().to_string(),
            });
        }
        let row = row.into_row();
        if row.len() != self.columns.len() {
            return Err(BuildError::RowArity {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        for (column, value) in self.columns.iter().zip(&row) {
            check::assignment(
                &column.qualified_name(),
                column.type_tag(),
                value.type_tag(),
            )?;
        }
        let mut rows = self.rows.clone();
        rows.push(row);
        Ok(Insert {
            table: self.table.clone(),
            columns: self.columns.clone(),
            rows,
            _state: PhantomData,
        })
    }
}

impl Statement for Insert<HasValues> {
    fn write_to(&self, w: &mut SqlWriter<'_>) {
        w.push("INSERT INTO ");
        w.push(self.table.name());
        w.push(" (");
        w.push_separated(&self.columns, ", ", |w, column| w.push(column.column_name()));
        w.push(") VALUES ");
        w.push_separated(&self.rows, ", ", |w, row| {
            w.push("(");
            w.push_separated(row, ", ", SqlWriter::push_expr);
            w.push(")");
        });
    }
}
