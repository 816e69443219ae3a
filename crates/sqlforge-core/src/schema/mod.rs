//! Table and column references.
//!
//! These are the metadata handles produced by schema declaration, either
//! by `#[derive(Table)]` or at runtime through [`TableRef::builder`]. They
//! are immutable once built and cheap to clone; the engine only ever reads
//! them. Identifiers are trusted as SQL-safe and rendered verbatim.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::expr::Column;
use crate::types::{SqlType, TypeTag};

/// Trait for table metadata.
///
/// Implemented by the `{Struct}Table` types generated from `#[derive(Table)]`.
pub trait Table {
    /// The SQL table name.
    const NAME: &'static str;

    /// List of all column names, in declaration order.
    const COLUMNS: &'static [&'static str];

    /// The primary key column name, if any.
    const PRIMARY_KEY: Option<&'static str>;

    /// Returns the runtime reference for this table.
    fn table_ref() -> TableRef;
}

#[derive(Debug)]
struct ColumnMeta {
    table_name: Cow<'static, str>,
    column_name: Cow<'static, str>,
    type_tag: TypeTag,
}

/// A reference to one declared column.
#[derive(Debug, Clone)]
pub struct ColumnRef {
    meta: Arc<ColumnMeta>,
}

impl ColumnRef {
    /// Creates a column reference.
    #[must_use]
    pub fn new(
        table_name: impl Into<Cow<'static, str>>,
        column_name: impl Into<Cow<'static, str>>,
        type_tag: TypeTag,
    ) -> Self {
        Self {
            meta: Arc::new(ColumnMeta {
                table_name: table_name.into(),
                column_name: column_name.into(),
                type_tag,
            }),
        }
    }

    /// The owning table's name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.meta.table_name
    }

    /// The column name.
    #[must_use]
    pub fn column_name(&self) -> &str {
        &self.meta.column_name
    }

    /// The declared value type.
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        self.meta.type_tag
    }

    /// Whether the column accepts NULL.
    #[must_use]
    pub fn nullable(&self) -> bool {
        self.meta.type_tag.is_optional()
    }

    /// Returns the `table.column` form used in expressions.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table_name(), self.column_name())
    }

    /// Returns true if both references point at the same declared column.
    #[must_use]
    pub fn same_column(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.meta, &other.meta)
            || (self.table_name() == other.table_name()
                && self.column_name() == other.column_name())
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table_name(), self.column_name())
    }
}

impl From<&ColumnRef> for ColumnRef {
    fn from(column: &ColumnRef) -> Self {
        column.clone()
    }
}

#[derive(Debug)]
struct TableMeta {
    name: Cow<'static, str>,
    columns: Vec<ColumnRef>,
    primary_key: Option<Cow<'static, str>>,
}

/// A reference to one declared table and its columns.
#[derive(Debug, Clone)]
pub struct TableRef {
    meta: Arc<TableMeta>,
}

impl TableRef {
    /// Starts declaring a table.
    #[must_use]
    pub fn builder(name: impl Into<Cow<'static, str>>) -> TableRefBuilder {
        TableRefBuilder {
            name: name.into(),
            columns: Vec::new(),
            primary_key: None,
        }
    }

    /// The SQL table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// All declared columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnRef] {
        &self.meta.columns
    }

    /// The primary key column name, if declared.
    #[must_use]
    pub fn primary_key(&self) -> Option<&str> {
        self.meta.primary_key.as_deref()
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<ColumnRef> {
        self.meta
            .columns
            .iter()
            .find(|c| c.column_name() == name)
            .cloned()
    }

    /// Looks up a column and returns it as a typed column if its declared
    /// tag is exactly `T`'s.
    #[must_use]
    pub fn typed<T: SqlType>(&self, name: &str) -> Option<Column<T>> {
        self.column(name)
            .filter(|c| c.type_tag() == T::TAG)
            .map(Column::from_ref_unchecked)
    }

    /// Returns true if `column` is one of this table's declared columns,
    /// with the declared type tag.
    #[must_use]
    pub fn owns(&self, column: &ColumnRef) -> bool {
        column.table_name() == self.name()
            && self
                .meta
                .columns
                .iter()
                .any(|c| c.column_name() == column.column_name() && c.type_tag() == column.type_tag())
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Builder returned by [`TableRef::builder`].
#[derive(Debug)]
pub struct TableRefBuilder {
    name: Cow<'static, str>,
    columns: Vec<ColumnRef>,
    primary_key: Option<Cow<'static, str>>,
}

impl TableRefBuilder {
    /// Declares a column.
    #[must_use]
    pub fn column(mut self, name: impl Into<Cow<'static, str>>, type_tag: TypeTag) -> Self {
        self.columns
            .push(ColumnRef::new(self.name.clone(), name, type_tag));
        self
    }

    /// Marks a column as the primary key.
    #[must_use]
    pub fn primary_key(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.primary_key = Some(name.into());
        self
    }

    /// Finishes the declaration.
    #[must_use]
    pub fn build(self) -> TableRef {
        TableRef {
            meta: Arc::new(TableMeta {
                name: self.name,
                columns: self.columns,
                primary_key: self.primary_key,
            }),
        }
    }
}
