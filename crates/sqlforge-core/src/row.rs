//! Execution-layer interface and raw row access.
//!
//! The engine does not talk to a database. An [`Executor`] takes a
//! [`Rendered`] statement and returns [`RawRows`]: column names plus rows
//! of raw text cells. [`Row::get`] resolves a column by position or by
//! name and parses the cell, treating NULL explicitly.

use crate::query::ProjectedColumn;
use crate::render::Rendered;

/// Errors raised while reading a raw row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    /// No column with the requested name.
    #[error("no column named {0}")]
    NoSuchColumn(String),

    /// Column position past the end of the row.
    #[error("column index {index} out of range for {width} column(s)")]
    IndexOutOfRange {
        /// Requested position.
        index: usize,
        /// Number of columns.
        width: usize,
    },

    /// NULL read into a non-optional type.
    #[error("column {column} is NULL")]
    UnexpectedNull {
        /// Column name or position.
        column: String,
    },

    /// The cell text does not parse as the requested type.
    #[error("cannot read {value:?} in column {column} as {expected}")]
    Parse {
        /// Column name or position.
        column: String,
        /// The raw cell text.
        value: String,
        /// The requested type.
        expected: &'static str,
    },
}

/// Something that executes rendered statements.
pub trait Executor {
    /// The executor's error type.
    type Error;

    /// Executes a statement and returns its rows (empty for statements
    /// that return none).
    fn execute(&mut self, statement: &Rendered) -> Result<RawRows, Self::Error>;
}

/// Column names plus rows of raw cells, `None` for NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRows {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawRows {
    /// Creates a result set.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    /// Creates a result set whose column names come from a SELECT
    /// projection. Unnamed items get an empty name and are only reachable
    /// by position.
    #[must_use]
    pub fn from_projection(projection: &[ProjectedColumn], rows: Vec<Vec<Option<String>>>) -> Self {
        let columns = projection
            .iter()
            .map(|c| c.name.clone().unwrap_or_default())
            .collect();
        Self::new(columns, rows)
    }

    /// The column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the row at `index`.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    /// Iterates over the rows.
    pub fn iter(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }
}

/// One raw row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    cells: &'a [Option<String>],
}

impl Row<'_> {
    /// Reads and parses a cell by position or name.
    pub fn get<T: FromCell>(&self, index: impl ColumnIndex) -> Result<T, RowError> {
        let position = index.position(self.columns)?;
        let cell = self
            .cells
            .get(position)
            .ok_or(RowError::IndexOutOfRange {
                index: position,
                width: self.cells.len(),
            })?;
        let label = match self.columns.get(position) {
            Some(name) if !name.is_empty() => name.clone(),
            _ => position.to_string(),
        };
        T::from_cell(&label, cell.as_deref())
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the row has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A column selector: a position or a name.
pub trait ColumnIndex {
    /// Resolves the position within `columns`.
    fn position(&self, columns: &[String]) -> Result<usize, RowError>;
}

impl ColumnIndex for usize {
    fn position(&self, columns: &[String]) -> Result<usize, RowError> {
        if *self < columns.len() {
            Ok(*self)
        } else {
            Err(RowError::IndexOutOfRange {
                index: *self,
                width: columns.len(),
            })
        }
    }
}

impl ColumnIndex for &str {
    fn position(&self, columns: &[String]) -> Result<usize, RowError> {
        columns
            .iter()
            .position(|c| c == self)
            .ok_or_else(|| RowError::NoSuchColumn((*self).to_string()))
    }
}

/// Types readable from a raw cell.
pub trait FromCell: Sized {
    /// Parses the cell; `cell` is `None` for NULL.
    fn from_cell(column: &str, cell: Option<&str>) -> Result<Self, RowError>;
}

fn required<'c>(column: &str, cell: Option<&'c str>) -> Result<&'c str, RowError> {
    cell.ok_or_else(|| RowError::UnexpectedNull {
        column: column.to_string(),
    })
}

fn parse_error(column: &str, value: &str, expected: &'static str) -> RowError {
    RowError::Parse {
        column: column.to_string(),
        value: value.to_string(),
        expected,
    }
}

impl FromCell for i64 {
    fn from_cell(column: &str, cell: Option<&str>) -> Result<Self, RowError> {
        let text = required(column, cell)?;
        text.trim()
            .parse()
            .map_err(|_| parse_error(column, text, "Integer"))
    }
}

impl FromCell for f64 {
    fn from_cell(column: &str, cell: Option<&str>) -> Result<Self, RowError> {
        let text = required(column, cell)?;
        text.trim()
            .parse()
            .map_err(|_| parse_error(column, text, "Real"))
    }
}

impl FromCell for String {
    fn from_cell(column: &str, cell: Option<&str>) -> Result<Self, RowError> {
        required(column, cell).map(String::from)
    }
}

impl FromCell for bool {
    fn from_cell(column: &str, cell: Option<&str>) -> Result<Self, RowError> {
        let text = required(column, cell)?;
        match text.trim() {
            "true" | "t" | "TRUE" | "1" => Ok(true),
            "false" | "f" | "FALSE" | "0" => Ok(false),
            _ => Err(parse_error(column, text, "Boolean")),
        }
    }
}

impl<T: FromCell> FromCell for Option<T> {
    fn from_cell(column: &str, cell: Option<&str>) -> Result<Self, RowError> {
        match cell {
            None => Ok(None),
            Some(_) => T::from_cell(column, cell).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> RawRows {
        RawRows::new(
            vec![String::from("id"), String::from("name"), String::from("email")],
            vec![
                vec![
                    Some(String::from("1")),
                    Some(String::from("Alice")),
                    None,
                ],
                vec![
                    Some(String::from("2")),
                    Some(String::from("Bob")),
                    Some(String::from("bob@example.com")),
                ],
            ],
        )
    }

    #[test]
    fn test_get_by_position_and_name() {
        let rows = rows();
        let first = rows.row(0).unwrap();
        assert_eq!(first.get::<i64>(0_usize).unwrap(), 1);
        assert_eq!(first.get::<String>("name").unwrap(), "Alice");
        assert_eq!(first.get::<Option<String>>("email").unwrap(), None);
        let second = rows.row(1).unwrap();
        assert_eq!(
            second.get::<Option<String>>("email").unwrap().as_deref(),
            Some("bob@example.com")
        );
    }

    #[test]
    fn test_null_into_required() {
        let rows = rows();
        let first = rows.row(0).unwrap();
        assert_eq!(
            first.get::<String>("email"),
            Err(RowError::UnexpectedNull {
                column: String::from("email")
            })
        );
    }

    #[test]
    fn test_lookup_errors() {
        let rows = rows();
        let first = rows.row(0).unwrap();
        assert!(matches!(
            first.get::<i64>("missing"),
            Err(RowError::NoSuchColumn(_))
        ));
        assert!(matches!(
            first.get::<i64>(9_usize),
            Err(RowError::IndexOutOfRange { index: 9, width: 3 })
        ));
        assert!(matches!(
            first.get::<i64>("name"),
            Err(RowError::Parse { expected: "Integer", .. })
        ));
    }

    #[test]
    fn test_bool_and_real_cells() {
        assert!(bool::from_cell("flag", Some("true")).unwrap());
        assert!(!bool::from_cell("flag", Some("0")).unwrap());
        assert!(bool::from_cell("flag", Some("maybe")).is_err());
        assert!((f64::from_cell("score", Some("2.5")).unwrap() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rows_from_projection() {
        let projection = vec![
            ProjectedColumn {
                name: Some(String::from("n")),
                type_tag: crate::types::TypeTag::INTEGER,
            },
            ProjectedColumn {
                name: None,
                type_tag: crate::types::TypeTag::TEXT,
            },
        ];
        let rows = RawRows::from_projection(
            &projection,
            vec![vec![Some(String::from("3")), Some(String::from("x"))]],
        );
        let row = rows.iter().next().unwrap();
        assert_eq!(row.get::<i64>("n").unwrap(), 3);
        assert_eq!(row.get::<String>(1_usize).unwrap(), "x");
        assert_eq!(rows.len(), 1);
    }
}
