//! Error types for expression and query construction.

use crate::types::TypeTag;

/// A type-incompatible combination, rejected before any node exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    /// The operands of a comparison do not share a scalar type.
    #[error("cannot compare {left} with {right}")]
    Incomparable {
        /// Left operand type.
        left: TypeTag,
        /// Right operand type.
        right: TypeTag,
    },

    /// An arithmetic operand is not numeric.
    #[error("arithmetic requires numeric operands, got {left} and {right}")]
    NonNumeric {
        /// Left operand type.
        left: TypeTag,
        /// Right operand type.
        right: TypeTag,
    },

    /// LIKE / NOT LIKE over non-text operands.
    #[error("pattern matching requires text operands, got {left} and {right}")]
    NonText {
        /// Subject type.
        left: TypeTag,
        /// Pattern type.
        right: TypeTag,
    },

    /// A logical operand or predicate is not boolean.
    #[error("{operator} requires a boolean operand, got {found}")]
    NonBoolean {
        /// The operator or clause requiring a boolean.
        operator: &'static str,
        /// The offending type.
        found: TypeTag,
    },

    /// A raw column reference was used where a predicate is required.
    #[error("column {column} cannot be used directly as a predicate")]
    BareColumn {
        /// The qualified column name.
        column: String,
    },

    /// A function received an argument outside its accepted set.
    #[error("{function} does not accept an argument of type {found}")]
    InvalidArgument {
        /// Function name.
        function: &'static str,
        /// The offending argument type.
        found: TypeTag,
    },

    /// A function received the wrong number of arguments.
    #[error("{function} expects {expected} argument(s), got {found}")]
    Arity {
        /// Function name.
        function: &'static str,
        /// Expected argument count.
        expected: usize,
        /// Provided argument count.
        found: usize,
    },

    /// CASE branches disagree on their result type.
    #[error("CASE branches must share one type: expected {expected}, found {found}")]
    CaseBranchMismatch {
        /// The type of the first branch.
        expected: TypeTag,
        /// The first mismatching type.
        found: TypeTag,
    },

    /// CASE with no WHEN branch.
    #[error("CASE expression needs at least one WHEN branch")]
    EmptyCase,

    /// A value does not fit the column it is assigned to.
    #[error("cannot assign {found} to column {column} of type {expected}")]
    Assignment {
        /// The qualified column name.
        column: String,
        /// The column type.
        expected: TypeTag,
        /// The value type.
        found: TypeTag,
    },
}

/// A structural problem found while assembling a query value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// A SELECT without any projected item.
    #[error("SELECT needs at least one projected item")]
    EmptyProjection,

    /// VALUES supplied before any column list.
    #[error("INSERT INTO {table} has no column list")]
    NoColumns {
        /// Target table.
        table: String,
    },

    /// A VALUES row has the wrong number of entries.
    #[error("VALUES row has {found} value(s) but {expected} column(s) were listed")]
    RowArity {
        /// Number of listed columns.
        expected: usize,
        /// Number of values in the row.
        found: usize,
    },

    /// A column from another table was used as an assignment target.
    #[error("column {table_of_column}.{column} does not belong to table {table}")]
    ForeignColumn {
        /// The statement's target table.
        table: String,
        /// The column's own table.
        table_of_column: String,
        /// Column name.
        column: String,
    },

    /// A type rule was violated.
    #[error(transparent)]
    Type(#[from] TypeError),
}
