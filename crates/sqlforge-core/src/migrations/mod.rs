//! Dialect-aware schema migrations.
//!
//! - Operations describe schema changes and data statements; their SQL comes
//!   from the target dialect.
//! - Operations are reversible where the reverse is derivable, so most
//!   migrations only spell out `forward()`.
//! - The runner orders migrations by dependency and records applied ones in
//!   a history table whose statements are built with the query layer.
//!
//! # Example
//!
//! ```rust
//! use sqlforge_core::dialect::PostgresDialect;
//! use sqlforge_core::migrations::{ColumnDef, Migration, Operation};
//! use sqlforge_core::schema::TableRef;
//! use sqlforge_core::types::{ScalarType, TypeTag};
//!
//! pub struct Migration0001;
//!
//! impl Migration for Migration0001 {
//!     const ID: &'static str = "0001_create_users";
//!
//!     fn forward() -> Vec<Operation> {
//!         let users = TableRef::builder("users")
//!             .column("id", TypeTag::INTEGER)
//!             .column("email", TypeTag::optional(ScalarType::Text))
//!             .primary_key("id")
//!             .build();
//!         vec![
//!             Operation::create_table(&users),
//!             Operation::create_index("idx_users_email", "users", ["email"]),
//!         ]
//!     }
//! }
//!
//! let sql = Migration0001::forward_sql(&PostgresDialect::new()).unwrap();
//! assert_eq!(
//!     sql[1],
//!     "CREATE INDEX \"idx_users_email\" ON \"users\" (\"email\")"
//! );
//! ```

mod migration;
mod operation;
mod state;

pub use migration::{Migration, MigrationError, MigrationRunner, MigrationStatus, RegisteredMigration};
pub use operation::{
    AddColumnOp, ColumnDef, CreateIndexOp, CreateTableOp, DataOp, DropColumnOp, DropIndexOp,
    DropTableOp, Operation, RawSqlOp, RenameColumnOp,
};
pub use state::{AppliedMigration, MigrationState, APPLIED_AT_FORMAT, HISTORY_TABLE};
