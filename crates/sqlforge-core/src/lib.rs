//! # sqlforge-core
//!
//! A typed SQL expression model with a deterministic, parameterized
//! renderer.
//!
//! This crate provides:
//! - Table and column references with SQL type tags
//! - A type compatibility checker that rejects ill-typed expressions before
//!   a node exists, mirrored by trait bounds in the typed API
//! - Immutable, shareable expression nodes and SELECT / INSERT / UPDATE /
//!   DELETE query values built with the typestate pattern
//! - A renderer producing SQL text plus an ordered parameter list
//! - Dialect-aware migrations
//!
//! ## Type-Safe Query Building
//!
//! ```rust
//! use sqlforge_core::prelude::*;
//!
//! let users = TableRef::builder("users")
//!     .column("id", TypeTag::INTEGER)
//!     .column("name", TypeTag::TEXT)
//!     .column("age", TypeTag::INTEGER)
//!     .build();
//! let name: Column<String> = users.typed("name").unwrap();
//! let age: Column<i64> = users.typed("age").unwrap();
//!
//! let query = select(&name)
//!     .from(&users)
//!     .where_clause(age.gt_eq(18) & name.not_eq(""));
//! let rendered = query.render();
//! assert_eq!(
//!     rendered.sql,
//!     "SELECT users.name FROM users WHERE ((users.age >= ?) AND (users.name != ?))"
//! );
//!
//! // This would NOT compile: Integer compared with Text
//! // age.eq("18");
//! ```
//!
//! ## SQL Injection Prevention
//!
//! Values are bound as parameters, never spliced into the text:
//!
//! ```rust
//! use sqlforge_core::prelude::*;
//!
//! let users = TableRef::builder("users").column("name", TypeTag::TEXT).build();
//! let name: Column<String> = users.typed("name").unwrap();
//!
//! let user_input = "'; DROP TABLE users; --";
//! let rendered = delete_from(&users).where_clause(name.eq(user_input)).render();
//! assert_eq!(rendered.sql, "DELETE FROM users WHERE (users.name = ?)");
//! assert_eq!(rendered.params, vec![SqlValue::Text(user_input.to_string())]);
//! ```

pub mod config;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod migrations;
pub mod query;
pub mod render;
pub mod row;
pub mod schema;
pub mod types;

pub use config::{DialectKind, RenderConfig};
pub use error::{BuildError, TypeError};
pub use expr::{Column, Condition, Expr, SqlExpr, SqlValue, TypedExpr};
pub use query::{delete_from, insert_into, select, select_all, select_items, update, Delete, Insert, Select, Update};
pub use render::{Rendered, Renderer, Statement};
pub use schema::{ColumnRef, Table, TableRef};
pub use types::{ScalarType, TypeTag};

/// The names most programs need, for glob import.
pub mod prelude {
    pub use crate::expr::{case_when, functions, Case, Column, Condition, Expr, Inline, SqlExpr, SqlValue};
    pub use crate::query::{
        delete_from, insert_into, select, select_all, select_items, update, JoinKind, Order,
    };
    pub use crate::render::{Rendered, Statement};
    pub use crate::schema::{ColumnRef, Table, TableRef};
    pub use crate::types::{ScalarType, TypeTag};
}
