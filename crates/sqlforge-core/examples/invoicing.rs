//! Invoicing queries built from typed tables.
//!
//! Builds the schema migration and a handful of reporting queries, then
//! logs the rendered SQL and parameters for SQLite and PostgreSQL.
//!
//! Run with: cargo run --example invoicing

use sqlforge_core::dialect::{Dialect, PostgresDialect, SqliteDialect};
use sqlforge_core::migrations::{Migration, MigrationRunner, MigrationState, Operation};
use sqlforge_core::prelude::*;
use sqlforge_core::query::{HasFrom, HasSet, Select, Update};
use sqlforge_derive::Table;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

// =============================================================================
// SCHEMA DEFINITIONS
// =============================================================================

/// Client - customers who receive invoices.
#[allow(dead_code)]
#[derive(Debug, Clone, Table)]
#[table(name = "clients")]
pub struct Client {
    #[column(primary_key)]
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub payment_terms_days: i64,
}

/// Invoice - the main billing document.
#[allow(dead_code)]
#[derive(Debug, Clone, Table)]
#[table(name = "invoices")]
pub struct Invoice {
    #[column(primary_key)]
    pub id: i64,
    pub client_id: i64,
    pub status: String,
    pub subtotal: f64,
    pub tax_rate: f64,
    pub paid: bool,
    pub notes: Option<String>,
}

struct CreateSchema;

impl Migration for CreateSchema {
    const ID: &'static str = "0001_create_schema";

    fn forward() -> Vec<Operation> {
        vec![
            Operation::create_table_for::<ClientTable>(),
            Operation::create_table_for::<InvoiceTable>(),
            Operation::create_index("invoices_client_idx", "invoices", ["client_id"]),
        ]
    }
}

// =============================================================================
// QUERIES
// =============================================================================

/// Unpaid invoices above a threshold, with the tax-inclusive total.
fn unpaid_invoices(threshold: f64) -> Select<HasFrom> {
    let total = Invoice::subtotal() + Invoice::subtotal() * Invoice::tax_rate();
    select((Invoice::id(), Client::name(), total.alias("total")))
        .from(&InvoiceTable::table_ref())
        .inner_join(
            &ClientTable::table_ref(),
            Invoice::client_id().eq(Client::id()),
        )
        .where_clause(Invoice::paid().eq(false) & Invoice::subtotal().gt(threshold))
        .order_by(Invoice::subtotal(), Order::Desc)
}

/// Revenue per client, bucketed by size.
fn revenue_report() -> Select<HasFrom> {
    let revenue = functions::sum(Invoice::subtotal());
    let bucket = case_when(functions::count_all().gt(Inline(10)), "key account")
        .when(functions::count_all().gt(Inline(1)), "repeat")
        .otherwise("one-off");
    select((Client::name(), revenue.alias("revenue"), bucket.alias("bucket")))
        .from(&ClientTable::table_ref())
        .left_join(
            &InvoiceTable::table_ref(),
            Invoice::client_id().eq(Client::id()),
        )
        .group_by(Client::name())
        .having(revenue.is_not_null())
        .order_by_item(revenue.desc())
        .limit(20)
}

/// Marks a batch of invoices as paid.
fn mark_paid(ids: Vec<i64>) -> Result<Update<HasSet>, sqlforge_core::BuildError> {
    Ok(update(&InvoiceTable::table_ref())
        .set(&Invoice::paid(), true)?
        .set(&Invoice::status(), "paid")?
        .where_clause(Invoice::id().is_in(ids)))
}

fn log_statement(dialect: &dyn Dialect, label: &str, statement: &dyn Statement) {
    let rendered = statement.render_with(dialect);
    info!(dialect = dialect.name(), query = label, sql = %rendered.sql);
    info!(params = ?rendered.text_params());
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut runner = MigrationRunner::new(SqliteDialect::new());
    runner.register::<CreateSchema>();
    for (id, statements) in runner.sql_for_pending(&MigrationState::new())? {
        info!(migration = id, "schema");
        for sql in statements {
            info!("{sql};");
        }
    }

    let mark = mark_paid(vec![7, 8, 9])?;
    let dialects: [&dyn Dialect; 2] = [&SqliteDialect::new(), &PostgresDialect::new()];
    for dialect in dialects {
        log_statement(dialect, "unpaid", &unpaid_invoices(500.0));
        log_statement(dialect, "revenue", &revenue_report());
        log_statement(dialect, "mark paid", &mark);
    }

    let nothing = mark_paid(Vec::new())?;
    info!(sql = %nothing.render().sql, "empty batch");
    Ok(())
}
