//! Migrations applied to SQLite through the executor interface.

mod common;

use chrono::{DateTime, TimeZone, Utc};
use common::{SqliteExecutor, User, UserTable};
use sqlforge_core::dialect::{PostgresDialect, SqliteDialect};
use sqlforge_core::migrations::{
    ColumnDef, Migration, MigrationError, MigrationRunner, MigrationState, Operation,
};
use sqlforge_core::query::{insert_into, select};
use sqlforge_core::render::{Rendered, Statement};
use sqlforge_core::schema::Table;
use sqlforge_core::types::{ScalarType, TypeTag};

struct CreateUsers;
impl Migration for CreateUsers {
    const ID: &'static str = "0001_create_users";
    fn forward() -> Vec<Operation> {
        vec![
            Operation::create_table_for::<UserTable>(),
            Operation::create_unique_index("users_name_idx", "users", ["name"]),
        ]
    }
}

struct SeedAdmin;
impl Migration for SeedAdmin {
    const ID: &'static str = "0002_seed_admin";
    const DEPENDENCIES: &'static [&'static str] = &["0001_create_users"];
    fn forward() -> Vec<Operation> {
        let Ok(columns) = insert_into(&UserTable::table_ref()).columns((
            User::id(),
            User::name(),
            User::age(),
            User::active(),
            User::score(),
        )) else {
            return vec![];
        };
        match columns.values((1_i64, "admin", 40_i64, true, 0.0)) {
            Ok(insert) => vec![Operation::data(insert)],
            Err(_) => vec![],
        }
    }
    fn rollback() -> Result<Vec<Operation>, MigrationError> {
        Ok(vec![Operation::raw_sql("DELETE FROM users WHERE name = 'admin'")])
    }
}

struct AddNickname;
impl Migration for AddNickname {
    const ID: &'static str = "0003_add_nickname";
    const DEPENDENCIES: &'static [&'static str] = &["0002_seed_admin"];
    fn forward() -> Vec<Operation> {
        vec![Operation::add_column(
            "users",
            ColumnDef::new("nickname", TypeTag::optional(ScalarType::Text)),
        )]
    }
}

fn runner() -> MigrationRunner<SqliteDialect> {
    let mut runner = MigrationRunner::new(SqliteDialect::new());
    runner
        .register::<AddNickname>()
        .register::<SeedAdmin>()
        .register::<CreateUsers>();
    runner
}

fn applied_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap()
}

fn history(db: &mut SqliteExecutor) -> sqlforge_core::row::RawRows {
    db.run(&MigrationState::list_applied().render_with(&SqliteDialect::new()))
}

#[test]
fn test_apply_pending_runs_in_dependency_order() {
    let runner = runner();
    let mut db = SqliteExecutor::open();
    let mut state = MigrationState::new();

    let applied = runner
        .apply_pending(&mut db, &mut state, applied_at())
        .unwrap();
    assert_eq!(
        applied,
        vec!["0001_create_users", "0002_seed_admin", "0003_add_nickname"]
    );
    assert_eq!(state.applied_count(), 3);

    let rows = db.run(
        &select((User::name(), User::active()))
            .from(&UserTable::table_ref())
            .render_with(&SqliteDialect::new()),
    );
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.row(0).unwrap().get::<String>("name").unwrap(), "admin");
    assert!(rows.row(0).unwrap().get::<bool>("active").unwrap());

    // the added column exists
    db.run(&Rendered::from(String::from("UPDATE users SET nickname = 'root'")));
}

#[test]
fn test_history_round_trip() {
    let runner = runner();
    let mut db = SqliteExecutor::open();
    runner
        .apply_pending(&mut db, &mut MigrationState::new(), applied_at())
        .unwrap();

    let rows = history(&mut db);
    let state = MigrationState::from_rows(&rows).unwrap();
    assert!(state.is_applied("0002_seed_admin"));
    assert!(runner.pending_migrations(&state).unwrap().is_empty());

    let entries = MigrationState::parse_history(&rows).unwrap();
    let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["0001_create_users", "0002_seed_admin", "0003_add_nickname"]
    );
    assert!(entries.iter().all(|e| e.applied_at == applied_at()));

    // a second run applies nothing
    let again = runner.apply_pending(&mut db, &mut state.clone(), applied_at());
    assert!(again.unwrap().is_empty());
}

#[test]
fn test_partial_state_applies_the_rest() {
    let mut first = MigrationRunner::new(SqliteDialect::new());
    first.register::<CreateUsers>();
    let mut db = SqliteExecutor::open();
    let mut state = MigrationState::new();
    first.apply_pending(&mut db, &mut state, applied_at()).unwrap();

    let applied = runner()
        .apply_pending(&mut db, &mut state, applied_at())
        .unwrap();
    assert_eq!(applied, vec!["0002_seed_admin", "0003_add_nickname"]);
    assert_eq!(history(&mut db).len(), 3);
}

#[test]
fn test_rollback_through_sqlite() {
    let runner = runner();
    let mut db = SqliteExecutor::open();
    let mut state = MigrationState::new();
    runner
        .apply_pending(&mut db, &mut state, applied_at())
        .unwrap();

    // SQLite can drop columns, so the whole chain reverses.
    let plan = runner.sql_for_rollback(&state, 3).unwrap();
    let order: Vec<_> = plan.iter().map(|(id, _)| *id).collect();
    assert_eq!(
        order,
        vec!["0003_add_nickname", "0002_seed_admin", "0001_create_users"]
    );
    assert_eq!(
        plan[2].1,
        vec![
            String::from("DROP INDEX \"users_name_idx\""),
            String::from("DROP TABLE \"users\""),
        ]
    );

    for (id, sqls) in &plan {
        for sql in sqls {
            db.run(&Rendered::from(sql.clone()));
        }
        db.run(&MigrationState::record_unapplied(id).render_with(&SqliteDialect::new()));
        state.mark_unapplied(id);
    }
    assert_eq!(state.applied_count(), 0);
    assert!(history(&mut db).is_empty());
    assert_eq!(runner.pending_migrations(&state).unwrap().len(), 3);
}

#[test]
fn test_data_operation_is_not_reversible() {
    let ops = <SeedAdmin as Migration>::forward();
    assert_eq!(ops.len(), 1);
    assert!(!ops[0].is_reversible());
    assert_eq!(
        ops[0].to_sql(&SqliteDialect::new()).unwrap(),
        "INSERT INTO users (id, name, age, active, score) VALUES (1, 'admin', 40, TRUE, 0.0)"
    );
}

#[test]
fn test_postgres_rendering_of_migrations() {
    let sql = CreateUsers::forward_sql(&PostgresDialect::new()).unwrap();
    assert_eq!(
        sql[0],
        "CREATE TABLE \"users\" (\n    \"id\" BIGINT PRIMARY KEY,\n    \"name\" TEXT NOT NULL,\n    \
         \"age\" BIGINT NOT NULL,\n    \"email\" TEXT,\n    \"active\" BOOLEAN NOT NULL,\n    \
         \"score\" DOUBLE PRECISION NOT NULL\n)"
    );
    assert_eq!(
        sql[1],
        "CREATE UNIQUE INDEX \"users_name_idx\" ON \"users\" (\"name\")"
    );
}

#[test]
fn test_failed_statement_is_reported() {
    struct Broken;
    impl Migration for Broken {
        const ID: &'static str = "0001_broken";
        fn forward() -> Vec<Operation> {
            vec![Operation::raw_sql("CREATE TABLE")]
        }
    }

    let mut runner = MigrationRunner::new(SqliteDialect::new());
    runner.register::<Broken>();
    let mut state = MigrationState::new();
    let err = runner
        .apply_pending(&mut SqliteExecutor::open(), &mut state, applied_at())
        .unwrap_err();
    assert!(matches!(
        err,
        MigrationError::Execution { ref migration, .. } if migration == "0001_broken"
    ));
    assert!(!state.is_applied("0001_broken"));
}

#[test]
fn test_listing_orders_by_time() {
    let mut db = SqliteExecutor::open();
    let dialect = SqliteDialect::new();
    db.run(&Rendered::from(
        MigrationState::create_history_table().to_sql(&dialect).unwrap(),
    ));
    for (id, hour) in [("b", 10), ("a", 9), ("c", 9)] {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, hour, 0, 0).unwrap();
        db.run(&MigrationState::record_applied(id, at).unwrap().render_with(&dialect));
    }
    let ids: Vec<_> = MigrationState::parse_history(&history(&mut db))
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, vec!["a", "c", "b"]);
}
