//! Rendered statements executed against an in-memory SQLite database.

mod common;

use common::{Order, OrderTable, SqliteExecutor, User, UserTable};
use sqlforge_core::dialect::SqliteDialect;
use sqlforge_core::expr::{functions, SqlExpr};
use sqlforge_core::migrations::Operation;
use sqlforge_core::query::{delete_from, insert_into, select, select_all, update, Order as Dir};
use sqlforge_core::render::{Rendered, Statement};
use sqlforge_core::row::RawRows;
use sqlforge_core::schema::Table;

fn seeded() -> SqliteExecutor {
    let dialect = SqliteDialect::new();
    let mut db = SqliteExecutor::open();
    for op in [
        Operation::create_table_for::<UserTable>(),
        Operation::create_table_for::<OrderTable>(),
    ] {
        db.run(&Rendered::from(op.to_sql(&dialect).unwrap()));
    }

    let users = insert_into(&UserTable::table_ref())
        .columns((
            User::id(),
            User::name(),
            User::age(),
            User::email(),
            User::active(),
            User::score(),
        ))
        .unwrap()
        .values((1_i64, "Ada", 36_i64, Some("ada@example.com"), true, 9.5))
        .unwrap()
        .values((2_i64, "Grace", 45_i64, None::<String>, true, 7.0))
        .unwrap()
        .values((3_i64, "Linus", 17_i64, None::<String>, false, 3.25))
        .unwrap();
    db.run(&users.render_with(&dialect));

    let orders = insert_into(&OrderTable::table_ref())
        .columns((Order::id(), Order::user_id(), Order::total(), Order::note()))
        .unwrap()
        .values((1_i64, 1_i64, 120.0, Some("first")))
        .unwrap()
        .values((2_i64, 1_i64, 30.0, None::<String>))
        .unwrap()
        .values((3_i64, 2_i64, 75.5, None::<String>))
        .unwrap();
    db.run(&orders.render_with(&dialect));
    db
}

fn query(db: &mut SqliteExecutor, statement: &impl Statement) -> RawRows {
    db.run(&statement.render_with(&SqliteDialect::new()))
}

fn names(rows: &RawRows) -> Vec<String> {
    rows.iter().map(|r| r.get::<String>(0).unwrap()).collect()
}

#[test]
fn test_filtered_select() {
    let mut db = seeded();
    let rows = query(
        &mut db,
        &select((User::name(), User::email()))
            .from(&UserTable::table_ref())
            .where_clause(User::age().gt_eq(18) & User::active().eq(true))
            .order_by(User::name(), Dir::Asc),
    );
    assert_eq!(names(&rows), vec!["Ada", "Grace"]);
    assert_eq!(
        rows.row(0).unwrap().get::<Option<String>>("email").unwrap(),
        Some(String::from("ada@example.com"))
    );
    assert_eq!(rows.row(1).unwrap().get::<Option<String>>(1).unwrap(), None);
}

#[test]
fn test_select_all_reads_typed_cells() {
    let mut db = seeded();
    let rows = query(
        &mut db,
        &select_all(&UserTable::table_ref())
            .unwrap()
            .where_clause(User::id().eq(3_i64)),
    );
    assert_eq!(rows.len(), 1);
    let row = rows.row(0).unwrap();
    assert_eq!(row.get::<i64>("id").unwrap(), 3);
    assert_eq!(row.get::<String>("name").unwrap(), "Linus");
    assert!(!row.get::<bool>("active").unwrap());
    assert!((row.get::<f64>("score").unwrap() - 3.25).abs() < f64::EPSILON);
    assert!(row.get::<i64>("email").is_err());
}

#[test]
fn test_join_and_aggregate() {
    let mut db = seeded();
    let spent = functions::sum(Order::total());
    let rows = query(
        &mut db,
        &select((User::name(), spent.alias("spent"), functions::count_all().alias("n")))
            .from(&UserTable::table_ref())
            .inner_join(&OrderTable::table_ref(), Order::user_id().eq(User::id()))
            .group_by(User::name())
            .order_by(User::name(), Dir::Asc),
    );
    assert_eq!(names(&rows), vec!["Ada", "Grace"]);
    let ada = rows.row(0).unwrap();
    assert!((ada.get::<f64>("spent").unwrap() - 150.0).abs() < f64::EPSILON);
    assert_eq!(ada.get::<i64>("n").unwrap(), 2);
}

#[test]
fn test_left_join_keeps_unmatched_rows() {
    let mut db = seeded();
    let rows = query(
        &mut db,
        &select((User::name(), Order::total()))
            .from(&UserTable::table_ref())
            .left_join(&OrderTable::table_ref(), Order::user_id().eq(User::id()))
            .where_clause(Order::id().is_null()),
    );
    assert_eq!(names(&rows), vec!["Linus"]);
    assert_eq!(rows.row(0).unwrap().get::<Option<f64>>(1).unwrap(), None);
}

#[test]
fn test_empty_in_lists() {
    let mut db = seeded();
    let users = UserTable::table_ref();
    let none = query(
        &mut db,
        &select(User::id())
            .from(&users)
            .where_clause(User::id().is_in(Vec::<i64>::new())),
    );
    assert!(none.is_empty());

    let all = query(
        &mut db,
        &select(User::id())
            .from(&users)
            .where_clause(User::id().not_in(Vec::<i64>::new())),
    );
    assert_eq!(all.len(), 3);
}

#[test]
fn test_injection_attempt_is_bound() {
    let mut db = seeded();
    let hostile = "x'; DROP TABLE users; --";
    let rows = query(
        &mut db,
        &select(User::id())
            .from(&UserTable::table_ref())
            .where_clause(User::name().eq(hostile)),
    );
    assert!(rows.is_empty());

    let count = query(
        &mut db,
        &select((functions::count_all().alias("n"),)).from(&UserTable::table_ref()),
    );
    assert_eq!(count.row(0).unwrap().get::<i64>("n").unwrap(), 3);
}

#[test]
fn test_update_and_delete() {
    let mut db = seeded();
    let users = UserTable::table_ref();

    let bump = update(&users)
        .set(&User::age(), User::age().plus(1))
        .unwrap()
        .set(&User::active(), true)
        .unwrap()
        .where_clause(User::name().eq("Linus"));
    query(&mut db, &bump);

    let rows = query(
        &mut db,
        &select((User::age(), User::active()))
            .from(&users)
            .where_clause(User::id().eq(3_i64)),
    );
    let row = rows.row(0).unwrap();
    assert_eq!(row.get::<i64>(0).unwrap(), 18);
    assert!(row.get::<bool>(1).unwrap());

    query(
        &mut db,
        &delete_from(&users).where_clause(User::email().is_null()),
    );
    let rest = query(&mut db, &select(User::name()).from(&users));
    assert_eq!(names(&rest), vec!["Ada"]);
}
