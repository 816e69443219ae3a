//! End-to-end rendering of typed queries built from derived tables.

mod common;

use common::{p, render, Order, OrderTable, User, UserTable};
use sqlforge_core::dialect::{PostgresDialect, SqliteDialect};
use sqlforge_core::expr::{case_when, functions, Inline, SqlExpr};
use sqlforge_core::query::{
    delete_from, insert_into, select, select_all, select_items, update, Order as Dir, SelectItem,
};
use sqlforge_core::render::{Renderer, Statement};
use sqlforge_core::schema::{Table, TableRef};
use sqlforge_core::{DialectKind, RenderConfig};

#[test]
fn test_select_where() {
    let users = UserTable::table_ref();
    let (sql, params) = render(
        &select((User::id(), User::name()))
            .from(&users)
            .where_clause(User::age().gt(18)),
    );
    assert_eq!(
        sql,
        "SELECT users.id, users.name FROM users WHERE (users.age > ?)"
    );
    assert_eq!(params, vec![p("18")]);
}

#[test]
fn test_select_and() {
    let users = UserTable::table_ref();
    let (sql, params) = render(
        &select((User::id(), User::name()))
            .from(&users)
            .where_clause(User::age().gt_eq(18) & User::name().not_eq("")),
    );
    assert_eq!(
        sql,
        "SELECT users.id, users.name FROM users WHERE ((users.age >= ?) AND (users.name != ?))"
    );
    assert_eq!(params, vec![p("18"), p("")]);
}

#[test]
fn test_case_age_group() {
    let users = UserTable::table_ref();
    let age_group = case_when(User::age().lt(18), "Minor")
        .when(User::age().lt(65), "Adult")
        .otherwise("Senior");
    let (sql, params) = render(&select((User::name(), age_group.alias("age_group"))).from(&users));
    assert_eq!(
        sql,
        "SELECT users.name, CASE WHEN (users.age < ?) THEN ? WHEN (users.age < ?) THEN ? ELSE ? END AS age_group FROM users"
    );
    assert_eq!(
        params,
        vec![p("18"), p("Minor"), p("65"), p("Adult"), p("Senior")]
    );
}

#[test]
fn test_delete_all() {
    let (sql, params) = render(&delete_from(&UserTable::table_ref()));
    assert_eq!(sql, "DELETE FROM users");
    assert!(params.is_empty());
}

#[test]
fn test_in_list_params_in_order() {
    let (sql, params) = render(
        &select(User::id())
            .from(&UserTable::table_ref())
            .where_clause(User::id().is_in([3_i64, 1, 2])),
    );
    assert_eq!(sql, "SELECT users.id FROM users WHERE (users.id IN (?, ?, ?))");
    assert_eq!(params, vec![p("3"), p("1"), p("2")]);
}

#[test]
fn test_empty_in_lists() {
    let users = UserTable::table_ref();
    let (sql, params) = render(
        &select(User::id())
            .from(&users)
            .where_clause(User::id().is_in(Vec::<i64>::new()))
            .or_where(User::id().not_in(Vec::<i64>::new())),
    );
    assert_eq!(sql, "SELECT users.id FROM users WHERE ((1 = 0) OR (1 = 1))");
    assert!(params.is_empty());
}

#[test]
fn test_full_clause_order() {
    let users = UserTable::table_ref();
    let orders = OrderTable::table_ref();
    let spent = functions::sum(Order::total());
    let q = select((User::name(), spent.alias("spent")))
        .distinct()
        .from(&users)
        .left_join(&orders, Order::user_id().eq(User::id()))
        .where_clause(User::active().eq(true))
        .group_by(User::name())
        .having(functions::count_all().gt(Inline(1)))
        .order_by(User::name(), Dir::Asc)
        .order_by_item(spent.desc())
        .limit(10)
        .offset_param(20);
    let (sql, params) = render(&q);
    assert_eq!(
        sql,
        "SELECT DISTINCT users.name, SUM(orders.total) AS spent FROM users \
         LEFT JOIN orders ON (orders.user_id = users.id) \
         WHERE (users.active = ?) \
         GROUP BY users.name \
         HAVING (COUNT(*) > 1) \
         ORDER BY users.name ASC, SUM(orders.total) DESC \
         LIMIT 10 OFFSET ?"
    );
    assert_eq!(params, vec![p("true"), p("20")]);
}

#[test]
fn test_reused_subtree_binds_twice() {
    let adult = User::age().gt_eq(18);
    let (sql, params) = render(
        &select(User::id())
            .from(&UserTable::table_ref())
            .where_clause(adult.clone())
            .and_where(adult),
    );
    assert_eq!(
        sql,
        "SELECT users.id FROM users WHERE ((users.age >= ?) AND (users.age >= ?))"
    );
    assert_eq!(params, vec![p("18"), p("18")]);
}

#[test]
fn test_insert_update_delete() {
    let users = UserTable::table_ref();
    let insert = insert_into(&users)
        .columns((User::name(), User::age(), User::email()))
        .unwrap()
        .values(("Ada", 36_i64, Some("ada@example.com")))
        .unwrap()
        .values(("Grace", 45_i64, None::<String>))
        .unwrap();
    let (sql, params) = render(&insert);
    assert_eq!(
        sql,
        "INSERT INTO users (name, age, email) VALUES (?, ?, ?), (?, ?, ?)"
    );
    assert_eq!(
        params,
        vec![
            p("Ada"),
            p("36"),
            p("ada@example.com"),
            p("Grace"),
            p("45"),
            None
        ]
    );

    let q = update(&users)
        .set(&User::score(), User::score() * 1.5)
        .unwrap()
        .where_clause(User::name().like("A%"));
    let (sql, params) = render(&q);
    assert_eq!(
        sql,
        "UPDATE users SET score = (users.score * ?) WHERE (users.name LIKE ?)"
    );
    assert_eq!(params, vec![p("1.5"), p("A%")]);

    let (sql, _) = render(&delete_from(&users).where_clause(User::email().is_null()));
    assert_eq!(sql, "DELETE FROM users WHERE (users.email IS NULL)");
}

#[test]
fn test_select_all_expands_columns() {
    let (sql, _) = render(&select_all(&OrderTable::table_ref()).unwrap());
    assert_eq!(
        sql,
        "SELECT orders.id, orders.user_id, orders.total, orders.note FROM orders"
    );
    assert!(select_all(&TableRef::builder("nothing").build()).is_err());
    assert!(select_items(Vec::<SelectItem>::new()).is_err());
}

#[test]
fn test_non_finite_real_params() {
    let (_, params) = render(
        &select(User::id())
            .from(&UserTable::table_ref())
            .where_clause(User::score().gt(f64::NAN) | User::score().lt(f64::NEG_INFINITY)),
    );
    assert_eq!(params, vec![p("NaN"), p("-Infinity")]);
}

#[test]
fn test_dialect_placeholders() {
    let q = select(User::id())
        .from(&UserTable::table_ref())
        .where_clause(User::age().between(18, 65))
        .limit_param(5);
    assert_eq!(
        q.render_with(&PostgresDialect::new()).sql,
        "SELECT users.id FROM users WHERE (users.age BETWEEN $1 AND $2) LIMIT $3"
    );
    assert_eq!(
        q.render_with(&SqliteDialect::new()).sql,
        "SELECT users.id FROM users WHERE (users.age BETWEEN ? AND ?) LIMIT ?"
    );

    let renderer = Renderer::new(RenderConfig::new(DialectKind::Postgres));
    assert_eq!(renderer.render(&q), q.render_with(&PostgresDialect::new()));
}

#[test]
fn test_render_is_deterministic() {
    let q = select((User::name(), functions::lower(User::name()).alias("lowered")))
        .from(&UserTable::table_ref())
        .where_clause(User::email().is_not_null().or(User::score().lt_eq(0.5)));
    assert_eq!(q.render(), q.render());
}
