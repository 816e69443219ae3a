//! SELECT statements.

use std::marker::PhantomData;

use crate::error::BuildError;
use crate::expr::{Condition, Expr};
use crate::render::{SqlWriter, Statement};
use crate::schema::TableRef;
use crate::types::TypeTag;

use super::{
    and_condition, compose, impl_where_clause, Bound, HasFrom, Join, JoinKind, NoFrom, Order,
    OrderBy, SelectItem,
};

/// Conversion into an ordered, non-empty projection list.
///
/// Implemented for single items and tuples of up to 12 items. Lists built
/// at runtime go through [`select_items`], which can reject an empty list.
pub trait IntoProjection {
    /// Returns the projection entries in order.
    fn into_projection(self) -> Vec<SelectItem>;
}

macro_rules! impl_single_projection {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl IntoProjection for $ty {
                fn into_projection(self) -> Vec<SelectItem> {
                    vec![SelectItem::from(self)]
                }
            }
        )+
    };
}

impl_single_projection!(SelectItem, Expr, &Expr, crate::schema::ColumnRef);

impl<T> IntoProjection for crate::expr::Column<T> {
    fn into_projection(self) -> Vec<SelectItem> {
        vec![SelectItem::from(self)]
    }
}

impl<T> IntoProjection for &crate::expr::Column<T> {
    fn into_projection(self) -> Vec<SelectItem> {
        vec![SelectItem::from(self)]
    }
}

impl<T> IntoProjection for crate::expr::TypedExpr<T> {
    fn into_projection(self) -> Vec<SelectItem> {
        vec![SelectItem::from(self)]
    }
}

// Tuples of items (up to 12)
macro_rules! impl_projection_tuple {
    ($($idx:tt: $item:ident),+) => {
        impl<$($item: Into<SelectItem>),+> IntoProjection for ($($item,)+) {
            fn into_projection(self) -> Vec<SelectItem> {
                vec![$(self.$idx.into()),+]
            }
        }
    };
}

impl_projection_tuple!(0: I0);
impl_projection_tuple!(0: I0, 1: I1);
impl_projection_tuple!(0: I0, 1: I1, 2: I2);
impl_projection_tuple!(0: I0, 1: I1, 2: I2, 3: I3);
impl_projection_tuple!(0: I0, 1: I1, 2: I2, 3: I3, 4: I4);
impl_projection_tuple!(0: I0, 1: I1, 2: I2, 3: I3, 4: I4, 5: I5);
impl_projection_tuple!(0: I0, 1: I1, 2: I2, 3: I3, 4: I4, 5: I5, 6: I6);
impl_projection_tuple!(0: I0, 1: I1, 2: I2, 3: I3, 4: I4, 5: I5, 6: I6, 7: I7);
impl_projection_tuple!(0: I0, 1: I1, 2: I2, 3: I3, 4: I4, 5: I5, 6: I6, 7: I7, 8: I8);
impl_projection_tuple!(0: I0, 1: I1, 2: I2, 3: I3, 4: I4, 5: I5, 6: I6, 7: I7, 8: I8, 9: I9);
impl_projection_tuple!(0: I0, 1: I1, 2: I2, 3: I3, 4: I4, 5: I5, 6: I6, 7: I7, 8: I8, 9: I9, 10: I10);
impl_projection_tuple!(0: I0, 1: I1, 2: I2, 3: I3, 4: I4, 5: I5, 6: I6, 7: I7, 8: I8, 9: I9, 10: I10, 11: I11);

/// A projected output column, as reported to row parsers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedColumn {
    /// The alias or column name, if the item has one.
    pub name: Option<String>,
    /// The item's result type.
    pub type_tag: TypeTag,
}

/// A SELECT statement.
///
/// Uses the typestate pattern to ensure that:
/// - rendering is only available once FROM is specified
/// - WHERE, JOIN, GROUP BY, HAVING, ORDER BY, LIMIT and OFFSET follow FROM
#[derive(Debug, Clone)]
pub struct Select<S = HasFrom> {
    distinct: bool,
    projection: Vec<SelectItem>,
    from: Option<TableRef>,
    joins: Vec<Join>,
    where_clause: Option<Condition>,
    group_by: Vec<Expr>,
    having: Option<Condition>,
    order_by: Vec<OrderBy>,
    limit: Option<Bound>,
    offset: Option<Bound>,
    _state: PhantomData<S>,
}

/// Starts a SELECT with the given projection.
#[must_use]
pub fn select(projection: impl IntoProjection) -> Select<NoFrom> {
    new_select(projection.into_projection())
}

/// Starts a SELECT from a projection list assembled at runtime.
pub fn select_items<I>(items: I) -> Result<Select<NoFrom>, BuildError>
where
    I: IntoIterator,
    I::Item: Into<SelectItem>,
{
    let projection: Vec<SelectItem> = items.into_iter().map(Into::into).collect();
    if projection.is_empty() {
        return Err(BuildError::EmptyProjection);
    }
    Ok(new_select(projection))
}

/// Starts a SELECT over every column of `table`, in declaration order,
/// with `table` already bound as FROM. Fails for a table without columns.
pub fn select_all(table: &TableRef) -> Result<Select<HasFrom>, BuildError> {
    select_items(table.columns().iter().cloned()).map(|q| q.from(table))
}

fn new_select(projection: Vec<SelectItem>) -> Select<NoFrom> {
    Select {
        distinct: false,
        projection,
        from: None,
        joins: vec![],
        where_clause: None,
        group_by: vec![],
        having: None,
        order_by: vec![],
        limit: None,
        offset: None,
        _state: PhantomData,
    }
}

impl<S: Clone> Select<S> {
    /// The projection list in order.
    #[must_use]
    pub fn items(&self) -> &[SelectItem] {
        &self.projection
    }

    /// The projected output columns in order.
    #[must_use]
    pub fn projection(&self) -> Vec<ProjectedColumn> {
        self.projection
            .iter()
            .map(|item| ProjectedColumn {
                name: item.output_name().map(String::from),
                type_tag: item.expr().type_tag(),
            })
            .collect()
    }

    /// Sets DISTINCT.
    #[must_use]
    pub fn distinct(&self) -> Self {
        let mut next = self.clone();
        next.distinct = true;
        next
    }
}

// Transition: NoFrom -> HasFrom
impl Select<NoFrom> {
    /// Specifies the table to select from.
    #[must_use]
    pub fn from(&self, table: &TableRef) -> Select<HasFrom> {
        Select {
            distinct: self.distinct,
            projection: self.projection.clone(),
            from: Some(table.clone()),
            joins: self.joins.clone(),
            where_clause: self.where_clause.clone(),
            group_by: self.group_by.clone(),
            having: self.having.clone(),
            order_by: self.order_by.clone(),
            limit: self.limit,
            offset: self.offset,
            _state: PhantomData,
        }
    }
}

impl_where_clause!(Select<HasFrom>);

// Methods available after FROM
impl Select<HasFrom> {
    /// The FROM table.
    #[must_use]
    pub fn table(&self) -> Option<&TableRef> {
        self.from.as_ref()
    }

    /// Appends a join.
    #[must_use]
    pub fn join(&self, table: &TableRef, on: impl Into<Condition>, kind: JoinKind) -> Self {
        let mut next = self.clone();
        next.joins.push(Join {
            table: table.clone(),
            on: on.into(),
            kind,
        });
        next
    }

    /// Appends an INNER JOIN.
    #[must_use]
    pub fn inner_join(&self, table: &TableRef, on: impl Into<Condition>) -> Self {
        self.join(table, on, JoinKind::Inner)
    }

    /// Appends a LEFT JOIN.
    #[must_use]
    pub fn left_join(&self, table: &TableRef, on: impl Into<Condition>) -> Self {
        self.join(table, on, JoinKind::Left)
    }

    /// Appends a GROUP BY expression.
    #[must_use]
    pub fn group_by(&self, expr: impl Into<Expr>) -> Self {
        let mut next = self.clone();
        next.group_by.push(expr.into());
        next
    }

    /// Sets the HAVING predicate, replacing any previous one.
    #[must_use]
    pub fn having(&self, condition: impl Into<Condition>) -> Self {
        let mut next = self.clone();
        next.having = Some(condition.into());
        next
    }

    /// ANDs a predicate onto the HAVING clause.
    #[must_use]
    pub fn and_having(&self, condition: impl Into<Condition>) -> Self {
        let mut next = self.clone();
        next.having = Some(compose(
            self.having.as_ref(),
            condition.into(),
            and_condition,
        ));
        next
    }

    /// Appends an ORDER BY key.
    #[must_use]
    pub fn order_by(&self, expr: impl Into<Expr>, order: Order) -> Self {
        self.order_by_item(OrderBy::new(expr, order))
    }

    /// Appends a prepared ORDER BY key, e.g. from `.desc()`.
    #[must_use]
    pub fn order_by_item(&self, item: OrderBy) -> Self {
        let mut next = self.clone();
        next.order_by.push(item);
        next
    }

    /// Sets LIMIT, written into the SQL text.
    #[must_use]
    pub fn limit(&self, limit: u64) -> Self {
        let mut next = self.clone();
        next.limit = Some(Bound::Inline(limit));
        next
    }

    /// Sets LIMIT as a bound parameter.
    #[must_use]
    pub fn limit_param(&self, limit: u32) -> Self {
        let mut next = self.clone();
        next.limit = Some(Bound::Param(limit));
        next
    }

    /// Sets OFFSET, written into the SQL text.
    #[must_use]
    pub fn offset(&self, offset: u64) -> Self {
        let mut next = self.clone();
        next.offset = Some(Bound::Inline(offset));
        next
    }

    /// Sets OFFSET as a bound parameter.
    #[must_use]
    pub fn offset_param(&self, offset: u32) -> Self {
        let mut next = self.clone();
        next.offset = Some(Bound::Param(offset));
        next
    }
}

impl Statement for Select<HasFrom> {
    fn write_to(&self, w: &mut SqlWriter<'_>) {
        w.push("SELECT ");
        if self.distinct {
            w.push("DISTINCT ");
        }
        w.push_separated(&self.projection, ", ", |w, item| {
            w.push_expr(item.expr());
            if let Some(alias) = item.alias() {
                w.push(" AS ");
                w.push(alias);
            }
        });

        if let Some(table) = &self.from {
            w.push(" FROM ");
            w.push(table.name());
        }

        for join in &self.joins {
            w.push(" ");
            w.push(join.kind().as_str());
            w.push(" ");
            w.push(join.table().name());
            w.push(" ON ");
            w.push_expr(join.on().expr());
        }

        if let Some(condition) = &self.where_clause {
            w.push(" WHERE ");
            w.push_expr(condition.expr());
        }

        if !self.group_by.is_empty() {
            w.push(" GROUP BY ");
            w.push_separated(&self.group_by, ", ", SqlWriter::push_expr);
        }

        if let Some(condition) = &self.having {
            w.push(" HAVING ");
            w.push_expr(condition.expr());
        }

        if !self.order_by.is_empty() {
            w.push(" ORDER BY ");
            w.push_separated(&self.order_by, ", ", |w, key| {
                w.push_expr(key.expr());
                w.push(" ");
                w.push(key.order().as_str());
            });
        }

        if let Some(limit) = self.limit {
            w.push(" LIMIT ");
            w.push_bound(limit);
        }

        if let Some(offset) = self.offset {
            w.push(" OFFSET ");
            w.push_bound(offset);
        }
    }
}
