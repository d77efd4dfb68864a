use sea_orm::prelude::Expr;
use sea_orm::sea_query::{ExprTrait, LikeExpr};
use sea_orm::{ColumnTrait, Condition, EntityTrait, Order, QueryFilter, QuerySelect, Select};

use crate::entity::app_version::{Column, Entity};
use crate::models::app_version::AppVersionCriteria;
use crate::models::filter::{Filter, RangeFilter, StringFilter};

/// Build the select for a criteria: `DISTINCT` is applied first when
/// requested, then the AND-composed condition. An empty criteria produces an
/// unconstrained select that matches every record.
pub fn select(criteria: &AppVersionCriteria) -> Select<Entity> {
    let mut query = Entity::find();
    if criteria.distinct == Some(true) {
        query = query.distinct();
    }
    query.filter(condition(criteria))
}

/// The conjunction of one sub-condition per non-absent field filter. Absent
/// fields contribute no constraint.
pub fn condition(criteria: &AppVersionCriteria) -> Condition {
    let mut cond = Condition::all();

    if let Some(f) = &criteria.id {
        cond = add(cond, filter_condition(Column::Id, f));
    }
    if let Some(f) = &criteria.major {
        cond = add(cond, range_condition(Column::Major, f));
    }
    if let Some(f) = &criteria.minor {
        cond = add(cond, range_condition(Column::Minor, f));
    }
    if let Some(f) = &criteria.patch {
        cond = add(cond, range_condition(Column::Patch, f));
    }
    if let Some(f) = &criteria.release_date {
        cond = add(cond, range_condition(Column::ReleaseDate, f));
    }
    if let Some(f) = &criteria.description {
        cond = add(cond, string_condition(Column::Description, f));
    }
    if let Some(f) = &criteria.location {
        cond = add(cond, string_condition(Column::Location, f));
    }
    if let Some(f) = &criteria.r#type {
        cond = add(cond, filter_condition(Column::Type, f));
    }
    if let Some(f) = &criteria.created_by {
        cond = add(cond, string_condition(Column::CreatedBy, f));
    }
    if let Some(f) = &criteria.created_date {
        cond = add(cond, range_condition(Column::CreatedDate, f));
    }
    if let Some(f) = &criteria.last_modified_by {
        cond = add(cond, string_condition(Column::LastModifiedBy, f));
    }
    if let Some(f) = &criteria.last_modified_date {
        cond = add(cond, range_condition(Column::LastModifiedDate, f));
    }

    cond
}

/// Resolve a camelCase sort key to its column, used by the list operation.
pub fn sort_column(name: &str) -> Option<Column> {
    match name {
        "id" => Some(Column::Id),
        "major" => Some(Column::Major),
        "minor" => Some(Column::Minor),
        "patch" => Some(Column::Patch),
        "releaseDate" => Some(Column::ReleaseDate),
        "description" => Some(Column::Description),
        "location" => Some(Column::Location),
        "type" => Some(Column::Type),
        "createdBy" => Some(Column::CreatedBy),
        "createdDate" => Some(Column::CreatedDate),
        "lastModifiedBy" => Some(Column::LastModifiedBy),
        "lastModifiedDate" => Some(Column::LastModifiedDate),
        _ => None,
    }
}

/// `asc`, `desc` or absent (defaults to descending); anything else is
/// rejected by the caller as a bad request.
pub fn sort_order(name: Option<&str>) -> Option<Order> {
    match name {
        Some("asc") => Some(Order::Asc),
        Some("desc") | None => Some(Order::Desc),
        Some(_) => None,
    }
}

fn add(cond: Condition, sub: Condition) -> Condition {
    if sub.is_empty() { cond } else { cond.add(sub) }
}

fn filter_condition<T>(col: Column, f: &Filter<T>) -> Condition
where
    T: Clone + Into<sea_orm::Value>,
{
    let mut cond = Condition::all();
    if let Some(v) = &f.equals {
        cond = cond.add(col.eq(v.clone()));
    }
    if let Some(v) = &f.not_equals {
        cond = cond.add(col.ne(v.clone()));
    }
    if let Some(vs) = &f.is_in {
        cond = cond.add(col.is_in(vs.clone()));
    }
    if let Some(vs) = &f.not_in {
        cond = cond.add(col.is_not_in(vs.clone()));
    }
    match f.specified {
        Some(true) => cond = cond.add(col.is_not_null()),
        Some(false) => cond = cond.add(col.is_null()),
        None => {}
    }
    cond
}

fn range_condition<T>(col: Column, f: &RangeFilter<T>) -> Condition
where
    T: Clone + Into<sea_orm::Value>,
{
    let mut cond = filter_condition(col, &f.common);
    if let Some(v) = &f.greater_than {
        cond = cond.add(col.gt(v.clone()));
    }
    if let Some(v) = &f.greater_than_or_equal {
        cond = cond.add(col.gte(v.clone()));
    }
    if let Some(v) = &f.less_than {
        cond = cond.add(col.lt(v.clone()));
    }
    if let Some(v) = &f.less_than_or_equal {
        cond = cond.add(col.lte(v.clone()));
    }
    cond
}

fn string_condition(col: Column, f: &StringFilter) -> Condition {
    let mut cond = filter_condition(col, &f.common);
    if let Some(s) = &f.contains {
        cond = cond.add(Expr::col(col).like(like_pattern(s)));
    }
    if let Some(s) = &f.does_not_contain {
        cond = cond.add(Expr::col(col).not_like(like_pattern(s)));
    }
    cond
}

/// Case-sensitive substring pattern with LIKE wildcards escaped.
fn like_pattern(s: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(s))).escape('\\')
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
