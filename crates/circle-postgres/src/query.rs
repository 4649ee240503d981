//! SQL builders for each read.

use circle_core::model::VISIBLE_EVENT_STATUSES;
use circle_core::store::{DealQuery, EventOrder, EventQuery, LocalityFilter, Lookup, Table};
use sqlx::{Postgres, QueryBuilder};

use crate::columns::{
    select_list, DEAL_COLUMNS, EVENT_COLUMNS, LOCALITY_SUMMARY_COLUMNS, REGISTRY_COLUMNS,
};

/// Locality text slugified in SQL, matching `normalize::slugify`.
const LOCALITY_SLUG_SQL: &str =
    "trim(both '-' from regexp_replace(replace(lower(trim(locality)), '&', ' and '), '[^a-z0-9]+', '-', 'g'))";

type Sql = QueryBuilder<'static, Postgres>;

/// `SELECT to_jsonb(t) FROM (SELECT <columns> FROM <table> WHERE true`
fn select(table: Table, columns: &[&str]) -> Sql {
    let mut qb = QueryBuilder::new("SELECT to_jsonb(t) FROM (SELECT ");
    qb.push(select_list(columns))
        .push(" FROM ")
        .push(table.name())
        .push(" WHERE true");
    qb
}

/// `SELECT to_jsonb(t) FROM <table> t WHERE true`
///
/// The whole row is converted, so reads survive optional columns that a
/// deployment does not have.
fn select_row(table: Table) -> Sql {
    let mut qb = QueryBuilder::new("SELECT to_jsonb(t) FROM ");
    qb.push(table.name()).push(" t WHERE true");
    qb
}

fn order_limit(qb: &mut Sql, order_by: &str, limit: usize) {
    qb.push(" ORDER BY ").push(order_by).push(" LIMIT ");
    qb.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
}

fn finish(mut qb: Sql, order_by: &str, limit: usize) -> Sql {
    order_limit(&mut qb, order_by, limit);
    qb.push(") t");
    qb
}

fn push_lookup(qb: &mut Sql, lookup: Lookup<'_>, name_column: &str) {
    match lookup {
        Lookup::Slug(slug) => {
            qb.push(" AND slug = ").push_bind(slug.to_string());
        }
        Lookup::Id(id) => {
            qb.push(" AND id::text = ").push_bind(id.to_string());
        }
        Lookup::Name(name) => {
            qb.push(" AND lower(trim(")
                .push(name_column)
                .push(")) = lower(trim(")
                .push_bind(name.to_string())
                .push("))");
        }
    }
}

fn push_category(qb: &mut Sql, category: Option<&str>) {
    if let Some(category) = category {
        qb.push(" AND lower(trim(category)) = lower(")
            .push_bind(category.to_string())
            .push(")");
    }
}

fn push_locality(qb: &mut Sql, filter: Option<&LocalityFilter>) {
    if let Some(filter) = filter {
        qb.push(" AND (lower(trim(locality)) = lower(trim(")
            .push_bind(filter.name.clone())
            .push(")) OR ")
            .push(LOCALITY_SLUG_SQL)
            .push(" = ")
            .push_bind(filter.slug.clone())
            .push(")");
    }
}

fn push_visible(qb: &mut Sql) {
    let statuses: Vec<String> = VISIBLE_EVENT_STATUSES.iter().map(|s| s.to_string()).collect();
    qb.push(" AND lower(trim(status)) = ANY(")
        .push_bind(statuses)
        .push(")");
}

pub(crate) fn registry_entry(path: &str) -> Sql {
    let mut qb = select(Table::Registry, REGISTRY_COLUMNS);
    qb.push(" AND url_path = ").push_bind(path.to_string());
    finish(qb, "updated_at DESC NULLS LAST", 1)
}

pub(crate) fn registry_entries(page_type: &str, limit: usize) -> Sql {
    let mut qb = select(Table::Registry, REGISTRY_COLUMNS);
    qb.push(" AND lower(trim(page_type)) = ")
        .push_bind(page_type.to_string())
        .push(" AND coalesce(lower(trim(index_state)), 'index') <> 'noindex'");
    finish(qb, "updated_at DESC NULLS LAST", limit)
}

pub(crate) fn locality(lookup: Lookup<'_>) -> Sql {
    let mut qb = select_row(Table::Localities);
    push_lookup(&mut qb, lookup, "name");
    order_limit(&mut qb, "name ASC", 1);
    qb
}

pub(crate) fn localities(limit: usize) -> Sql {
    let qb = select(Table::Localities, LOCALITY_SUMMARY_COLUMNS);
    finish(qb, "name ASC", limit)
}

pub(crate) fn event(lookup: Lookup<'_>) -> Sql {
    let mut qb = select(Table::Events, EVENT_COLUMNS);
    push_visible(&mut qb);
    push_lookup(&mut qb, lookup, "title");
    finish(qb, "start_date ASC NULLS LAST", 1)
}

pub(crate) fn events(query: &EventQuery) -> Sql {
    let mut qb = select(Table::Events, EVENT_COLUMNS);
    push_visible(&mut qb);
    push_category(&mut qb, query.category.as_deref());
    push_locality(&mut qb, query.locality.as_ref());
    if let Some(after) = &query.starts_after {
        qb.push(" AND start_date >= CAST(")
            .push_bind(after.clone())
            .push(" AS timestamptz)");
    }
    let order = match query.order {
        EventOrder::StartAscending => "start_date ASC NULLS LAST",
        EventOrder::StartDescending => "start_date DESC NULLS LAST",
    };
    finish(qb, order, query.limit)
}

pub(crate) fn deal(lookup: Lookup<'_>) -> Sql {
    let mut qb = select(Table::Deals, DEAL_COLUMNS);
    push_lookup(&mut qb, lookup, "title");
    finish(qb, "updated_at DESC NULLS LAST", 1)
}

pub(crate) fn deals(query: &DealQuery) -> Sql {
    let mut qb = select(Table::Deals, DEAL_COLUMNS);
    push_category(&mut qb, query.category.as_deref());
    push_locality(&mut qb, query.locality.as_ref());
    finish(qb, "updated_at DESC NULLS LAST", query.limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup_sql() {
        let qb = registry_entry("/jaipur/malviya-nagar");
        assert_eq!(
            qb.sql(),
            "SELECT to_jsonb(t) FROM (SELECT url_path, page_type, entity_table, entity_id, \
             entity_key, canonical_url, index_state, title, updated_at, last_published_at \
             FROM page_registry WHERE true AND url_path = $1 \
             ORDER BY updated_at DESC NULLS LAST LIMIT $2) t"
        );
    }

    #[test]
    fn test_registry_listing_skips_noindex() {
        let qb = registry_entries("locality", 5000);
        assert!(qb.sql().contains("coalesce(lower(trim(index_state)), 'index') <> 'noindex'"));
        assert!(qb.sql().contains("lower(trim(page_type)) = $1"));
    }

    #[test]
    fn test_event_lookup_is_visibility_gated() {
        let qb = event(Lookup::Slug("jazz-night"));
        let sql = qb.sql();
        assert!(sql.contains("lower(trim(status)) = ANY($1)"));
        assert!(sql.contains("AND slug = $2"));
        assert!(!sql.contains('*'));
    }

    #[test]
    fn test_event_listing_filters() {
        let query = EventQuery::new(10)
            .with_category("music")
            .with_locality("malviya-nagar", "Malviya Nagar")
            .starting_after("2026-01-01T00:00:00Z")
            .with_order(EventOrder::StartDescending);
        let qb = events(&query);
        let sql = qb.sql();
        assert!(sql.contains("lower(trim(category)) = lower($2)"));
        assert!(sql.contains("lower(trim(locality)) = lower(trim($3))"));
        assert!(sql.contains(" = $4)"));
        assert!(sql.contains("start_date >= CAST($5 AS timestamptz)"));
        assert!(sql.ends_with("ORDER BY start_date DESC NULLS LAST LIMIT $6) t"));
    }

    #[test]
    fn test_locality_reads_whole_row() {
        let qb = locality(Lookup::Slug("bani-park"));
        assert_eq!(
            qb.sql(),
            "SELECT to_jsonb(t) FROM localities t WHERE true AND slug = $1 \
             ORDER BY name ASC LIMIT $2"
        );
    }

    #[test]
    fn test_lookup_by_name_and_id() {
        let qb = locality(Lookup::Name("Malviya Nagar"));
        assert!(qb.sql().contains("lower(trim(name)) = lower(trim($1))"));
        let qb = deal(Lookup::Id("42"));
        assert!(qb.sql().contains("id::text = $1"));
        let qb = event(Lookup::Name("Jazz Night"));
        assert!(qb.sql().contains("lower(trim(title)) = lower(trim($2))"));
    }

    #[test]
    fn test_unfiltered_deals() {
        let qb = deals(&DealQuery::new(2000));
        assert!(qb.sql().ends_with(
            "FROM deals WHERE true ORDER BY updated_at DESC NULLS LAST LIMIT $1) t"
        ));
    }
}
