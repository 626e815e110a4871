//! # Query Builder
//!
//! Assembles parameterized CRUD statements from a table name, an optional
//! row id, filter/sort/pagination parameters, and a payload body. Every
//! identifier passes through the sanitizer; every value is bound as a
//! parameter, never interpolated.

use serde_json::{Map, Value};

use super::coerce::{self, SqlValue};
use super::errors::{GatewayError, GatewayResult};
use super::ident::{sanitize, table_ident};
use super::params::ListParams;

/// A parameterized statement ready for the storage engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Builds the row query for a collection or id-scoped read.
///
/// An id lookup is always a single-row fetch: pagination and sorting are
/// omitted. Collection reads always carry an ORDER BY clause, defaulting to
/// the identifying column, so ordering is deterministic.
pub fn build_select(
    table: &str,
    id: Option<&str>,
    id_column: &str,
    params: &ListParams,
) -> Statement {
    let table = table_ident(table);
    let id_column = sanitize(id_column);
    let mut sql = format!("SELECT * FROM {}", table);
    let mut bound = Vec::new();
    push_where(&mut sql, &mut bound, id, &id_column, &params.filters);

    if id.is_none() {
        let sort = params
            .sort_by
            .as_deref()
            .map(sanitize)
            .filter(|s| !s.is_empty())
            .unwrap_or(id_column);
        sql.push_str(&format!(" ORDER BY {} {}", sort, params.order.as_sql()));

        if params.pagination.is_paginated() {
            sql.push_str(" LIMIT ? OFFSET ?");
            bound.push(SqlValue::Integer(params.pagination.limit));
            bound.push(SqlValue::Integer(params.pagination.offset()));
        }
    }

    Statement { sql, params: bound }
}

/// Builds the companion COUNT statement for a paginated collection read.
///
/// Binds the identical WHERE clause and filter parameters as the row query,
/// excluding the two pagination parameters.
pub fn build_count(
    table: &str,
    id_column: &str,
    filters: &[(String, Value)],
) -> Statement {
    let table = table_ident(table);
    let id_column = sanitize(id_column);
    let mut sql = format!("SELECT COUNT(*) FROM {}", table);
    let mut bound = Vec::new();
    push_where(&mut sql, &mut bound, None, &id_column, filters);
    Statement { sql, params: bound }
}

/// Builds an INSERT from a payload row.
pub fn build_insert(table: &str, payload: &Value) -> GatewayResult<Statement> {
    let fields = payload_fields(payload)?;
    let table = table_ident(table);

    let mut columns = Vec::new();
    let mut placeholders = Vec::new();
    let mut bound = Vec::new();
    for (column, value) in fields {
        let column = sanitize(column);
        if column.is_empty() {
            continue;
        }
        columns.push(column);
        placeholders.push("?");
        bound.push(coerce::to_storage(value));
    }
    if columns.is_empty() {
        return Err(GatewayError::Validation(
            "payload must contain at least one column".to_string(),
        ));
    }

    Ok(Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        ),
        params: bound,
    })
}

/// Builds an UPDATE from a payload row; the id parameter binds last.
pub fn build_update(
    table: &str,
    id: &str,
    id_column: &str,
    payload: &Value,
) -> GatewayResult<Statement> {
    let fields = payload_fields(payload)?;
    let table = table_ident(table);
    let id_column = sanitize(id_column);

    let mut assignments = Vec::new();
    let mut bound = Vec::new();
    for (column, value) in fields {
        let column = sanitize(column);
        if column.is_empty() {
            continue;
        }
        assignments.push(format!("{} = ?", column));
        bound.push(coerce::to_storage(value));
    }
    if assignments.is_empty() {
        return Err(GatewayError::Validation(
            "payload must contain at least one column".to_string(),
        ));
    }
    bound.push(id_param(id));

    Ok(Statement {
        sql: format!(
            "UPDATE {} SET {} WHERE {} = ?",
            table,
            assignments.join(", "),
            id_column
        ),
        params: bound,
    })
}

/// Builds a DELETE for a single row.
pub fn build_delete(table: &str, id: &str, id_column: &str) -> Statement {
    let table = table_ident(table);
    let id_column = sanitize(id_column);
    Statement {
        sql: format!("DELETE FROM {} WHERE {} = ?", table, id_column),
        params: vec![id_param(id)],
    }
}

fn push_where(
    sql: &mut String,
    bound: &mut Vec<SqlValue>,
    id: Option<&str>,
    id_column: &str,
    filters: &[(String, Value)],
) {
    let mut clauses = Vec::new();
    if let Some(id) = id {
        clauses.push(format!("{} = ?", id_column));
        bound.push(id_param(id));
    }
    for (column, value) in filters {
        let column = sanitize(column);
        if column.is_empty() {
            continue;
        }
        clauses.push(format!("{} = ?", column));
        bound.push(coerce::to_storage(value));
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
}

/// Path-segment ids are text on the wire; numeric ids bind as integers so
/// they compare against integer-typed key columns.
fn id_param(id: &str) -> SqlValue {
    id.parse::<i64>()
        .map(SqlValue::Integer)
        .unwrap_or_else(|_| SqlValue::Text(id.to_string()))
}

/// Create and Update accept only a plain JSON object as the payload row.
fn payload_fields(payload: &Value) -> GatewayResult<&Map<String, Value>> {
    payload.as_object().ok_or_else(|| {
        GatewayError::Validation("request body must be a JSON object".to_string())
    })
}
