//! # Gateway Handler
//!
//! Drives the per-request pipeline: resolve the identifying column, build
//! the statement, execute it against the storage engine, hydrate the
//! result. Stateless across requests; all work within one request is
//! sequential.

use serde_json::{json, Value};

use crate::observability::{Logger, Severity};

use super::coerce;
use super::engine::{EngineError, StorageEngine};
use super::errors::{GatewayError, GatewayResult};
use super::params::ListParams;
use super::pkey::PrimaryKeys;
use super::query;
use super::response::PaginationMeta;

/// Operation handlers over an injected storage engine.
pub struct Gateway<E: StorageEngine> {
    engine: E,
    primary_keys: PrimaryKeys,
}

impl<E: StorageEngine> Gateway<E> {
    pub fn new(engine: E, primary_keys: PrimaryKeys) -> Self {
        Self {
            engine,
            primary_keys,
        }
    }

    /// Collection read: hydrated rows plus pagination metadata.
    ///
    /// When paginated, a second COUNT statement with the identical WHERE
    /// clause computes the total; unpaginated reads report a single
    /// implicit page and echo the row count as the limit.
    pub fn list(
        &self,
        table: &str,
        params: &ListParams,
    ) -> GatewayResult<(Vec<Value>, PaginationMeta)> {
        let id_column = self.primary_keys.resolve(table);
        let stmt = query::build_select(table, None, id_column, params);
        let rows = self
            .engine
            .query(&stmt.sql, &stmt.params)
            .map_err(storage_error)?;
        let results: Vec<Value> = rows
            .into_iter()
            .map(|row| Value::Object(coerce::hydrate_row(row)))
            .collect();

        let pagination = if params.pagination.is_paginated() {
            let count_stmt = query::build_count(table, id_column, &params.filters);
            let count_rows = self
                .engine
                .query(&count_stmt.sql, &count_stmt.params)
                .map_err(storage_error)?;
            let total = count_rows
                .first()
                .and_then(|row| row.first())
                .map(|(_, value)| match value {
                    coerce::SqlValue::Integer(i) => *i,
                    coerce::SqlValue::Real(f) => *f as i64,
                    _ => 0,
                })
                .unwrap_or(0);
            PaginationMeta {
                total_items: total,
                total_pages: params.pagination.total_pages(total),
                current_page: params.pagination.page,
                limit: params.pagination.limit,
            }
        } else {
            let total = results.len() as i64;
            PaginationMeta {
                total_items: total,
                total_pages: 1,
                current_page: 1,
                limit: total,
            }
        };

        Ok((results, pagination))
    }

    /// Id-scoped read: a single hydrated row, or NotFound.
    pub fn get(&self, table: &str, id: &str) -> GatewayResult<Value> {
        let id_column = self.primary_keys.resolve(table);
        let stmt = query::build_select(table, Some(id), id_column, &ListParams::default());
        let rows = self
            .engine
            .query(&stmt.sql, &stmt.params)
            .map_err(storage_error)?;
        rows.into_iter()
            .next()
            .map(|row| Value::Object(coerce::hydrate_row(row)))
            .ok_or(GatewayError::NotFound)
    }

    /// Create: returns the identifying-column value, the payload's own if
    /// present (e.g. a caller-supplied slug), otherwise the engine-assigned
    /// row id. Uniqueness violations become Conflict.
    pub fn create(&self, table: &str, payload: &Value) -> GatewayResult<Value> {
        let id_column = self.primary_keys.resolve(table);
        let stmt = query::build_insert(table, payload)?;
        let outcome = self
            .engine
            .execute(&stmt.sql, &stmt.params)
            .map_err(|err| classify_create_error(table, err))?;

        let id = payload
            .get(id_column)
            .cloned()
            .unwrap_or_else(|| Value::from(outcome.last_insert_id));
        Ok(json!({ id_column: id }))
    }

    /// Update: echoes the submitted pre-coercion payload. The affected-row
    /// count is deliberately not checked; updating a missing id succeeds
    /// with zero effect.
    pub fn update(&self, table: &str, id: &str, payload: &Value) -> GatewayResult<Value> {
        let id_column = self.primary_keys.resolve(table);
        let stmt = query::build_update(table, id, id_column, payload)?;
        self.engine
            .execute(&stmt.sql, &stmt.params)
            .map_err(storage_error)?;
        Ok(payload.clone())
    }

    /// Delete: succeeds only when the engine reports at least one affected
    /// row. The one operation that checks the affected-row count.
    pub fn delete(&self, table: &str, id: &str) -> GatewayResult<Value> {
        let id_column = self.primary_keys.resolve(table);
        let stmt = query::build_delete(table, id, id_column);
        let outcome = self
            .engine
            .execute(&stmt.sql, &stmt.params)
            .map_err(storage_error)?;
        if outcome.rows_affected == 0 {
            return Err(GatewayError::NotFound);
        }
        Ok(json!({ "deleted": true }))
    }
}

fn storage_error(err: EngineError) -> GatewayError {
    Logger::log(Severity::Error, "storage_error", &[("message", &err.0)]);
    GatewayError::Storage(err.0)
}

/// Engine errors carry no structure, only text; the uniqueness case is
/// recognized by pattern-matching the message.
fn classify_create_error(table: &str, err: EngineError) -> GatewayError {
    if err.0.to_ascii_lowercase().contains("unique") {
        Logger::log(
            Severity::Warn,
            "create_conflict",
            &[("table", table), ("message", &err.0)],
        );
        GatewayError::Conflict(format!(
            "a record with this identifier already exists in {}",
            table
        ))
    } else {
        storage_error(err)
    }
}
