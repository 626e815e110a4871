//! # Query Parameter Parsing
//!
//! Turns the raw query string into equality filters, a sort clause, and
//! pagination state. `sort_by`, `order`, `limit` and `page` are reserved
//! control parameters; everything else becomes a column filter, in order of
//! appearance.

use serde_json::Value;

use super::errors::{GatewayError, GatewayResult};

/// Sort direction for the ORDER BY clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Any literal other than `desc` normalizes to ascending.
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Pagination state derived from `limit` and `page`.
///
/// `limit <= 0` means "no pagination": all matching rows, one implicit page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub page: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { limit: 0, page: 1 }
    }
}

impl Pagination {
    /// Page is clamped to a minimum of 1.
    pub fn new(limit: i64, page: i64) -> Self {
        Self {
            limit,
            page: page.max(1),
        }
    }

    pub fn is_paginated(&self) -> bool {
        self.limit > 0
    }

    /// (page - 1) * limit, saturating: both values come straight off the
    /// query string and may be arbitrarily large.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// ceil(total / limit), or 1 when unpaginated.
    pub fn total_pages(&self, total: i64) -> i64 {
        if self.is_paginated() {
            total.saturating_add(self.limit - 1) / self.limit
        } else {
            1
        }
    }
}

/// Parsed collection-read parameters.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    /// Ordered (column, value) equality constraints.
    pub filters: Vec<(String, Value)>,
    pub sort_by: Option<String>,
    pub order: SortDirection,
    pub pagination: Pagination,
}

impl ListParams {
    /// Parses query-string pairs, preserving filter order of appearance.
    pub fn parse(query: &[(String, String)]) -> GatewayResult<Self> {
        let mut params = ListParams::default();
        let mut limit = 0i64;
        let mut page = 1i64;

        for (key, value) in query {
            match key.as_str() {
                "sort_by" => params.sort_by = Some(value.clone()),
                "order" => params.order = SortDirection::parse(value),
                "limit" => limit = parse_integer("limit", value)?,
                "page" => page = parse_integer("page", value)?,
                _ => params
                    .filters
                    .push((key.clone(), parse_filter_value(value))),
            }
        }

        params.pagination = Pagination::new(limit, page);
        Ok(params)
    }
}

fn parse_integer(name: &str, raw: &str) -> GatewayResult<i64> {
    raw.parse()
        .map_err(|_| GatewayError::Validation(format!("invalid {}: {}", name, raw)))
}

/// Query-string values are untyped text; numeric and boolean literals are
/// promoted so they bind with the same shape the write path produces.
fn parse_filter_value(raw: &str) -> Value {
    match raw {
        "null" => return Value::Null,
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(raw.to_string())
}
