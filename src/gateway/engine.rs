//! # Storage Engine Binding
//!
//! The gateway hands the engine SQL text plus an ordered list of bound
//! parameters; everything behind that seam belongs to the engine. Engine
//! failures surface as message strings, which the gateway pattern-matches
//! for the uniqueness-constraint case.
//!
//! `MemoryEngine` is an in-memory reference implementation that interprets
//! exactly the statement shapes the query builder emits. It backs the test
//! suite and the demo server; production deployments bind a real database
//! behind the same trait.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use super::coerce::SqlValue;

/// A result row: ordered column name to storage value.
pub type Row = Vec<(String, SqlValue)>;

/// Write-statement descriptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecOutcome {
    pub rows_affected: u64,
    pub last_insert_id: i64,
}

/// Engine-level failure, surfaced as a message string.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct EngineError(pub String);

/// Executes parameterized statements against a storage backend.
pub trait StorageEngine: Send + Sync {
    /// Runs a row-returning statement.
    fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, EngineError>;

    /// Runs a write statement.
    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome, EngineError>;
}

#[derive(Debug, Default)]
struct TableData {
    rows: Vec<Row>,
    next_rowid: i64,
}

/// In-memory storage engine understanding the query builder's dialect:
/// equality WHERE clauses, a single ORDER BY, `LIMIT ? OFFSET ?`, and
/// `COUNT(*)`. One column per table (the configured key column, `id` by
/// default) is enforced unique, mirroring a primary-key constraint.
pub struct MemoryEngine {
    tables: RwLock<HashMap<String, TableData>>,
    key_columns: HashMap<String, String>,
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            key_columns: HashMap::new(),
        }
    }

    /// Declares the unique key column for a table (default `id`).
    pub fn with_key_column(mut self, table: &str, column: &str) -> Self {
        self.key_columns
            .insert(table.to_string(), column.to_string());
        self
    }

    fn key_column(&self, table: &str) -> &str {
        self.key_columns
            .get(table)
            .map(String::as_str)
            .unwrap_or("id")
    }

    fn run_select(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, EngineError> {
        let rest = sql
            .strip_prefix("SELECT * FROM ")
            .ok_or_else(|| unsupported(sql))?;
        let (rest, paginated) = match rest.strip_suffix(" LIMIT ? OFFSET ?") {
            Some(r) => (r, true),
            None => (rest, false),
        };
        let (rest, order) = match rest.find(" ORDER BY ") {
            Some(pos) => {
                let clause = &rest[pos + " ORDER BY ".len()..];
                let mut parts = clause.split_whitespace();
                let column = parts.next().ok_or_else(|| unsupported(sql))?;
                let descending = parts.next() == Some("DESC");
                (&rest[..pos], Some((column.to_string(), descending)))
            }
            None => (rest, None),
        };
        let (table, conditions) = parse_where(rest)?;

        let n_conds = conditions.len();
        let cond_params = params.get(..n_conds).ok_or_else(|| unsupported(sql))?;
        let tables = self.tables.read().map_err(|_| poisoned())?;
        let mut rows: Vec<Row> = match tables.get(&table) {
            Some(data) => data
                .rows
                .iter()
                .filter(|row| matches(row, &conditions, cond_params))
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        if let Some((column, descending)) = order {
            rows.sort_by(|a, b| {
                let cmp = sql_cmp(row_get(a, &column), row_get(b, &column));
                if descending {
                    cmp.reverse()
                } else {
                    cmp
                }
            });
        }

        if paginated {
            let limit = int_param(params.get(n_conds))?;
            let offset = int_param(params.get(n_conds + 1))?;
            rows = rows
                .into_iter()
                .skip(offset.max(0) as usize)
                .take(limit.max(0) as usize)
                .collect();
        }

        Ok(rows)
    }

    fn run_count(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, EngineError> {
        let rest = sql
            .strip_prefix("SELECT COUNT(*) FROM ")
            .ok_or_else(|| unsupported(sql))?;
        let (table, conditions) = parse_where(rest)?;

        let tables = self.tables.read().map_err(|_| poisoned())?;
        let count = match tables.get(&table) {
            Some(data) => data
                .rows
                .iter()
                .filter(|row| matches(row, &conditions, params))
                .count(),
            None => 0,
        };
        Ok(vec![vec![(
            "COUNT(*)".to_string(),
            SqlValue::Integer(count as i64),
        )]])
    }

    fn run_insert(&self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome, EngineError> {
        let rest = sql
            .strip_prefix("INSERT INTO ")
            .ok_or_else(|| unsupported(sql))?;
        let (table, rest) = rest.split_once(" (").ok_or_else(|| unsupported(sql))?;
        let table = unquote(table);
        let (columns, _) = rest.split_once(')').ok_or_else(|| unsupported(sql))?;
        let columns: Vec<&str> = columns.split(", ").collect();
        if columns.len() != params.len() {
            return Err(unsupported(sql));
        }

        let mut row: Row = columns
            .iter()
            .zip(params)
            .map(|(c, v)| (c.to_string(), v.clone()))
            .collect();

        let key_column = self.key_column(&table).to_string();
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let data = tables.entry(table.clone()).or_default();
        if data.next_rowid == 0 {
            data.next_rowid = 1;
        }

        if let Some(key) = row_get(&row, &key_column) {
            let duplicate = data
                .rows
                .iter()
                .any(|existing| row_get(existing, &key_column).is_some_and(|v| sql_eq(v, key)));
            if duplicate {
                return Err(EngineError(format!(
                    "UNIQUE constraint failed: {}.{}",
                    table, key_column
                )));
            }
            if let SqlValue::Integer(i) = key {
                data.next_rowid = data.next_rowid.max(i + 1);
            }
        }

        let rowid = data.next_rowid;
        data.next_rowid += 1;
        if row_get(&row, &key_column).is_none() {
            row.insert(0, (key_column, SqlValue::Integer(rowid)));
        }
        data.rows.push(row);

        Ok(ExecOutcome {
            rows_affected: 1,
            last_insert_id: rowid,
        })
    }

    fn run_update(&self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome, EngineError> {
        let rest = sql
            .strip_prefix("UPDATE ")
            .ok_or_else(|| unsupported(sql))?;
        let (table, rest) = rest.split_once(" SET ").ok_or_else(|| unsupported(sql))?;
        let table = unquote(table);
        let (assignments, where_clause) =
            rest.split_once(" WHERE ").ok_or_else(|| unsupported(sql))?;
        let columns: Vec<&str> = assignments
            .split(", ")
            .map(|a| a.strip_suffix(" = ?").ok_or_else(|| unsupported(sql)))
            .collect::<Result<_, _>>()?;
        let conditions = parse_conditions(where_clause)?;
        if columns.len() + conditions.len() != params.len() {
            return Err(unsupported(sql));
        }
        let (values, cond_params) = params.split_at(columns.len());

        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let mut affected = 0u64;
        if let Some(data) = tables.get_mut(&table) {
            for row in data
                .rows
                .iter_mut()
                .filter(|row| matches(row, &conditions, cond_params))
            {
                for (column, value) in columns.iter().zip(values) {
                    match row.iter_mut().find(|(c, _)| c == column) {
                        Some(slot) => slot.1 = value.clone(),
                        None => row.push((column.to_string(), value.clone())),
                    }
                }
                affected += 1;
            }
        }

        Ok(ExecOutcome {
            rows_affected: affected,
            last_insert_id: 0,
        })
    }

    fn run_delete(&self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome, EngineError> {
        let rest = sql
            .strip_prefix("DELETE FROM ")
            .ok_or_else(|| unsupported(sql))?;
        let (table, conditions) = parse_where(rest)?;

        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let affected = match tables.get_mut(&table) {
            Some(data) => {
                let before = data.rows.len();
                data.rows.retain(|row| !matches(row, &conditions, params));
                (before - data.rows.len()) as u64
            }
            None => 0,
        };

        Ok(ExecOutcome {
            rows_affected: affected,
            last_insert_id: 0,
        })
    }
}

impl StorageEngine for MemoryEngine {
    fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, EngineError> {
        if sql.starts_with("SELECT COUNT(*)") {
            self.run_count(sql, params)
        } else {
            self.run_select(sql, params)
        }
    }

    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome, EngineError> {
        if sql.starts_with("INSERT") {
            self.run_insert(sql, params)
        } else if sql.starts_with("UPDATE") {
            self.run_update(sql, params)
        } else if sql.starts_with("DELETE") {
            self.run_delete(sql, params)
        } else {
            Err(unsupported(sql))
        }
    }
}

fn unsupported(sql: &str) -> EngineError {
    EngineError(format!("unsupported statement: {}", sql))
}

fn poisoned() -> EngineError {
    EngineError("lock poisoned".to_string())
}

fn unquote(table: &str) -> String {
    table.trim_matches('"').to_string()
}

/// Splits `<table>[ WHERE <col> = ? AND ...]` into the table name and the
/// condition column list.
fn parse_where(rest: &str) -> Result<(String, Vec<String>), EngineError> {
    match rest.split_once(" WHERE ") {
        Some((table, clause)) => Ok((unquote(table), parse_conditions(clause)?)),
        None => Ok((unquote(rest), Vec::new())),
    }
}

fn parse_conditions(clause: &str) -> Result<Vec<String>, EngineError> {
    clause
        .split(" AND ")
        .map(|cond| {
            cond.strip_suffix(" = ?")
                .map(str::to_string)
                .ok_or_else(|| unsupported(clause))
        })
        .collect()
}

fn row_get<'a>(row: &'a Row, column: &str) -> Option<&'a SqlValue> {
    row.iter().find(|(c, _)| c == column).map(|(_, v)| v)
}

fn matches(row: &Row, conditions: &[String], params: &[SqlValue]) -> bool {
    conditions.iter().zip(params).all(|(column, expected)| {
        row_get(row, column).is_some_and(|actual| sql_eq(actual, expected))
    })
}

fn sql_eq(a: &SqlValue, b: &SqlValue) -> bool {
    match (a, b) {
        (SqlValue::Integer(x), SqlValue::Real(y)) | (SqlValue::Real(y), SqlValue::Integer(x)) => {
            *x as f64 == *y
        }
        _ => a == b,
    }
}

fn sql_cmp(a: Option<&SqlValue>, b: Option<&SqlValue>) -> Ordering {
    fn numeric(v: &SqlValue) -> Option<f64> {
        match v {
            SqlValue::Integer(i) => Some(*i as f64),
            SqlValue::Real(f) => Some(*f),
            _ => None,
        }
    }
    match (a, b) {
        (Some(a), Some(b)) => match (numeric(a), numeric(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => match (a, b) {
                (SqlValue::Text(x), SqlValue::Text(y)) => x.cmp(y),
                _ => Ordering::Equal,
            },
        },
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

fn int_param(value: Option<&SqlValue>) -> Result<i64, EngineError> {
    match value {
        Some(SqlValue::Integer(i)) => Ok(*i),
        _ => Err(EngineError("missing pagination parameter".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(engine: &MemoryEngine, table: &str, columns: &str, params: Vec<SqlValue>) {
        let placeholders = vec!["?"; params.len()].join(", ");
        engine
            .execute(
                &format!(
                    "INSERT INTO {} ({}) VALUES ({})",
                    table, columns, placeholders
                ),
                &params,
            )
            .unwrap();
    }

    #[test]
    fn test_insert_and_select() {
        let engine = MemoryEngine::new();
        insert(
            &engine,
            "items",
            "name, price",
            vec![SqlValue::Text("a".to_string()), SqlValue::Integer(10)],
        );

        let rows = engine
            .query("SELECT * FROM items ORDER BY id ASC", &[])
            .unwrap();
        assert_eq!(rows.len(), 1);
        // Key column was auto-assigned.
        assert_eq!(row_get(&rows[0], "id"), Some(&SqlValue::Integer(1)));
        assert_eq!(
            row_get(&rows[0], "name"),
            Some(&SqlValue::Text("a".to_string()))
        );
    }

    #[test]
    fn test_where_filtering() {
        let engine = MemoryEngine::new();
        for (name, cat) in [("a", "x"), ("b", "y"), ("c", "x")] {
            insert(
                &engine,
                "items",
                "name, category",
                vec![
                    SqlValue::Text(name.to_string()),
                    SqlValue::Text(cat.to_string()),
                ],
            );
        }

        let rows = engine
            .query(
                "SELECT * FROM items WHERE category = ? ORDER BY id ASC",
                &[SqlValue::Text("x".to_string())],
            )
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_order_and_pagination() {
        let engine = MemoryEngine::new();
        for price in [30, 10, 50, 20, 40] {
            insert(&engine, "items", "price", vec![SqlValue::Integer(price)]);
        }

        let rows = engine
            .query(
                "SELECT * FROM items ORDER BY price DESC LIMIT ? OFFSET ?",
                &[SqlValue::Integer(2), SqlValue::Integer(1)],
            )
            .unwrap();
        let prices: Vec<_> = rows.iter().map(|r| row_get(r, "price").cloned()).collect();
        assert_eq!(
            prices,
            vec![Some(SqlValue::Integer(40)), Some(SqlValue::Integer(30))]
        );
    }

    #[test]
    fn test_count() {
        let engine = MemoryEngine::new();
        for i in 0..4 {
            insert(&engine, "items", "n", vec![SqlValue::Integer(i)]);
        }
        let rows = engine.query("SELECT COUNT(*) FROM items", &[]).unwrap();
        assert_eq!(rows[0][0].1, SqlValue::Integer(4));
    }

    #[test]
    fn test_unique_violation_on_duplicate_key() {
        let engine = MemoryEngine::new().with_key_column("quizzes", "slug");
        insert(
            &engine,
            "quizzes",
            "slug",
            vec![SqlValue::Text("intro".to_string())],
        );

        let err = engine
            .execute(
                "INSERT INTO quizzes (slug) VALUES (?)",
                &[SqlValue::Text("intro".to_string())],
            )
            .unwrap_err();
        assert_eq!(err.0, "UNIQUE constraint failed: quizzes.slug");
    }

    #[test]
    fn test_update_affects_matching_rows() {
        let engine = MemoryEngine::new();
        insert(
            &engine,
            "items",
            "id, name",
            vec![SqlValue::Integer(7), SqlValue::Text("old".to_string())],
        );

        let outcome = engine
            .execute(
                "UPDATE items SET name = ? WHERE id = ?",
                &[SqlValue::Text("new".to_string()), SqlValue::Integer(7)],
            )
            .unwrap();
        assert_eq!(outcome.rows_affected, 1);

        let outcome = engine
            .execute(
                "UPDATE items SET name = ? WHERE id = ?",
                &[SqlValue::Text("x".to_string()), SqlValue::Integer(99)],
            )
            .unwrap();
        assert_eq!(outcome.rows_affected, 0);
    }

    #[test]
    fn test_delete_reports_affected_rows() {
        let engine = MemoryEngine::new();
        insert(&engine, "items", "id", vec![SqlValue::Integer(1)]);

        let outcome = engine
            .execute("DELETE FROM items WHERE id = ?", &[SqlValue::Integer(1)])
            .unwrap();
        assert_eq!(outcome.rows_affected, 1);

        let outcome = engine
            .execute("DELETE FROM items WHERE id = ?", &[SqlValue::Integer(1)])
            .unwrap();
        assert_eq!(outcome.rows_affected, 0);
    }

    #[test]
    fn test_quoted_table_names() {
        let engine = MemoryEngine::new();
        insert(&engine, "\"order\"", "n", vec![SqlValue::Integer(1)]);
        let rows = engine
            .query("SELECT * FROM \"order\" ORDER BY id ASC", &[])
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_unsupported_statement() {
        let engine = MemoryEngine::new();
        assert!(engine.execute("TRUNCATE items", &[]).is_err());
        assert!(engine.query("SELECT name FROM items", &[]).is_err());
    }

    #[test]
    fn test_select_with_missing_params_is_an_error() {
        let engine = MemoryEngine::new();
        insert(&engine, "items", "id", vec![SqlValue::Integer(1)]);
        // A hand-written statement with fewer parameters than WHERE
        // conditions must fail, not panic.
        let result = engine.query("SELECT * FROM items WHERE id = ?", &[]);
        assert!(result.is_err());
    }
}
