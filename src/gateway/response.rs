//! # Response Envelope
//!
//! The uniform JSON envelope returned by every operation, success or
//! failure: `{success, result|results, error?, pagination?}`.

use serde::Serialize;
use serde_json::Value;

/// Pagination metadata for collection reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub total_items: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub limit: i64,
}

/// Uniform response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
}

impl Envelope {
    /// Single-record success
    pub fn record(result: Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            results: None,
            error: None,
            pagination: None,
        }
    }

    /// Collection success with pagination metadata
    pub fn records(results: Vec<Value>, pagination: PaginationMeta) -> Self {
        Self {
            success: true,
            result: None,
            results: Some(results),
            error: None,
            pagination: Some(pagination),
        }
    }

    /// Failure envelope; pairs with the error's HTTP status code
    pub fn failure(error: String) -> Self {
        Self {
            success: false,
            result: None,
            results: None,
            error: Some(error),
            pagination: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_envelope_serialization() {
        let envelope = Envelope::record(json!({"id": 7}));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["result"]["id"], json!(7));
        assert!(value.get("results").is_none());
        assert!(value.get("error").is_none());
        assert!(value.get("pagination").is_none());
    }

    #[test]
    fn test_records_envelope_serialization() {
        let meta = PaginationMeta {
            total_items: 12,
            total_pages: 3,
            current_page: 2,
            limit: 5,
        };
        let envelope = Envelope::records(vec![json!({"id": 1})], meta);
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["results"].as_array().unwrap().len(), 1);
        assert_eq!(value["pagination"]["total_items"], json!(12));
        assert_eq!(value["pagination"]["current_page"], json!(2));
    }

    #[test]
    fn test_failure_envelope_serialization() {
        let envelope = Envelope::failure("record not found".to_string());
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["error"], json!("record not found"));
        assert!(value.get("result").is_none());
    }
}
