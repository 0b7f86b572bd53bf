//! Request and response types for the preview endpoints

use preview_cache::{CacheStats, Handle};
use preview_render::{OutputFormat, ReportError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of a submit (PUT) request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[serde(default, alias = "definition")]
    pub report: Value,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub output_format: Option<String>,
    #[serde(default, alias = "isSample", deserialize_with = "truthy")]
    pub is_test_data: bool,
}

/// Body of a fetch (GET) request that carries no handle
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineReport {
    #[serde(default, alias = "definition")]
    pub report: Option<Value>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, alias = "isSample", deserialize_with = "truthy")]
    pub is_test_data: bool,
}

/// Read any JSON value as a flag: null, false, zero and empty values are false
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    })
}

/// Query string of a fetch (GET) request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchQuery {
    pub output_format: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

/// Result of a submit that did not fail outright
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The preview was rendered and cached under this handle
    Cached(Handle),
    /// The definition has problems the designer should highlight
    Rejected(Vec<ReportError>),
}

/// A rendered artifact ready to send
#[derive(Debug, Clone)]
pub struct Artifact {
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
    /// True when cached bytes were returned without rendering
    pub from_cache: bool,
}

/// Structured report errors returned with a 200 status
#[derive(Debug, Serialize)]
pub struct ReportErrorsResponse {
    pub errors: Vec<ReportError>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub cache: CacheStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_submit_request_wire_names() {
        let request: SubmitRequest = serde_json::from_value(json!({
            "report": {"docElements": []},
            "data": {"x": 1},
            "outputFormat": "pdf",
            "isTestData": true
        }))
        .unwrap();

        assert_eq!(request.report, json!({"docElements": []}));
        assert_eq!(request.data, json!({"x": 1}));
        assert_eq!(request.output_format.as_deref(), Some("pdf"));
        assert!(request.is_test_data);
    }

    #[test]
    fn test_submit_request_aliases_and_defaults() {
        let request: SubmitRequest = serde_json::from_value(json!({
            "definition": {"parameters": []},
            "isSample": true
        }))
        .unwrap();

        assert_eq!(request.report, json!({"parameters": []}));
        assert_eq!(request.data, Value::Null);
        assert!(request.output_format.is_none());
        assert!(request.is_test_data);
    }

    #[test]
    fn test_test_data_flag_is_truthy() {
        for (flag, expected) in [
            (json!(null), false),
            (json!(0), false),
            (json!(1), true),
            (json!(""), false),
            (json!("yes"), true),
            (json!(true), true),
        ] {
            let request: SubmitRequest =
                serde_json::from_value(json!({"isTestData": flag})).unwrap();
            assert_eq!(request.is_test_data, expected, "isTestData = {}", flag);

            let inline: InlineReport = serde_json::from_value(json!({"isTestData": flag})).unwrap();
            assert_eq!(inline.is_test_data, expected, "isTestData = {}", flag);
        }
    }

    #[test]
    fn test_inline_report_missing_fields() {
        let inline: InlineReport = serde_json::from_value(json!({"data": {}})).unwrap();
        assert!(inline.report.is_none());
        assert_eq!(inline.data, Some(json!({})));
        assert!(!inline.is_test_data);
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok".to_string(),
            uptime_secs: 3600,
            cache: CacheStats {
                entries: 3,
                total_size: 4096,
                hits: 5,
                misses: 1,
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["uptime_secs"], 3600);
        assert_eq!(json["cache"]["total_size"], 4096);
    }
}
