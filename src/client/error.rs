use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fallback toast text when a failure carries no usable detail.
pub const GENERIC_ERROR_DETAIL: &str = "Something went wrong.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP 422: the backend rejected the request schema.
    #[error("Validation Error ({url})")]
    Validation {
        url: String,
        body: ValidationBody,
    },

    /// Any other non-2xx response.
    #[error("{}: HTTP {status} ({url})", .description.as_deref().unwrap_or("Request failed"))]
    Status {
        status: u16,
        url: String,
        description: Option<String>,
        body: serde_json::Value,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request cancelled")]
    Cancelled,
}

impl ApiError {
    /// HTTP status, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Validation { .. } => Some(422),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// User-facing description of the failure.
    ///
    /// - a string `detail` in the body is used as-is
    /// - a validation array yields its first `msg`
    /// - anything else yields [`GENERIC_ERROR_DETAIL`]
    pub fn detail(&self) -> String {
        match self {
            ApiError::Validation { body, .. } => body.first_message(),
            ApiError::Status { body, .. } => detail_from_json(body),
            ApiError::Cancelled => "Request cancelled.".to_owned(),
            _ => GENERIC_ERROR_DETAIL.to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// 422 body
//
// FastAPI shape:
//   { "detail": [ { "loc": ["body", "value"], "msg": "...", "type": "..." } ] }
//
// When the body does not match this shape it is kept raw.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationBody {
    Parsed(HttpValidationError),
    Raw(serde_json::Value),
}

impl ValidationBody {
    pub(crate) fn from_json(value: serde_json::Value) -> Self {
        match serde_json::from_value::<HttpValidationError>(value.clone()) {
            Ok(parsed) => ValidationBody::Parsed(parsed),
            Err(_) => ValidationBody::Raw(value),
        }
    }

    fn first_message(&self) -> String {
        match self {
            ValidationBody::Parsed(parsed) => parsed
                .detail
                .first()
                .map(|d| d.msg.clone())
                .unwrap_or_else(|| GENERIC_ERROR_DETAIL.to_owned()),
            ValidationBody::Raw(value) => detail_from_json(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpValidationError {
    #[serde(default)]
    pub detail: Vec<ValidationErrorItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorItem {
    pub loc: Vec<LocItem>,
    pub msg: String,
    #[serde(rename = "type")]
    pub error_type: String,
}

/// A `loc` entry is a field name or an array index.
///
/// `Index` comes first so that JSON numbers never match `Field`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocItem {
    Index(i64),
    Field(String),
}

fn detail_from_json(body: &serde_json::Value) -> String {
    match body.get("detail") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Array(items)) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(|msg| msg.as_str())
            .map(str::to_owned)
            .unwrap_or_else(|| GENERIC_ERROR_DETAIL.to_owned()),
        _ => GENERIC_ERROR_DETAIL.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn validation_body_parses_fastapi_shape() {
        let body = ValidationBody::from_json(json!({
            "detail": [
                { "loc": ["body", "items", 0, "value"], "msg": "value is not a valid float", "type": "type_error.float" }
            ]
        }));
        let ValidationBody::Parsed(parsed) = &body else {
            panic!("expected parsed body, got {body:?}");
        };
        assert_eq!(parsed.detail[0].loc[2], LocItem::Index(0));
        assert_eq!(parsed.detail[0].loc[3], LocItem::Field("value".into()));
        assert_eq!(parsed.detail[0].error_type, "type_error.float");
    }

    #[test]
    fn validation_detail_is_first_message() {
        let err = ApiError::Validation {
            url: "http://x/api/v1/items/".into(),
            body: ValidationBody::from_json(json!({
                "detail": [
                    { "loc": ["body", "title"], "msg": "field required", "type": "missing" },
                    { "loc": ["body", "x"], "msg": "second", "type": "missing" }
                ]
            })),
        };
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.detail(), "field required");
    }

    #[test]
    fn unparsed_validation_body_is_kept_raw() {
        let body = ValidationBody::from_json(json!({ "detail": "bad things" }));
        assert_eq!(body, ValidationBody::Raw(json!({ "detail": "bad things" })));
        assert_eq!(body.first_message(), "bad things");
    }

    #[test]
    fn status_detail_uses_string_detail() {
        let err = ApiError::Status {
            status: 404,
            url: "http://x/api/v1/sensor-data/1".into(),
            description: None,
            body: json!({ "detail": "Sensor data not found" }),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.detail(), "Sensor data not found");
    }

    #[test]
    fn status_detail_falls_back_to_generic() {
        let err = ApiError::Status {
            status: 500,
            url: "http://x/".into(),
            description: None,
            body: json!("Internal Server Error"),
        };
        assert_eq!(err.detail(), GENERIC_ERROR_DETAIL);
    }

    #[test]
    fn status_display_includes_description() {
        let err = ApiError::Status {
            status: 403,
            url: "http://x/api/v1/sensor-data/csv".into(),
            description: Some("Forbidden".into()),
            body: json!({}),
        };
        assert_eq!(err.to_string(), "Forbidden: HTTP 403 (http://x/api/v1/sensor-data/csv)");
    }
}
