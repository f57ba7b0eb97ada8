use crate::store::VehicleRecord;
use serde::{Deserialize, Serialize};

/// Attribute names the detector and the direct-count API will accept.
pub const ALLOWED_ATTRIBUTES: &[&str] = &[
    "color",
    "make",
    "model",
    "year",
    "condition",
    "fuel_type",
    "price",
];

/// Maps common aliases onto canonical attribute names.
pub fn resolve_attribute(name: &str) -> Option<&'static str> {
    let name = name.trim().to_lowercase();
    let canonical = match name.as_str() {
        "brand" | "manufacturer" => "make",
        "colour" => "color",
        "fuel" => "fuel_type",
        other => other,
    };
    ALLOWED_ATTRIBUTES
        .iter()
        .find(|a| **a == canonical)
        .copied()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeQuery {
    pub attribute_name: String,
    pub attribute_value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResult {
    pub count: usize,
    pub total: usize,
    pub percentage: f64,
    pub attribute_name: String,
    pub attribute_value: String,
    pub sample: Vec<VehicleRecord>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct AttributeQueryRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct DirectCountRequest {
    pub attribute_name: String,
    pub attribute_value: String,
}

/// Response body for `/api/attribute-query`. A query that is not an
/// attribute query is still a 200 with `detected: false`.
#[derive(Debug, Serialize)]
pub struct AttributeQueryResponse {
    pub is_attribute_query: bool,
    pub detected: bool,
    pub success: bool,
    #[serde(flatten)]
    pub result: Option<CountResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Chat-shaped answer for `/api/chat-attribute` and locally answered `/chat`
/// requests. `pass_through` tells the caller to send the query to the main
/// app instead.
#[derive(Debug, Serialize)]
pub struct ChatAttributeResponse {
    pub agent_name: String,
    pub query: String,
    pub response: String,
    pub is_attribute_query: bool,
    pub success: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub pass_through: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(code: &str, message: String) -> Self {
        Self {
            error: ErrorPayload {
                code: code.to_string(),
                message,
                details: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_synonyms_to_canonical_names() {
        assert_eq!(resolve_attribute("brand"), Some("make"));
        assert_eq!(resolve_attribute("Colour"), Some("color"));
        assert_eq!(resolve_attribute("fuel"), Some("fuel_type"));
        assert_eq!(resolve_attribute("color"), Some("color"));
    }

    #[test]
    fn rejects_unknown_attributes() {
        assert_eq!(resolve_attribute("horsepower"), None);
        assert_eq!(resolve_attribute(""), None);
    }
}
