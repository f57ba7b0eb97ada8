use crate::count;
use crate::detect;
use crate::domain::query::{
    resolve_attribute, AttributeQuery, AttributeQueryRequest, AttributeQueryResponse,
    ChatAttributeResponse, DirectCountRequest, ErrorEnvelope,
};
use crate::store::RecordTable;
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

/// Core of `/api/attribute-query`, shared with the chat path. A query that
/// is not an attribute query is a normal response, not an error.
pub fn run_attribute_query(query: &str, table: &RecordTable) -> AttributeQueryResponse {
    match detect::detect(query) {
        Some(attribute_query) => AttributeQueryResponse {
            is_attribute_query: true,
            detected: true,
            success: true,
            result: Some(count::count(&attribute_query, table)),
            message: None,
        },
        None => AttributeQueryResponse {
            is_attribute_query: false,
            detected: false,
            success: true,
            result: None,
            message: Some(
                "This query doesn't appear to be about counting vehicles by attributes."
                    .to_string(),
            ),
        },
    }
}

pub async fn attribute_query(
    State(state): State<AppState>,
    Json(req): Json<AttributeQueryRequest>,
) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(run_attribute_query(&req.query, &state.table)),
    )
}

/// Core of `/api/direct-count`. The direct API is a contract, not a
/// best-effort guess: an attribute the allow-list and the loaded table both
/// don't know is an error.
pub fn run_direct_count(
    req: &DirectCountRequest,
    table: &RecordTable,
) -> Result<crate::domain::query::CountResult, ErrorEnvelope> {
    let requested = req.attribute_name.trim().to_lowercase();
    let attribute_name = match resolve_attribute(&requested) {
        Some(canonical) => canonical.to_string(),
        None if table.has_field(&requested) => requested,
        None => {
            return Err(ErrorEnvelope::new(
                "INVALID_ATTRIBUTE",
                format!(
                    "unknown attribute '{}'; available attributes: {}",
                    req.attribute_name,
                    table.fields.join(", ")
                ),
            ));
        }
    };

    let query = AttributeQuery {
        attribute_name,
        attribute_value: req.attribute_value.trim().to_lowercase(),
    };
    Ok(count::count(&query, table))
}

pub async fn direct_count(
    State(state): State<AppState>,
    Json(req): Json<DirectCountRequest>,
) -> impl IntoResponse {
    match run_direct_count(&req, &state.table) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(body) => (StatusCode::BAD_REQUEST, Json(body)).into_response(),
    }
}

/// Reply shape for `/api/chat-attribute`: either a chat-formatted answer or
/// an explicit pass-through telling the caller to use the main app.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ChatAttributeReply {
    Answered(ChatAttributeResponse),
    PassThrough {
        is_attribute_query: bool,
        message: String,
        success: bool,
        pass_through: bool,
    },
}

pub fn run_chat_attribute(query: &str, table: &RecordTable) -> ChatAttributeReply {
    let Some(attribute_query) = detect::detect(query) else {
        return ChatAttributeReply::PassThrough {
            is_attribute_query: false,
            message: "Not a valid attribute query".to_string(),
            success: true,
            pass_through: true,
        };
    };

    let result = count::count(&attribute_query, table);
    let mut response = format!("**Vehicle Count Analysis**\n\n{}\n\n", result.message);
    if result.count > 0 {
        match attribute_query.attribute_name.as_str() {
            "color" => response.push_str(&format!(
                "**Note:** Out of all vehicles, {}% are {}.\n",
                result.percentage, attribute_query.attribute_value
            )),
            "make" => response.push_str(&format!(
                "**Note:** {} represents {}% of our inventory.\n",
                attribute_query.attribute_value, result.percentage
            )),
            _ => {}
        }
    }

    ChatAttributeReply::Answered(ChatAttributeResponse {
        agent_name: "data_viz_agent".to_string(),
        query: query.trim().to_lowercase(),
        response,
        is_attribute_query: true,
        success: true,
        pass_through: false,
    })
}

pub async fn chat_attribute(
    State(state): State<AppState>,
    Json(req): Json<AttributeQueryRequest>,
) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(run_chat_attribute(&req.query, &state.table)),
    )
}
