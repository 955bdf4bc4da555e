use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    schemars::JsonSchema,
};
use serde::Deserialize;

use crate::AppState;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListGenerationsRequest {
    #[schemars(description = "Maximum number of records, default 10, at most 100")]
    pub limit: Option<u32>,
}

impl ListGenerationsRequest {
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

pub async fn list_generations(
    state: &AppState,
    Parameters(request): Parameters<ListGenerationsRequest>,
) -> Result<CallToolResult, McpError> {
    let records = state
        .orchestrator
        .store()
        .recent(request.limit())
        .await
        .map_err(|err| {
            McpError::internal_error(
                "list generations failed",
                Some(serde_json::Value::String(err.to_string())),
            )
        })?;
    let json = serde_json::to_string(&records).map_err(|err| {
        McpError::internal_error(
            "serialize generation records failed",
            Some(serde_json::Value::String(err.to_string())),
        )
    })?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
