use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::styles::{ASPECT_RATIOS, STYLES};

#[derive(Serialize)]
pub struct StyleCatalog {
    pub styles: Vec<&'static str>,
    pub aspect_ratios: &'static [&'static str],
}

impl StyleCatalog {
    pub fn current() -> Self {
        Self {
            styles: STYLES.iter().map(|style| style.name).collect(),
            aspect_ratios: ASPECT_RATIOS,
        }
    }
}

pub async fn list_styles() -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string(&StyleCatalog::current()).map_err(|err| {
        McpError::internal_error(
            "serialize style catalog failed",
            Some(serde_json::Value::String(err.to_string())),
        )
    })?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
