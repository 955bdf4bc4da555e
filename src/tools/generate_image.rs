use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    schemars::JsonSchema,
};
use serde::Deserialize;

use crate::{
    AppState,
    error::{AppError, AppResult},
    orchestrator::GenerationRequest,
    styles::{find_style, parse_aspect_ratio},
    together::validate_prompt,
    tools::ToolResponse,
};

pub const MIN_DIMENSION: u32 = 256;
pub const MAX_DIMENSION: u32 = 1024;
pub const DIMENSION_STEP: u32 = 64;
pub const MIN_STEPS: u32 = 1;
pub const MAX_STEPS: u32 = 4;
pub const DEFAULT_DIMENSION: u32 = 512;
pub const DEFAULT_STEPS: u32 = 1;

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct GenerateImageRequest {
    #[schemars(description = "Image description")]
    pub prompt: String,
    #[schemars(description = "Width in pixels, 256-1024 in steps of 64, default 512")]
    pub width: Option<u32>,
    #[schemars(description = "Height in pixels, 256-1024 in steps of 64, default 512")]
    pub height: Option<u32>,
    #[schemars(description = "Inference steps, 1-4, default 1")]
    pub steps: Option<u32>,
    #[schemars(description = "Style preset name, see list_styles")]
    pub style: Option<String>,
    #[schemars(description = "Aspect ratio preset such as \"1152 x 896\"; overrides width and height")]
    pub aspect_ratio: Option<String>,
    #[schemars(description = "Optional caller identifier stored with the record")]
    pub user_id: Option<String>,
}

impl GenerateImageRequest {
    /// Applies defaults and the input bounds that the persistence layer does
    /// not re-check.
    pub fn into_request(self) -> AppResult<GenerationRequest> {
        validate_prompt(&self.prompt)?;
        let style = self.style.filter(|name| !name.trim().is_empty());
        if let Some(name) = style.as_deref() {
            if find_style(name).is_none() {
                return Err(AppError::validation(format!("Unknown style: {}", name.trim())));
            }
        }
        let preset = match self.aspect_ratio.as_deref() {
            Some(label) => parse_aspect_ratio(label)?,
            None => None,
        };
        let (width, height) = match preset {
            Some(dimensions) => dimensions,
            None => (
                check_dimension("width", self.width.unwrap_or(DEFAULT_DIMENSION))?,
                check_dimension("height", self.height.unwrap_or(DEFAULT_DIMENSION))?,
            ),
        };
        let steps = self.steps.unwrap_or(DEFAULT_STEPS);
        if !(MIN_STEPS..=MAX_STEPS).contains(&steps) {
            return Err(AppError::validation(format!(
                "steps must be between {MIN_STEPS} and {MAX_STEPS}"
            )));
        }
        Ok(GenerationRequest {
            prompt: self.prompt,
            width,
            height,
            steps,
            style,
            user_id: self.user_id.filter(|id| !id.trim().is_empty()),
        })
    }
}

fn check_dimension(name: &str, value: u32) -> AppResult<u32> {
    if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&value) || value % DIMENSION_STEP != 0 {
        return Err(AppError::validation(format!(
            "{name} must be between {MIN_DIMENSION} and {MAX_DIMENSION} in steps of {DIMENSION_STEP}"
        )));
    }
    Ok(value)
}

pub async fn generate_image(
    state: &AppState,
    Parameters(request): Parameters<GenerateImageRequest>,
) -> Result<CallToolResult, McpError> {
    let request = request
        .into_request()
        .map_err(|err| McpError::invalid_params(err.to_string(), None))?;
    let outcome = state.orchestrator.run(request).await;
    let Some(image) = outcome.image else {
        return Ok(CallToolResult::error(vec![Content::text(outcome.status)]));
    };

    let url = outcome
        .hosted
        .and_then(|hosted| hosted.url.or(hosted.display_url))
        .unwrap_or_default();
    let response = ToolResponse {
        url,
        name: "generated-image".to_string(),
        mime_type: image.mime_type.to_string(),
        state: outcome.state,
        text: outcome.status,
    };
    let json = serde_json::to_string(&response).map_err(|err| {
        McpError::internal_error(
            "serialize tool response failed",
            Some(serde_json::Value::String(err.to_string())),
        )
    })?;
    Ok(CallToolResult::success(vec![
        Content::text(json),
        Content::image(image.to_base64(), image.mime_type),
    ]))
}
