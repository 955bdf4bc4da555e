use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};

use crate::AppState;
use crate::tools::{GenerateImageRequest, ListGenerationsRequest};

#[derive(Clone)]
pub struct ImageGenServer {
    tool_router: ToolRouter<Self>,
    state: Arc<AppState>,
}

impl ImageGenServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            state,
        }
    }
}

#[tool_router]
impl ImageGenServer {
    #[tool(
        description = "Generate an image from a text prompt, upload it to ImgBB and record it. Width/height 256-1024 in steps of 64, steps 1-4. Generation can take a while; show the result with ![](url)"
    )]
    async fn generate_image(
        &self,
        Parameters(request): Parameters<GenerateImageRequest>,
    ) -> Result<CallToolResult, McpError> {
        crate::tools::generate_image(&self.state, Parameters(request)).await
    }

    #[tool(description = "List recently generated images, newest first")]
    async fn list_generations(
        &self,
        Parameters(request): Parameters<ListGenerationsRequest>,
    ) -> Result<CallToolResult, McpError> {
        crate::tools::list_generations(&self.state, Parameters(request)).await
    }

    #[tool(description = "List the available style presets and aspect ratios")]
    async fn list_styles(&self) -> Result<CallToolResult, McpError> {
        crate::tools::list_styles().await
    }
}

#[tool_handler]
impl ServerHandler for ImageGenServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
