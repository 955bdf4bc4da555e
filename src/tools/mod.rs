pub mod generate_image;
pub mod list_generations;
pub mod list_styles;

use serde::Serialize;

use crate::orchestrator::OutcomeState;

#[derive(Serialize)]
pub struct ToolResponse {
    pub url: String,
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub state: OutcomeState,
    pub text: String,
}

pub use generate_image::{GenerateImageRequest, generate_image};
pub use list_generations::{ListGenerationsRequest, list_generations};
pub use list_styles::{StyleCatalog, list_styles};
