use serde::Serialize;

use crate::db::{GenerationRecord, GenerationStore};
use crate::error::AppResult;
use crate::image_processing::GeneratedImage;
use crate::imgbb::{HostedImage, HostingResponse, ImageHost};
use crate::retry::{RetryPolicy, with_retry};
use crate::styles::apply_style;
use crate::together::{ImageGenerator, validate_prompt};

pub const SUCCESS_STATUS: &str = "Image generated successfully!";
pub const PARTIAL_SUCCESS_STATUS: &str = "Image generated and uploaded, but database save failed!";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub style: Option<String>,
    pub user_id: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, width: u32, height: u32, steps: u32) -> Self {
        Self {
            prompt: prompt.into(),
            width,
            height,
            steps,
            style: None,
            user_id: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeState {
    Success,
    /// Generated and hosted, but the record was not persisted.
    PartialSuccess,
    Failed,
}

#[derive(Clone, Debug)]
pub struct GenerationOutcome {
    pub state: OutcomeState,
    pub status: String,
    pub image: Option<GeneratedImage>,
    pub hosted: Option<HostedImage>,
}

impl GenerationOutcome {
    fn failed(message: String) -> Self {
        Self {
            state: OutcomeState::Failed,
            status: message,
            image: None,
            hosted: None,
        }
    }
}

/// Sequences generate, upload and persist for one request.
pub struct Orchestrator<G, H> {
    generator: G,
    host: H,
    store: GenerationStore,
    retry: RetryPolicy,
}

impl<G, H> Orchestrator<G, H>
where
    G: ImageGenerator,
    H: ImageHost,
{
    pub fn new(generator: G, host: H, store: GenerationStore, retry: RetryPolicy) -> Self {
        Self {
            generator,
            host,
            store,
            retry,
        }
    }

    pub fn store(&self) -> &GenerationStore {
        &self.store
    }

    /// The presentation contract: an image when one was produced, plus a status line.
    pub async fn handle_generation(
        &self,
        prompt: &str,
        width: u32,
        height: u32,
        steps: u32,
    ) -> (Option<GeneratedImage>, String) {
        let outcome = self
            .run(GenerationRequest::new(prompt, width, height, steps))
            .await;
        (outcome.image, outcome.status)
    }

    pub async fn run(&self, request: GenerationRequest) -> GenerationOutcome {
        let (prompt, image, hosting) = match self.generate_and_host(&request).await {
            Ok(parts) => parts,
            Err(err) => {
                tracing::error!(error = %err, "error in handle_generation");
                return GenerationOutcome::failed(format!("Error: {err}"));
            }
        };

        let record = GenerationRecord::new(
            &prompt,
            request.width,
            request.height,
            request.steps,
            &hosting,
            request.user_id.clone(),
        );
        let (state, status) = if self.store.insert(&record).await {
            (OutcomeState::Success, SUCCESS_STATUS)
        } else {
            (OutcomeState::PartialSuccess, PARTIAL_SUCCESS_STATUS)
        };
        GenerationOutcome {
            state,
            status: status.to_string(),
            image: Some(image),
            hosted: Some(hosting.data),
        }
    }

    async fn generate_and_host(
        &self,
        request: &GenerationRequest,
    ) -> AppResult<(String, GeneratedImage, HostingResponse)> {
        validate_prompt(&request.prompt)?;
        let prompt = apply_style(request.style.as_deref(), &request.prompt)?;

        let image = with_retry(self.retry, "image generation", || {
            self.generator
                .generate(&prompt, request.width, request.height, request.steps)
        })
        .await?;

        let hosting = with_retry(self.retry, "image upload", || self.host.upload(&image.bytes)).await?;

        Ok((prompt, image, hosting))
    }
}
