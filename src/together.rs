use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::GenerationConfig;
use crate::error::{AppError, AppResult};
use crate::image_processing::GeneratedImage;

pub const EMPTY_PROMPT_MESSAGE: &str = "Please enter a prompt";

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Option<Vec<ImageDatum>>,
    error: Option<TogetherError>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TogetherError {
    message: Option<String>,
}

pub fn validate_prompt(prompt: &str) -> AppResult<()> {
    if prompt.trim().is_empty() {
        return Err(AppError::validation(EMPTY_PROMPT_MESSAGE));
    }
    Ok(())
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        width: u32,
        height: u32,
        steps: u32,
    ) -> AppResult<GeneratedImage>;
}

#[derive(Clone, Debug)]
pub struct TogetherClient {
    client: Client,
    config: GenerationConfig,
}

impl TogetherClient {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/images/generations",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn request_image(
        &self,
        prompt: &str,
        width: u32,
        height: u32,
        steps: u32,
    ) -> Result<GeneratedImage, String> {
        let body = json!({
            "model": self.config.model,
            "prompt": prompt,
            "width": width,
            "height": height,
            "steps": steps,
            "n": 1,
            "response_format": "b64_json",
        });
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| err.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("Together request failed: {status} {text}"));
        }
        let payload: ImagesResponse = response.json().await.map_err(|err| err.to_string())?;
        if let Some(message) = payload.error.and_then(|err| err.message) {
            return Err(format!("Together returned an error: {message}"));
        }
        let encoded = payload
            .data
            .and_then(|data| data.into_iter().next())
            .and_then(|datum| datum.b64_json)
            .ok_or_else(|| "Together returned no image data".to_string())?;
        GeneratedImage::from_base64(&encoded).map_err(|err| err.to_string())
    }
}

#[async_trait]
impl ImageGenerator for TogetherClient {
    async fn generate(
        &self,
        prompt: &str,
        width: u32,
        height: u32,
        steps: u32,
    ) -> AppResult<GeneratedImage> {
        validate_prompt(prompt)?;
        tracing::info!(width, height, steps, "generating image");
        match self.request_image(prompt, width, height, steps).await {
            Ok(image) => {
                tracing::info!(bytes = image.bytes.len(), "image generated");
                Ok(image)
            }
            Err(err) => {
                tracing::error!(error = %err, "error generating image");
                Err(AppError::network(format!("Error generating image: {err}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::DEFAULT_GENERATION_MODEL;
    use crate::image_processing::tests::png_bytes;

    fn client(server: &MockServer) -> TogetherClient {
        TogetherClient::new(GenerationConfig {
            api_key: "tg-key".to_string(),
            base_url: server.uri(),
            model: DEFAULT_GENERATION_MODEL.to_string(),
        })
    }

    #[tokio::test]
    async fn blank_prompt_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server);
        for prompt in ["", "   ", "\n\t"] {
            let err = client.generate(prompt, 512, 512, 1).await.unwrap_err();
            assert!(err.is_validation());
            assert_eq!(err.to_string(), EMPTY_PROMPT_MESSAGE);
        }
    }

    #[tokio::test]
    async fn sends_fixed_request_shape_and_decodes_image() {
        let server = MockServer::start().await;
        let bytes = png_bytes(4, 4);
        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .and(header("authorization", "Bearer tg-key"))
            .and(body_partial_json(json!({
                "model": DEFAULT_GENERATION_MODEL,
                "prompt": "a red fox",
                "width": 512,
                "height": 768,
                "steps": 4,
                "n": 1,
                "response_format": "b64_json"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"b64_json": STANDARD.encode(&bytes)}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let image = client(&server).generate("a red fox", 512, 768, 4).await.unwrap();
        assert_eq!(image.bytes, bytes);
        assert_eq!(image.dimensions(), (4, 4));
    }

    #[tokio::test]
    async fn http_failure_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = client(&server).generate("a red fox", 512, 512, 1).await.unwrap_err();
        assert!(matches!(err, AppError::Network(_)));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn undecodable_payload_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"b64_json": STANDARD.encode(b"not an image")}]
            })))
            .mount(&server)
            .await;

        let err = client(&server).generate("a red fox", 512, 512, 1).await.unwrap_err();
        assert!(matches!(err, AppError::Network(_)));
    }

    #[tokio::test]
    async fn empty_data_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let err = client(&server).generate("a red fox", 512, 512, 1).await.unwrap_err();
        assert!(err.to_string().contains("no image data"));
    }
}
