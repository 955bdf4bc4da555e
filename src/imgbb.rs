use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::HostingConfig;
use crate::error::{AppError, AppResult};

/// The `data` object of an ImgBB upload response. ImgBB mixes strings and
/// numbers across these fields, so everything is kept as text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedImage {
    #[serde(default, deserialize_with = "loose_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub url_viewer: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub display_url: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub width: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub height: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub size: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub expiration: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub delete_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HostingResponse {
    pub data: HostedImage,
    /// Full response body as received.
    pub raw: Value,
}

impl HostingResponse {
    pub fn from_value(raw: Value) -> AppResult<Self> {
        let data = raw
            .get("data")
            .cloned()
            .ok_or_else(|| AppError::network("ImgBB response has no data object"))?;
        let data: HostedImage = serde_json::from_value(data)
            .map_err(|err| AppError::network(format!("invalid ImgBB response: {err}")))?;
        Ok(Self { data, raw })
    }
}

fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, image_bytes: &[u8]) -> AppResult<HostingResponse>;
}

#[derive(Clone, Debug)]
pub struct ImgbbClient {
    client: Client,
    config: HostingConfig,
}

impl ImgbbClient {
    pub fn new(config: HostingConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| AppError::network(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { client, config })
    }

    async fn post_image(&self, image_bytes: &[u8]) -> Result<HostingResponse, String> {
        let encoded = STANDARD.encode(image_bytes);
        let mut request = self.client.post(&self.config.upload_url);
        if let Some(expiration) = self.config.expiration {
            request = request.query(&[("expiration", expiration)]);
        }
        let response = request
            .form(&[("key", self.config.api_key.as_str()), ("image", encoded.as_str())])
            .send()
            .await
            .map_err(|err| err.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("HTTP {status} {text}"));
        }
        let raw: Value = response.json().await.map_err(|err| err.to_string())?;
        HostingResponse::from_value(raw).map_err(|err| err.to_string())
    }
}

#[async_trait]
impl ImageHost for ImgbbClient {
    async fn upload(&self, image_bytes: &[u8]) -> AppResult<HostingResponse> {
        match self.post_image(image_bytes).await {
            Ok(response) => {
                tracing::info!(
                    imgbb_id = response.data.id.as_deref().unwrap_or_default(),
                    "uploaded image to ImgBB"
                );
                Ok(response)
            }
            Err(err) => {
                tracing::error!(error = %err, "ImgBB upload error");
                Err(AppError::network(format!("Failed to upload image to ImgBB: {err}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::time::Duration;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(server: &MockServer, expiration: Option<u64>) -> HostingConfig {
        HostingConfig {
            api_key: "bb-key".to_string(),
            upload_url: format!("{}/1/upload", server.uri()),
            timeout: Duration::from_secs(5),
            expiration,
        }
    }

    fn sample_body() -> Value {
        json!({
            "data": {
                "id": "abc",
                "title": "fox",
                "url_viewer": "https://ibb.co/abc",
                "url": "https://i.ibb.co/abc/fox.png",
                "display_url": "https://i.ibb.co/abc/fox-display.png",
                "width": 512,
                "height": "512",
                "size": 48213,
                "time": "1700000000",
                "expiration": 0,
                "delete_url": "https://ibb.co/abc/delete"
            },
            "success": true,
            "status": 200
        })
    }

    #[test]
    fn mixed_field_types_become_text() {
        let response = HostingResponse::from_value(sample_body()).unwrap();
        assert_eq!(response.data.width.as_deref(), Some("512"));
        assert_eq!(response.data.height.as_deref(), Some("512"));
        assert_eq!(response.data.size.as_deref(), Some("48213"));
        assert_eq!(response.data.expiration.as_deref(), Some("0"));
        assert_eq!(response.raw["success"], json!(true));
    }

    #[test]
    fn missing_fields_are_none() {
        let response = HostingResponse::from_value(json!({"data": {"id": "x", "title": null}}))
            .unwrap();
        assert_eq!(response.data.id.as_deref(), Some("x"));
        assert_eq!(response.data.title, None);
        assert_eq!(response.data.delete_url, None);
    }

    #[test]
    fn response_without_data_is_rejected() {
        let err = HostingResponse::from_value(json!({"success": false})).unwrap_err();
        assert!(matches!(err, AppError::Network(_)));
    }

    #[tokio::test]
    async fn uploads_base64_form() {
        let server = MockServer::start().await;
        let expected = STANDARD.encode(b"img");
        Mock::given(method("POST"))
            .and(path("/1/upload"))
            .and(body_string_contains("key=bb-key"))
            .and(body_string_contains(expected.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = ImgbbClient::new(config(&server, None)).unwrap();
        let response = client.upload(b"img").await.unwrap();
        assert_eq!(response.data.id.as_deref(), Some("abc"));
        assert_eq!(response.raw, sample_body());
    }

    #[tokio::test]
    async fn passes_expiration_as_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1/upload"))
            .and(query_param("expiration", "600"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = ImgbbClient::new(config(&server, Some(600))).unwrap();
        client.upload(b"img").await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_upload_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Invalid API v1 key"))
            .mount(&server)
            .await;

        let client = ImgbbClient::new(config(&server, None)).unwrap();
        let err = client.upload(b"img").await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to upload image to ImgBB"));
    }
}
