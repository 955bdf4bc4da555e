use chrono::{NaiveDateTime, Timelike, Utc};
use serde::Serialize;

use crate::imgbb::HostingResponse;

/// A row to append to `generated_images`, built only after generation and
/// hosting have both succeeded.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRecord {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub created_at: NaiveDateTime,
    pub hosting_id: Option<String>,
    pub hosting_title: Option<String>,
    pub url_viewer: Option<String>,
    pub url: Option<String>,
    pub display_url: Option<String>,
    pub hosted_width: Option<String>,
    pub hosted_height: Option<String>,
    pub hosted_size: Option<String>,
    pub hosted_time: Option<String>,
    pub expiration: Option<String>,
    pub delete_url: Option<String>,
    pub raw_response: String,
    pub user_id: Option<String>,
}

impl GenerationRecord {
    pub fn new(
        prompt: &str,
        width: u32,
        height: u32,
        steps: u32,
        hosting: &HostingResponse,
        user_id: Option<String>,
    ) -> Self {
        let now = Utc::now().naive_utc();
        let data = hosting.data.clone();
        Self {
            prompt: prompt.to_string(),
            width,
            height,
            steps,
            // DATETIME columns drop sub-second precision on some backends.
            created_at: now.with_nanosecond(0).unwrap_or(now),
            hosting_id: data.id,
            hosting_title: data.title,
            url_viewer: data.url_viewer,
            url: data.url,
            display_url: data.display_url,
            hosted_width: data.width,
            hosted_height: data.height,
            hosted_size: data.size,
            hosted_time: data.time,
            expiration: data.expiration,
            delete_url: data.delete_url,
            raw_response: hosting.raw.to_string(),
            user_id,
        }
    }
}

/// A persisted row as read back from `generated_images`.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct StoredGeneration {
    pub id: i64,
    pub generation_prompt: String,
    pub generation_timestamp: NaiveDateTime,
    pub generation_width: i64,
    pub generation_height: i64,
    pub generation_steps: i64,
    pub imgbb_id: Option<String>,
    pub imgbb_title: Option<String>,
    pub imgbb_url_viewer: Option<String>,
    pub imgbb_url: Option<String>,
    pub imgbb_display_url: Option<String>,
    pub imgbb_width: Option<String>,
    pub imgbb_height: Option<String>,
    pub imgbb_size: Option<String>,
    pub imgbb_time: Option<String>,
    pub imgbb_expiration: Option<String>,
    pub delete_url: Option<String>,
    #[serde(skip)]
    pub raw_response: Option<String>,
    pub user_id: Option<String>,
}

impl StoredGeneration {
    pub fn raw_response_json(&self) -> Option<serde_json::Value> {
        self.raw_response
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }
}
