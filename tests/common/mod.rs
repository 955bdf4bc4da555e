#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use serde_json::{Value, json};
use tokio::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use image_gen_rmcp::{config::AppConfig, retry::RetryPolicy};

pub fn png_bytes() -> Vec<u8> {
    let image = RgbaImage::from_pixel(16, 16, Rgba([10, 120, 200, 255]));
    let mut output = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
        .unwrap();
    output
}

pub fn hosting_body() -> Value {
    json!({
        "data": {
            "id": "abc",
            "title": "fox",
            "url_viewer": "https://ibb.co/abc",
            "url": "http://x/img.png",
            "display_url": "http://x/img-display.png",
            "width": "16",
            "height": "16",
            "size": 1234,
            "time": "1700000000",
            "expiration": "0",
            "delete_url": "https://ibb.co/abc/delete"
        },
        "success": true,
        "status": 200
    })
}

pub struct Services {
    pub together: MockServer,
    pub imgbb: MockServer,
}

impl Services {
    pub async fn start() -> Self {
        Self {
            together: MockServer::start().await,
            imgbb: MockServer::start().await,
        }
    }

    pub async fn mount_generation_ok(&self, bytes: &[u8]) {
        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"b64_json": STANDARD.encode(bytes)}]
            })))
            .mount(&self.together)
            .await;
    }

    pub async fn mount_hosting_ok(&self) {
        Mock::given(method("POST"))
            .and(path("/1/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(hosting_body()))
            .mount(&self.imgbb)
            .await;
    }

    pub fn config(&self, extra: &[(&str, &str)]) -> AppConfig {
        let mut values: HashMap<String, String> = HashMap::from([
            ("TOGETHER_API_KEY".to_string(), "tg-key".to_string()),
            ("IMGBB_API_KEY".to_string(), "bb-key".to_string()),
            ("TOGETHER_BASE_URL".to_string(), self.together.uri()),
            ("IMGBB_UPLOAD_URL".to_string(), format!("{}/1/upload", self.imgbb.uri())),
            ("DATABASE_URL".to_string(), "sqlite::memory:".to_string()),
        ]);
        for (key, value) in extra {
            values.insert(key.to_string(), value.to_string());
        }
        let mut config = AppConfig::from_lookup(|key| values.get(key).cloned()).unwrap();
        config.call_retry = RetryPolicy::exponential(3, Duration::ZERO);
        config.database.connect_retry = RetryPolicy::fixed(1, Duration::ZERO);
        config
    }
}
