pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod image_processing;
pub mod imgbb;
pub mod mcp_server;
pub mod orchestrator;
pub mod retry;
pub mod styles;
pub mod telemetry;
pub mod together;
pub mod tools;
pub mod web_pages;

pub use app::{AppOrchestrator, AppState};
pub use error::{AppError, AppResult};
