//! ImageDeck remote service layer
//!
//! Provides the client side of the image server:
//! - Backend: one async method per server endpoint
//! - HttpBackend: reqwest implementation
//! - Endpoint paths and preview/download URL builders
//! - Error classification (transport vs. structured application errors)

mod endpoints;
mod http;

pub use endpoints::{
    download_path, preview_path, relative_to_base, task_status_path, transcode_preview_path,
    Endpoint,
};
pub use http::HttpBackend;

use app_proto::{
    Ack, CompressRequest, ConvertRequest, DeleteByFormatRequest, Listing, PreviewInfo,
    ProgressState, RunningTasks, SearchRequest, ServerConfig, SupportedFormats, Task,
    TaskSubmitted, VersionInfo,
};
use async_trait::async_trait;
use thiserror::Error;

/// Remote service errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetError {
    /// Network failure; carries the raw transport text
    #[error("{0}")]
    Transport(String),

    /// Non-2xx response with a JSON `error` field
    #[error("{message}")]
    Application { status: u16, message: String },

    /// Non-2xx response without a structured body
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    Url(String),
}

impl NetError {
    /// Text shown to the user; structured messages win over transport text
    pub fn user_message(&self) -> String {
        match self {
            NetError::Application { message, .. } => message.clone(),
            NetError::Status { reason, .. } => reason.clone(),
            NetError::Transport(text) => text.clone(),
            _ => self.to_string(),
        }
    }

    /// HTTP status, when the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            NetError::Application { status, .. } | NetError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, NetError>;

/// The image server as seen by the client
#[async_trait]
pub trait Backend: Send + Sync {
    async fn get_config(&self) -> Result<ServerConfig>;
    async fn get_supported_formats(&self) -> Result<SupportedFormats>;
    async fn get_version(&self) -> Result<VersionInfo>;

    async fn get_files(&self, path: &str, auto_enter: bool) -> Result<Listing>;
    async fn preview_image(&self, path: &str) -> Result<PreviewInfo>;

    async fn compress_images(&self, request: &CompressRequest) -> Result<Ack>;
    async fn convert_images(&self, request: &ConvertRequest) -> Result<Ack>;
    async fn get_progress(&self) -> Result<ProgressState>;
    async fn stop_processing(&self) -> Result<Ack>;
    async fn reset_progress(&self) -> Result<Ack>;

    async fn count_formats(&self, selected_paths: &[String]) -> Result<TaskSubmitted>;
    async fn fix_extensions(&self, selected_paths: &[String]) -> Result<TaskSubmitted>;
    async fn clean_empty_folders(&self, selected_paths: &[String]) -> Result<TaskSubmitted>;
    async fn search_files(&self, request: &SearchRequest) -> Result<TaskSubmitted>;
    async fn delete_files_by_format(&self, request: &DeleteByFormatRequest) -> Result<TaskSubmitted>;
    async fn delete_file(&self, path: &str) -> Result<Ack>;

    /// Unknown ids come back as a `not_found` task rather than an error
    async fn get_task_status(&self, task_id: &str) -> Result<Task>;
    async fn get_running_tasks(&self) -> Result<RunningTasks>;

    async fn get_address_from_coords(&self, lat: f64, lon: f64) -> Result<String>;

    /// Raw bytes of a preview, transcoded preview, or download URL path
    async fn fetch_bytes(&self, url_path: &str) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_structured() {
        let err = NetError::Application {
            status: 400,
            message: "No files selected".into(),
        };
        assert_eq!(err.user_message(), "No files selected");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_user_message_transport() {
        let err = NetError::Transport("error sending request".into());
        assert_eq!(err.user_message(), "error sending request");
        assert_eq!(err.status(), None);

        let err = NetError::Status {
            status: 502,
            reason: "Bad Gateway".into(),
        };
        assert_eq!(err.user_message(), "Bad Gateway");
    }
}
