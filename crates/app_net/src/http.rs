//! reqwest implementation of the Backend trait

use crate::endpoints::{task_status_path, Endpoint};
use crate::{Backend, NetError, Result};
use app_proto::{
    parse_error_body, Ack, AddressRequest, AddressResponse, CompressRequest, ConvertRequest,
    DeleteByFormatRequest, DeleteFileRequest, Listing, PreviewInfo, ProgressState, RunningTasks,
    SearchRequest, SelectionRequest, ServerConfig, SupportedFormats, Task, TaskSubmitted,
    VersionInfo,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// HTTP client bound to one server
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Create a backend for the server at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| NetError::Url(format!("{}: {}", base_url, e)))?;

        // Endpoints resolve below the base path, so it must end in a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(concat!("image_deck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NetError::Transport(e.to_string()))?;

        tracing::info!("HTTP backend bound to {}", base_url);
        Ok(Self { client, base_url })
    }

    /// Resolve a server-relative path (which may carry a query string)
    pub fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| NetError::Url(format!("{}: {}", path, e)))
    }

    /// Absolute URL for display or external opening
    pub fn absolute_url(&self, path: &str) -> String {
        self.url(path)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| path.to_string())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.client.get(self.url(path)?);
        self.send(request, path).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, endpoint: Endpoint, body: &B) -> Result<T> {
        let request = self.client.post(self.url(endpoint.path())?).json(body);
        self.send(request, endpoint.path()).await
    }

    async fn post_form<T: DeserializeOwned>(&self, endpoint: Endpoint, form: &[(&str, &str)]) -> Result<T> {
        let request = self.client.post(self.url(endpoint.path())?).form(form);
        self.send(request, endpoint.path()).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T> {
        let request = self.client.post(self.url(endpoint.path())?);
        self.send(request, endpoint.path()).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, label: &str) -> Result<T> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!("Request {} failed: {}", label, e);
            NetError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = classify_failure(status, &body);
            tracing::warn!("Request {} returned {}: {}", label, status, err);
            return Err(err);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| NetError::Transport(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!("Request {} returned undecodable body: {}", label, e);
            NetError::Decode(e.to_string())
        })
    }
}

/// Map a non-2xx response onto an error, preferring the JSON `error` field
fn classify_failure(status: StatusCode, body: &str) -> NetError {
    match parse_error_body(body) {
        Some(message) => NetError::Application {
            status: status.as_u16(),
            message,
        },
        None => NetError::Status {
            status: status.as_u16(),
            reason: status
                .canonical_reason()
                .unwrap_or("Unknown status")
                .to_string(),
        },
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get_config(&self) -> Result<ServerConfig> {
        self.get(Endpoint::GetConfig.path()).await
    }

    async fn get_supported_formats(&self) -> Result<SupportedFormats> {
        self.get(Endpoint::GetSupportedFormats.path()).await
    }

    async fn get_version(&self) -> Result<VersionInfo> {
        self.get(Endpoint::GetVersion.path()).await
    }

    async fn get_files(&self, path: &str, auto_enter: bool) -> Result<Listing> {
        let auto_enter = if auto_enter { "true" } else { "false" };
        self.post_form(Endpoint::GetFiles, &[("path", path), ("auto_enter", auto_enter)])
            .await
    }

    async fn preview_image(&self, path: &str) -> Result<PreviewInfo> {
        self.post_form(Endpoint::PreviewImage, &[("path", path)]).await
    }

    async fn compress_images(&self, request: &CompressRequest) -> Result<Ack> {
        self.post_json(Endpoint::CompressImages, request).await
    }

    async fn convert_images(&self, request: &ConvertRequest) -> Result<Ack> {
        self.post_json(Endpoint::ConvertImages, request).await
    }

    async fn get_progress(&self) -> Result<ProgressState> {
        self.get(Endpoint::GetProgress.path()).await
    }

    async fn stop_processing(&self) -> Result<Ack> {
        self.post_empty(Endpoint::StopProcessing).await
    }

    async fn reset_progress(&self) -> Result<Ack> {
        self.post_empty(Endpoint::ResetProgress).await
    }

    async fn count_formats(&self, selected_paths: &[String]) -> Result<TaskSubmitted> {
        let body = SelectionRequest {
            selected_paths: selected_paths.to_vec(),
        };
        self.post_json(Endpoint::CountFormats, &body).await
    }

    async fn fix_extensions(&self, selected_paths: &[String]) -> Result<TaskSubmitted> {
        let body = SelectionRequest {
            selected_paths: selected_paths.to_vec(),
        };
        self.post_json(Endpoint::FixExtensions, &body).await
    }

    async fn clean_empty_folders(&self, selected_paths: &[String]) -> Result<TaskSubmitted> {
        let body = SelectionRequest {
            selected_paths: selected_paths.to_vec(),
        };
        self.post_json(Endpoint::CleanEmptyFolders, &body).await
    }

    async fn search_files(&self, request: &SearchRequest) -> Result<TaskSubmitted> {
        self.post_json(Endpoint::SearchFiles, request).await
    }

    async fn delete_files_by_format(&self, request: &DeleteByFormatRequest) -> Result<TaskSubmitted> {
        self.post_json(Endpoint::DeleteFilesByFormat, request).await
    }

    async fn delete_file(&self, path: &str) -> Result<Ack> {
        let body = DeleteFileRequest {
            path: path.to_string(),
        };
        self.post_json(Endpoint::DeleteFile, &body).await
    }

    async fn get_task_status(&self, task_id: &str) -> Result<Task> {
        match self.get::<Task>(&task_status_path(task_id)).await {
            Err(err) if err.status() == Some(StatusCode::NOT_FOUND.as_u16()) => {
                tracing::debug!("Task {} not found on server", task_id);
                Ok(Task::not_found(task_id))
            }
            other => other,
        }
    }

    async fn get_running_tasks(&self) -> Result<RunningTasks> {
        self.get(Endpoint::GetRunningTasks.path()).await
    }

    async fn get_address_from_coords(&self, lat: f64, lon: f64) -> Result<String> {
        let body = AddressRequest { lat, lon };
        let response: AddressResponse = self.post_json(Endpoint::GetAddressFromCoords, &body).await?;
        Ok(response.address)
    }

    async fn fetch_bytes(&self, url_path: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(self.url(url_path)?)
            .send()
            .await
            .map_err(|e| NetError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| NetError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_structured() {
        let err = classify_failure(StatusCode::BAD_REQUEST, r#"{"error": "No files selected"}"#);
        assert_eq!(
            err,
            NetError::Application {
                status: 400,
                message: "No files selected".into()
            }
        );
    }

    #[test]
    fn test_classify_plain() {
        let err = classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "Error converting TIFF to PNG");
        assert_eq!(
            err,
            NetError::Status {
                status: 500,
                reason: "Internal Server Error".into()
            }
        );
    }

    #[test]
    fn test_url_join() {
        let backend = HttpBackend::new("http://127.0.0.1:5000").unwrap();
        assert_eq!(
            backend.url("/get_task_status/t1").unwrap().as_str(),
            "http://127.0.0.1:5000/get_task_status/t1"
        );
        assert_eq!(
            backend.absolute_url("/download?path=%2Fdata%2Fa.pdf"),
            "http://127.0.0.1:5000/download?path=%2Fdata%2Fa.pdf"
        );
    }

    #[test]
    fn test_url_keeps_base_path_prefix() {
        for base in ["http://host/imgs", "http://host/imgs/"] {
            let backend = HttpBackend::new(base).unwrap();
            assert_eq!(
                backend.url(Endpoint::GetFiles.path()).unwrap().as_str(),
                "http://host/imgs/get_files"
            );
            assert_eq!(
                backend.url("/preview/a%2Fb.png").unwrap().as_str(),
                "http://host/imgs/preview/a%2Fb.png"
            );
        }
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(HttpBackend::new("not a url"), Err(NetError::Url(_))));
    }
}
