//! Wire protocol definitions for the image server HTTP API
//!
//! This crate defines the JSON request and response bodies exchanged with the
//! server. Paths are opaque strings and are passed through verbatim.

mod progress;
mod task;

pub use progress::{FileIssue, ProgressState, ProgressStatus};
pub use task::{
    CleanEmptyResult, DeleteByFormatParams, DeleteByFormatResult, FixExtensionsResult,
    FormatCountResult, RunningTasks, SearchMatch, SearchParams, SearchResult, SelectionParams,
    Task, TaskStatus, TaskSubmitted, TaskType,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_cpu_count() -> usize {
    4
}

/// `/get_config`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_dir: String,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// `/get_supported_formats`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportedFormats {
    #[serde(default)]
    pub formats: Vec<String>,
}

/// `/get_version`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
}

/// Kind of a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
}

/// One row of a directory listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub mtime: Option<f64>,
}

impl DirectoryEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// `/get_files` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub current_path: String,
    #[serde(default)]
    pub files: Vec<DirectoryEntry>,
}

/// GPS position extracted from EXIF
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsCoords {
    pub lat: f64,
    pub lon: f64,
}

/// EXIF block attached to a preview response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExifInfo {
    #[serde(default)]
    pub gps: Option<GpsCoords>,
    #[serde(flatten)]
    pub tags: BTreeMap<String, serde_json::Value>,
}

/// `/preview_image` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewInfo {
    #[serde(default)]
    pub path: Option<String>,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub exif: Option<ExifInfo>,
}

/// `/compress_images` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressRequest {
    pub selected_paths: Vec<String>,
    pub quality: u8,
    pub min_size: u64,
    pub max_workers: usize,
}

/// `/convert_images` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertRequest {
    pub selected_paths: Vec<String>,
    pub target_format: String,
    pub quality: u8,
    pub max_workers: usize,
    pub skip_pdf: bool,
}

/// Body for endpoints that only take the current selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRequest {
    pub selected_paths: Vec<String>,
}

/// `/search_files` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub selected_paths: Vec<String>,
    pub pattern: String,
    pub is_regex: bool,
    pub case_sensitive: bool,
}

/// `/delete_files_by_format` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteByFormatRequest {
    pub selected_paths: Vec<String>,
    pub format: String,
}

/// `/delete_file` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteFileRequest {
    pub path: String,
}

/// `/get_address_from_coords` request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AddressRequest {
    pub lat: f64,
    pub lon: f64,
}

/// `/get_address_from_coords` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressResponse {
    pub address: String,
}

/// Generic acknowledgement (`{"status": "started"}`, `{"status": "success"}`, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Structured application error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Try to pull a structured `error` field out of a response body
pub fn parse_error_body(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .filter(|e| !e.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_decode() {
        let json = r#"{
            "current_path": "/data/photos",
            "files": [
                {"name": "2023", "path": "/data/photos/2023", "type": "dir", "size": 0, "mtime": 1700000000.5},
                {"name": "a.PNG", "path": "/data/photos/a.PNG", "type": "file", "size": 2048}
            ]
        }"#;

        let listing: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.current_path, "/data/photos");
        assert_eq!(listing.files.len(), 2);
        assert!(listing.files[0].is_dir());
        assert!(listing.files[1].is_file());
        assert_eq!(listing.files[1].size, Some(2048));
        assert_eq!(listing.files[1].mtime, None);
    }

    #[test]
    fn test_config_default_cpu_count() {
        let config: ServerConfig = serde_json::from_str(r#"{"base_dir": "/data"}"#).unwrap();
        assert_eq!(config.cpu_count, 4);
    }

    #[test]
    fn test_preview_with_exif_gps() {
        let json = r#"{
            "width": 4000, "height": 3000, "format": "JPEG", "size": 123456,
            "exif": {"Make": "Canon", "gps": {"lat": 35.68, "lon": 139.76}}
        }"#;

        let info: PreviewInfo = serde_json::from_str(json).unwrap();
        let exif = info.exif.unwrap();
        assert_eq!(exif.gps, Some(GpsCoords { lat: 35.68, lon: 139.76 }));
        assert_eq!(exif.tags.get("Make").and_then(|v| v.as_str()), Some("Canon"));
        assert!(!exif.tags.contains_key("gps"));
    }

    #[test]
    fn test_convert_request_shape() {
        let req = ConvertRequest {
            selected_paths: vec!["/data/x.png".into()],
            target_format: "webp".into(),
            quality: 85,
            max_workers: 3,
            skip_pdf: true,
        };

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["target_format"], "webp");
        assert_eq!(value["skip_pdf"], true);
        assert_eq!(value["selected_paths"][0], "/data/x.png");
    }

    #[test]
    fn test_parse_error_body() {
        assert_eq!(
            parse_error_body(r#"{"error": "No files selected"}"#).as_deref(),
            Some("No files selected")
        );
        assert_eq!(parse_error_body("Internal Server Error"), None);
        assert_eq!(parse_error_body(r#"{"error": ""}"#), None);
    }
}
