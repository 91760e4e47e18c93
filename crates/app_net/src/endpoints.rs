//! Endpoint paths and URL builders

/// Server endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    GetConfig,
    GetSupportedFormats,
    GetVersion,
    GetFiles,
    PreviewImage,
    CompressImages,
    ConvertImages,
    GetProgress,
    StopProcessing,
    ResetProgress,
    CountFormats,
    FixExtensions,
    CleanEmptyFolders,
    SearchFiles,
    DeleteFilesByFormat,
    DeleteFile,
    GetRunningTasks,
    GetAddressFromCoords,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::GetConfig => "/get_config",
            Endpoint::GetSupportedFormats => "/get_supported_formats",
            Endpoint::GetVersion => "/get_version",
            Endpoint::GetFiles => "/get_files",
            Endpoint::PreviewImage => "/preview_image",
            Endpoint::CompressImages => "/compress_images",
            Endpoint::ConvertImages => "/convert_images",
            Endpoint::GetProgress => "/get_progress",
            Endpoint::StopProcessing => "/stop_processing",
            Endpoint::ResetProgress => "/reset_progress",
            Endpoint::CountFormats => "/count_formats",
            Endpoint::FixExtensions => "/fix_extensions",
            Endpoint::CleanEmptyFolders => "/clean_empty_folders",
            Endpoint::SearchFiles => "/search_files",
            Endpoint::DeleteFilesByFormat => "/delete_files_by_format",
            Endpoint::DeleteFile => "/delete_file",
            Endpoint::GetRunningTasks => "/get_running_tasks",
            Endpoint::GetAddressFromCoords => "/get_address_from_coords",
        }
    }
}

/// `/get_task_status/<task_id>`
pub fn task_status_path(task_id: &str) -> String {
    format!("/get_task_status/{}", urlencoding::encode(task_id))
}

/// Path relative to `base_dir`, with `/` separators and no leading slash.
///
/// Paths outside `base_dir` are returned whole (separators still normalized).
pub fn relative_to_base(path: &str, base_dir: &str) -> String {
    let path = path.replace('\\', "/");
    let base = base_dir.replace('\\', "/");

    let rest = if !base.is_empty() && path.starts_with(&base) {
        &path[base.len()..]
    } else {
        path.as_str()
    };

    rest.trim_start_matches('/').to_string()
}

/// Direct preview URL: `/preview/<encoded-relative-path>`
pub fn preview_path(path: &str, base_dir: &str) -> String {
    format!("/preview/{}", urlencoding::encode(&relative_to_base(path, base_dir)))
}

/// Preview through server-side transcoding
pub fn transcode_preview_path(path: &str) -> String {
    format!("/convert_tiff_preview?path={}", urlencoding::encode(path))
}

/// Attachment download
pub fn download_path(path: &str) -> String {
    format!("/download?path={}", urlencoding::encode(path))
}
