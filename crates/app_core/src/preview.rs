//! Hover and modal preview arbitration
//!
//! Hover previews are delayed and suppressed while a modal preview is open or
//! loading, or while a batch is processing. Hover timers are tokens; a timer
//! whose token is no longer pending when it fires does nothing.

use crate::path;
use app_net::{download_path, preview_path, transcode_preview_path};
use std::time::Duration;

pub const DEFAULT_HOVER_DELAY: Duration = Duration::from_millis(1500);

/// How a file is fetched for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewSource {
    /// Not previewable; the file is downloaded instead
    Download(String),
    /// Needs server-side conversion first
    Transcode(String),
    /// Served as-is
    Direct(String),
}

impl PreviewSource {
    pub fn url_path(&self) -> &str {
        match self {
            PreviewSource::Download(p) | PreviewSource::Transcode(p) | PreviewSource::Direct(p) => p,
        }
    }

    pub fn is_download(&self) -> bool {
        matches!(self, PreviewSource::Download(_))
    }
}

/// Extension lists driving `PreviewSource` selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRules {
    pub download_extensions: Vec<String>,
    pub transcode_extensions: Vec<String>,
}

impl Default for PreviewRules {
    fn default() -> Self {
        Self {
            download_extensions: vec!["pdf".into(), "heic".into(), "heif".into()],
            transcode_extensions: vec!["tiff".into(), "tif".into()],
        }
    }
}

impl PreviewRules {
    pub fn classify(&self, file_path: &str, base_dir: &str) -> PreviewSource {
        let ext = path::extension_of(file_path).unwrap_or_default();
        let listed = |list: &[String]| list.iter().any(|e| e.eq_ignore_ascii_case(&ext));

        if listed(&self.download_extensions) {
            PreviewSource::Download(download_path(file_path))
        } else if listed(&self.transcode_extensions) {
            PreviewSource::Transcode(transcode_preview_path(file_path))
        } else {
            PreviewSource::Direct(preview_path(file_path, base_dir))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverToken(u64);

/// A hover preview ready to be shown
#[derive(Debug, Clone, PartialEq)]
pub struct HoverShow {
    pub path: String,
    pub source: PreviewSource,
    pub position: (f32, f32),
}

/// What opening a file in the modal requires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalRequest {
    /// Start a download; the modal stays closed
    Download(String),
    /// Fetch preview info and the image for `source`
    Load { path: String, source: PreviewSource },
}

/// Preview controller
#[derive(Debug, Clone)]
pub struct PreviewController {
    rules: PreviewRules,
    hover_delay: Duration,
    base_dir: String,
    modal_open: bool,
    modal_loading: bool,
    processing_active: bool,
    generation: u64,
    pending: Option<(HoverToken, String)>,
    visible: Option<String>,
    modal_path: Option<String>,
    position: (f32, f32),
}

impl PreviewController {
    pub fn new(rules: PreviewRules, hover_delay: Duration, base_dir: &str) -> Self {
        Self {
            rules,
            hover_delay,
            base_dir: base_dir.to_string(),
            modal_open: false,
            modal_loading: false,
            processing_active: false,
            generation: 0,
            pending: None,
            visible: None,
            modal_path: None,
            position: (0.0, 0.0),
        }
    }

    pub fn set_base_dir(&mut self, base_dir: &str) {
        self.base_dir = base_dir.to_string();
    }

    pub fn is_hover_suppressed(&self) -> bool {
        self.modal_open || self.modal_loading || self.processing_active
    }

    pub fn classify(&self, file_path: &str) -> PreviewSource {
        self.rules.classify(file_path, &self.base_dir)
    }

    /// Pointer entered a file row; returns the timer to arm, if any
    pub fn pointer_enter(&mut self, file_path: &str) -> Option<(HoverToken, Duration)> {
        self.cancel_hover();

        if self.is_hover_suppressed() || self.classify(file_path).is_download() {
            return None;
        }

        self.generation += 1;
        let token = HoverToken(self.generation);
        self.pending = Some((token, file_path.to_string()));
        Some((token, self.hover_delay))
    }

    /// Pointer left the row; `true` if a visible hover must be hidden
    pub fn pointer_leave(&mut self) -> bool {
        self.cancel_hover()
    }

    /// Track the cursor; returns the new position while a hover is visible
    pub fn pointer_move(&mut self, x: f32, y: f32) -> Option<(f32, f32)> {
        self.position = (x, y);
        self.visible.as_ref().map(|_| self.position)
    }

    /// Hover timer fired
    pub fn hover_elapsed(&mut self, token: HoverToken) -> Option<HoverShow> {
        match &self.pending {
            Some((pending, _)) if *pending == token => {}
            _ => return None,
        }
        let (_, file_path) = self.pending.take()?;

        if self.is_hover_suppressed() {
            return None;
        }

        self.visible = Some(file_path.clone());
        Some(HoverShow {
            source: self.classify(&file_path),
            path: file_path,
            position: self.position,
        })
    }

    /// Drop any pending timer and hide the hover; `true` if one was visible
    pub fn cancel_hover(&mut self) -> bool {
        self.pending = None;
        self.visible.take().is_some()
    }

    /// A click-driven navigation started
    pub fn begin_navigation(&mut self) -> bool {
        self.cancel_hover()
    }

    /// Click on a file
    pub fn open_modal(&mut self, file_path: &str) -> ModalRequest {
        self.cancel_hover();

        match self.classify(file_path) {
            PreviewSource::Download(url) => ModalRequest::Download(url),
            source => {
                self.modal_loading = true;
                self.modal_path = Some(file_path.to_string());
                ModalRequest::Load {
                    path: file_path.to_string(),
                    source,
                }
            }
        }
    }

    /// Preview info arrived (or failed) for `file_path`; `false` if it is stale
    pub fn modal_loaded(&mut self, file_path: &str, ok: bool) -> bool {
        if self.modal_path.as_deref() != Some(file_path) || !self.modal_loading {
            return false;
        }
        self.modal_loading = false;
        self.modal_open = ok;
        if !ok {
            self.modal_path = None;
        }
        true
    }

    pub fn close_modal(&mut self) {
        self.modal_open = false;
        self.modal_loading = false;
        self.modal_path = None;
    }

    pub fn set_processing(&mut self, active: bool) {
        self.processing_active = active;
        if active {
            self.cancel_hover();
        }
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    pub fn is_modal_loading(&self) -> bool {
        self.modal_loading
    }

    pub fn is_processing(&self) -> bool {
        self.processing_active
    }

    pub fn modal_path(&self) -> Option<&str> {
        self.modal_path.as_deref()
    }

    pub fn visible_hover(&self) -> Option<&str> {
        self.visible.as_deref()
    }
}

impl Default for PreviewController {
    fn default() -> Self {
        Self::new(PreviewRules::default(), DEFAULT_HOVER_DELAY, "")
    }
}
