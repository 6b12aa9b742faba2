//! Photo intake: turns a picked or dropped file into a preview and a
//! transport-ready data URI.
//!
//! Files whose declared media type is not `image/*` are ignored without an
//! error. While an analysis is running the intake is locked and neither new
//! files nor clearing the preview have any effect.

use std::path::{Path, PathBuf};

use crate::error::PriismeError;
use crate::image;
use crate::session::AnalyzingFlag;

/// A file as handed over by a picker or a drop.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
    pub path: Option<PathBuf>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
            path: None,
        }
    }

    /// Read a file from disk, declaring its media type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, PriismeError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let media_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            name,
            media_type,
            bytes,
            path: Some(path.to_path_buf()),
        })
    }
}

#[derive(Debug, Default)]
pub struct PhotoIntake {
    preview: Option<String>,
    dragging: bool,
    selected: Option<PathBuf>,
    analyzing: AnalyzingFlag,
}

impl PhotoIntake {
    /// An intake that is locked whenever `analyzing` is set.
    pub fn new(analyzing: AnalyzingFlag) -> Self {
        Self {
            preview: None,
            dragging: false,
            selected: None,
            analyzing,
        }
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Path currently held by the file input, if the file came from disk.
    pub fn selected_path(&self) -> Option<&Path> {
        self.selected.as_deref()
    }

    pub fn is_locked(&self) -> bool {
        self.analyzing.is_set()
    }

    pub fn drag_enter(&mut self) {
        self.dragging = true;
    }

    pub fn drag_over(&mut self) {
        self.dragging = true;
    }

    pub fn drag_leave(&mut self) {
        self.dragging = false;
    }

    /// Handle a drop. Only the first file is considered.
    pub fn drop_files(&mut self, files: Vec<SelectedFile>) -> Option<String> {
        self.dragging = false;
        files.into_iter().next().and_then(|file| self.process_file(file))
    }

    /// Handle a file-picker selection.
    pub fn select_file(&mut self, file: SelectedFile) -> Option<String> {
        self.process_file(file)
    }

    /// Accept an image file: set the preview and return the encoded data URI
    /// that should be submitted for analysis.
    pub fn process_file(&mut self, file: SelectedFile) -> Option<String> {
        if self.is_locked() {
            tracing::debug!(file = %file.name, "Intake locked while analyzing, ignoring file");
            return None;
        }
        if !image::is_image_media_type(&file.media_type) {
            tracing::debug!(file = %file.name, media_type = %file.media_type, "Ignoring non-image file");
            return None;
        }

        let encoded = image::encode_data_uri(&file.media_type, &file.bytes);
        self.preview = Some(encoded.clone());
        self.selected = file.path;
        Some(encoded)
    }

    /// Drop the preview and reset the file input so the same file can be
    /// picked again.
    pub fn clear_preview(&mut self) {
        if self.is_locked() {
            return;
        }
        self.preview = None;
        self.selected = None;
    }
}
