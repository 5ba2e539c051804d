use crate::prelude::{WorkflowError, WorkflowResult};
use base64::Engine as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Extensions the file picker offers; everything the `image/*` accept filter admits in practice.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "svg", "tif", "tiff", "ico",
];

pub fn image_mime(extension: &str) -> Option<&'static str> {
    let mime = match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        "ico" => "image/x-icon",
        _ => return None,
    };
    Some(mime)
}

/// File chosen in the picker. Owned by the session, never re-queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub mime: &'static str,
}

impl SelectedFile {
    pub fn from_path(path: impl Into<PathBuf>) -> WorkflowResult<Self> {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| WorkflowError::UnsupportedFile(path.display().to_string()))?;
        let mime = path
            .extension()
            .and_then(|ext| image_mime(&ext.to_string_lossy()))
            .ok_or_else(|| WorkflowError::UnsupportedFile(name.clone()))?;
        Ok(Self { path, name, mime })
    }
}

/// Multipart payload for the classification POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Arc<[u8]>,
}

/// Fully read selection, ready to display and to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub file_name: String,
    pub mime: String,
    pub bytes: Arc<[u8]>,
}

impl Preview {
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }

    pub fn to_upload(&self) -> Upload {
        Upload {
            file_name: self.file_name.clone(),
            mime: self.mime.clone(),
            bytes: Arc::clone(&self.bytes),
        }
    }
}

/// Reads the selected file fully. Files above `limit` bytes are refused before reading.
pub async fn read_preview(file: SelectedFile, limit: u64) -> WorkflowResult<Preview> {
    let size = tokio::fs::metadata(&file.path)
        .await
        .map_err(|e| read_error(&file.path, e))?
        .len();
    if size > limit {
        return Err(WorkflowError::FileTooLarge { size, limit });
    }

    let bytes = tokio::fs::read(&file.path)
        .await
        .map_err(|e| read_error(&file.path, e))?;
    log::debug!("read {} ({} bytes)", file.name, bytes.len());

    Ok(Preview {
        file_name: file.name,
        mime: file.mime.to_string(),
        bytes: Arc::from(bytes),
    })
}

fn read_error(path: &Path, err: std::io::Error) -> WorkflowError {
    WorkflowError::FileRead(format!("{}: {}", path.display(), err))
}
