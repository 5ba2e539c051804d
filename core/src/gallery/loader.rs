use crate::prelude::{WorkflowError, WorkflowResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Placeholder formats picked up from the gallery directory.
pub const GALLERY_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "svg", "webp"];

/// One placeholder frame of the searching slideshow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryImage {
    pub path: PathBuf,
    pub name: String,
}

impl GalleryImage {
    pub fn is_vector(&self) -> bool {
        self.path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("svg"))
            .unwrap_or(false)
    }
}

/// Ordered, immutable set of placeholder frames. Cheap to clone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gallery {
    images: Arc<[GalleryImage]>,
}

impl Gallery {
    pub fn new(images: Vec<GalleryImage>) -> Self {
        Self {
            images: Arc::from(images),
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GalleryImage> {
        self.images.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GalleryImage> {
        self.images.iter()
    }
}

/// Enumerates the gallery directory, failing after `bound` or when nothing usable is found.
pub async fn load_gallery(dir: PathBuf, bound: Duration) -> WorkflowResult<Gallery> {
    let gallery = tokio::time::timeout(bound, scan_directory(&dir))
        .await
        .map_err(|_| WorkflowError::GalleryTimeout(bound.as_millis() as u64))??;

    if gallery.is_empty() {
        log::warn!("no placeholder images in {}", dir.display());
        return Err(WorkflowError::EmptyGallery(dir.display().to_string()));
    }

    log::info!(
        "loaded {} placeholder images from {}",
        gallery.len(),
        dir.display()
    );
    Ok(gallery)
}

async fn scan_directory(dir: &Path) -> WorkflowResult<Gallery> {
    let unavailable = |e: std::io::Error| {
        WorkflowError::GalleryUnavailable(format!("{}: {}", dir.display(), e))
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(unavailable)?;
    let mut images = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(unavailable)? {
        let path = entry.path();
        let is_file = entry
            .file_type()
            .await
            .map(|kind| kind.is_file())
            .unwrap_or(false);
        if !is_file || !has_gallery_extension(&path) {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        images.push(GalleryImage { path, name });
    }

    // Bundler globs resolve in lexical order; match that instead of directory order.
    images.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Gallery::new(images))
}

fn has_gallery_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            GALLERY_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const BOUND: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn gallery_keeps_images_in_name_order() {
        let dir = tempdir().unwrap();
        for name in ["c.webp", "a.png", "B.SVG", "notes.txt", "b.jpeg"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let gallery = load_gallery(dir.path().to_path_buf(), BOUND).await.unwrap();
        let names: Vec<&str> = gallery.iter().map(|img| img.name.as_str()).collect();
        assert_eq!(names, vec!["B.SVG", "a.png", "b.jpeg", "c.webp"]);
        assert!(gallery.get(0).unwrap().is_vector());
        assert!(gallery.get(4).is_none());
    }

    #[tokio::test]
    async fn empty_gallery_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("readme.md"), b"x").unwrap();

        let err = load_gallery(dir.path().to_path_buf(), BOUND).await.unwrap_err();
        assert!(matches!(err, WorkflowError::EmptyGallery(_)));
    }

    #[tokio::test]
    async fn missing_directory_is_unavailable() {
        let err = load_gallery(PathBuf::from("/nonexistent/gallery"), BOUND)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::GalleryUnavailable(_)));
    }
}
