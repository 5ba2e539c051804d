pub mod backend;
pub mod classification;
pub mod upload;

pub use backend::{BackendStatus, WakeReply, WAKE_APOLOGY};
pub use classification::{ClassificationResult, CLASSIFY_FALLBACK};
pub use upload::{image_mime, read_preview, Preview, SelectedFile, Upload, IMAGE_EXTENSIONS};
