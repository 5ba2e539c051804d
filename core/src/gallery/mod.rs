pub mod loader;

pub use loader::{load_gallery, Gallery, GalleryImage, GALLERY_EXTENSIONS};
