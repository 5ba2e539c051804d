pub mod effect;
pub mod reducer;
pub mod session;
pub mod slideshow;

pub use effect::{Effect, Event, Timer};
pub use reducer::{GalleryState, Workflow};
pub use session::{Outcome, Phase, UploadSession};
pub use slideshow::Slideshow;
