//! Session workflow core for the image identifier.
//!
//! The modules cover the placeholder gallery, the slideshow driver, the
//! upload/classify session reducer and the HTTP client for the remote
//! classification service. Front-ends own the event loop and execute the
//! effects the reducer returns.

pub mod config;
pub mod gallery;
pub mod interface;
pub mod prelude;
pub mod remote;
pub mod telemetry;
pub mod workflow;

pub use config::{ConfigOverrides, WidgetConfig};
pub use prelude::{Classifier, ErrorKind, SessionToken, WorkflowError, WorkflowResult};
