pub mod log;
pub mod metrics;

pub use self::log::SessionLog;
pub use metrics::{MetricsRecorder, MetricsSnapshot};
