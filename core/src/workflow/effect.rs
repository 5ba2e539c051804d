use crate::gallery::Gallery;
use crate::interface::{ClassificationResult, Preview, SelectedFile, Upload, WakeReply};
use crate::prelude::{SessionToken, WorkflowResult};
use std::time::Duration;

/// Fixed delays owned by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Minimum time the slideshow stays up once the service asked for it.
    GracePeriod,
    /// Delay between showing the result and tearing the slideshow down.
    SlideshowStop,
}

/// Inputs to [`Workflow::update`](super::Workflow::update).
#[derive(Debug, Clone)]
pub enum Event {
    GalleryLoaded(WorkflowResult<Gallery>),
    FileSelected(SelectedFile),
    Identify,
    PreviewReady {
        token: SessionToken,
        result: WorkflowResult<Preview>,
    },
    Classified {
        token: SessionToken,
        result: WorkflowResult<ClassificationResult>,
    },
    TimerElapsed {
        token: SessionToken,
        timer: Timer,
    },
    Tick,
    Reset,
    WakeRequested,
    WakeFinished(WorkflowResult<WakeReply>),
}

/// Work the front-end must carry out on behalf of the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Blocking user-facing notice.
    Alert(String),
    ReadPreview {
        token: SessionToken,
        file: SelectedFile,
        limit: u64,
    },
    Submit {
        token: SessionToken,
        upload: Upload,
    },
    /// Replaces the session's timer; the previous one must be released.
    Schedule {
        token: SessionToken,
        timer: Timer,
        after: Duration,
    },
    CancelTimers,
    Probe,
}
