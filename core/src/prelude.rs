use crate::interface::{ClassificationResult, Upload, WakeReply};
use std::fmt;
use std::future::Future;

/// Identifies one upload-to-result cycle. Bumped on every new upload and on reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionToken(u64);

impl SessionToken {
    pub fn initial() -> Self {
        Self(0)
    }

    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// Broad failure classes used to decide how an error is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Shown to the user as a blocking alert; session state is left alone.
    UserInput,
    /// Recovered locally into a synthesized result or backend status.
    Transport,
    /// The placeholder gallery could not be produced.
    Gallery,
    Config,
}

/// Common error type for the workflow and its collaborators.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("No image uploaded")]
    NoFileSelected,
    #[error("unsupported file type: {0}")]
    UnsupportedFile(String),
    #[error("image is {size} bytes, the limit is {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },
    #[error("could not read image: {0}")]
    FileRead(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("no gallery images found in {0}")]
    EmptyGallery(String),
    #[error("gallery unavailable: {0}")]
    GalleryUnavailable(String),
    #[error("gallery load timed out after {0} ms")]
    GalleryTimeout(u64),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::NoFileSelected
            | WorkflowError::UnsupportedFile(_)
            | WorkflowError::FileTooLarge { .. }
            | WorkflowError::FileRead(_) => ErrorKind::UserInput,
            WorkflowError::Transport(_) | WorkflowError::MalformedResponse(_) => {
                ErrorKind::Transport
            }
            WorkflowError::EmptyGallery(_)
            | WorkflowError::GalleryUnavailable(_)
            | WorkflowError::GalleryTimeout(_) => ErrorKind::Gallery,
            WorkflowError::Config(_) => ErrorKind::Config,
        }
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Remote classification service as seen by the front-ends.
///
/// Both calls are single-attempt: no retry, no timeout, no backoff.
pub trait Classifier {
    /// POST the upload and parse the reply into a result.
    fn classify(
        &self,
        upload: Upload,
    ) -> impl Future<Output = WorkflowResult<ClassificationResult>> + Send;

    /// GET the service root to wake a cold-started backend.
    fn wake(&self) -> impl Future<Output = WorkflowResult<WakeReply>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_token_increases_monotonically() {
        let first = SessionToken::initial();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.value(), 1);
        assert_eq!(second.to_string(), "session#1");
    }

    #[test]
    fn error_kinds_follow_taxonomy() {
        assert_eq!(WorkflowError::NoFileSelected.kind(), ErrorKind::UserInput);
        assert_eq!(
            WorkflowError::Transport("refused".into()).kind(),
            ErrorKind::Transport
        );
        assert_eq!(
            WorkflowError::EmptyGallery("images".into()).kind(),
            ErrorKind::Gallery
        );
    }
}
