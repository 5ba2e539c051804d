use crate::interface::{ClassificationResult, Preview, SelectedFile};
use crate::prelude::SessionToken;
use crate::workflow::effect::Timer;

/// Whether a resolved session ended with a usable category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Previewing,
    Submitting,
    Resolved(Outcome),
}

/// State of the single live upload-to-result cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadSession {
    pub token: SessionToken,
    pub selection: Option<SelectedFile>,
    pub preview: Option<Preview>,
    pub phase: Phase,
    /// True from submission until the result is stored, including the grace period.
    pub searching: bool,
    pub result: Option<ClassificationResult>,
    /// Result received but held back until the grace period ends.
    pub pending_result: Option<ClassificationResult>,
    pub pending_timer: Option<Timer>,
}

impl UploadSession {
    pub fn new(token: SessionToken) -> Self {
        Self {
            token,
            selection: None,
            preview: None,
            phase: Phase::Idle,
            searching: false,
            result: None,
            pending_result: None,
            pending_timer: None,
        }
    }

    /// A fresh session carrying over the picker selection.
    pub fn begin(token: SessionToken, selection: SelectedFile) -> Self {
        Self {
            selection: Some(selection),
            phase: Phase::Previewing,
            ..Self::new(token)
        }
    }

    /// True while a file read, a request or the grace period is outstanding.
    pub fn in_flight(&self) -> bool {
        matches!(self.phase, Phase::Previewing | Phase::Submitting)
    }

    /// Stores the final result and ends the searching state.
    pub fn resolve(&mut self, result: ClassificationResult) {
        let outcome = if result.is_error() {
            Outcome::Failure
        } else {
            Outcome::Success
        };
        self.phase = Phase::Resolved(outcome);
        self.result = Some(result);
        self.searching = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_keeps_selection_and_starts_previewing() {
        let file = SelectedFile::from_path("/tmp/cat.jpg").unwrap();
        let session = UploadSession::begin(SessionToken::initial().next(), file.clone());
        assert_eq!(session.selection, Some(file));
        assert_eq!(session.phase, Phase::Previewing);
        assert!(session.in_flight());
        assert!(!session.searching);
    }

    #[test]
    fn resolve_clears_searching_and_classifies_outcome() {
        let mut session = UploadSession::new(SessionToken::initial());
        session.phase = Phase::Submitting;
        session.searching = true;
        session.resolve(ClassificationResult::success("dog"));
        assert_eq!(session.phase, Phase::Resolved(Outcome::Success));
        assert!(!session.searching);

        let mut session = UploadSession::new(SessionToken::initial());
        session.resolve(ClassificationResult {
            error: Some("Server error processing image".into()),
            ..Default::default()
        });
        assert_eq!(session.phase, Phase::Resolved(Outcome::Failure));
    }
}
