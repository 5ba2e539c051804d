use crate::config::WorkflowSettings;
use crate::gallery::{Gallery, GalleryImage};
use crate::interface::{BackendStatus, ClassificationResult, Preview, SelectedFile, WakeReply};
use crate::prelude::{SessionToken, WorkflowError, WorkflowResult};
use crate::telemetry::{MetricsRecorder, MetricsSnapshot, SessionLog};
use crate::workflow::effect::{Effect, Event, Timer};
use crate::workflow::session::{Phase, UploadSession};
use crate::workflow::slideshow::Slideshow;

/// Availability of the placeholder gallery.
#[derive(Debug, Clone, PartialEq)]
pub enum GalleryState {
    Loading,
    Ready(Gallery),
    Failed(WorkflowError),
}

/// Upload/classify state machine. Every transition goes through [`Workflow::update`].
pub struct Workflow {
    settings: WorkflowSettings,
    gallery: GalleryState,
    slideshow: Slideshow,
    session: UploadSession,
    backend: BackendStatus,
    panel_visible: bool,
    log: SessionLog,
    metrics: MetricsRecorder,
}

impl Workflow {
    pub fn new(settings: WorkflowSettings) -> Self {
        Self {
            settings,
            gallery: GalleryState::Loading,
            slideshow: Slideshow::default(),
            session: UploadSession::new(SessionToken::initial()),
            backend: BackendStatus::asleep(),
            panel_visible: true,
            log: SessionLog::new(),
            metrics: MetricsRecorder::new(),
        }
    }

    pub fn update(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::GalleryLoaded(result) => {
                self.on_gallery(result);
                Vec::new()
            }
            Event::FileSelected(file) => {
                self.on_file_selected(file);
                Vec::new()
            }
            Event::Identify => self.on_identify(),
            Event::PreviewReady { token, result } => self.on_preview(token, result),
            Event::Classified { token, result } => self.on_classified(token, result),
            Event::TimerElapsed { token, timer } => self.on_timer(token, timer),
            Event::Tick => {
                self.slideshow.tick();
                Vec::new()
            }
            Event::Reset => self.on_reset(),
            Event::WakeRequested => self.on_wake_requested(),
            Event::WakeFinished(result) => {
                self.on_wake_finished(result);
                Vec::new()
            }
        }
    }

    fn on_gallery(&mut self, result: WorkflowResult<Gallery>) {
        match result {
            Ok(gallery) if gallery.is_empty() => {
                self.log.warn(self.session.token, "gallery is empty");
                self.gallery =
                    GalleryState::Failed(WorkflowError::EmptyGallery("gallery".into()));
            }
            Ok(gallery) => {
                self.slideshow.set_len(gallery.len());
                self.gallery = GalleryState::Ready(gallery);
            }
            Err(err) => {
                self.log.warn(self.session.token, &format!("gallery failed: {}", err));
                self.gallery = GalleryState::Failed(err);
            }
        }
    }

    fn on_file_selected(&mut self, file: SelectedFile) {
        if self.busy() {
            self.log
                .warn(self.session.token, "selection ignored while an upload is in flight");
            return;
        }
        self.log
            .record(self.session.token, &format!("selected {}", file.name));
        self.session.selection = Some(file);
    }

    fn on_identify(&mut self) -> Vec<Effect> {
        if !self.upload_enabled() {
            self.log.warn(self.session.token, "identify ignored: upload not available");
            return Vec::new();
        }

        let Some(file) = self.session.selection.clone() else {
            return vec![Effect::Alert(WorkflowError::NoFileSelected.to_string())];
        };

        let token = self.session.token.next();
        self.session = UploadSession::begin(token, file.clone());
        self.log.record(token, &format!("reading {}", file.name));

        vec![
            Effect::CancelTimers,
            Effect::ReadPreview {
                token,
                file,
                limit: self.settings.max_upload_bytes,
            },
        ]
    }

    fn on_preview(&mut self, token: SessionToken, result: WorkflowResult<Preview>) -> Vec<Effect> {
        if !self.is_current(token, Phase::Previewing, "preview") {
            return Vec::new();
        }

        match result {
            Ok(preview) => {
                let upload = preview.to_upload();
                self.session.preview = Some(preview);
                self.session.phase = Phase::Submitting;
                self.session.searching = true;
                self.metrics.record_submitted();
                self.log
                    .record(token, &format!("submitting {} bytes", upload.bytes.len()));
                vec![Effect::Submit { token, upload }]
            }
            Err(err) => {
                self.log.warn(token, &format!("preview failed: {}", err));
                self.session.phase = Phase::Idle;
                vec![Effect::Alert(err.to_string())]
            }
        }
    }

    fn on_classified(
        &mut self,
        token: SessionToken,
        result: WorkflowResult<ClassificationResult>,
    ) -> Vec<Effect> {
        if !self.is_current(token, Phase::Submitting, "classification") {
            return Vec::new();
        }
        if self.session.pending_result.is_some() {
            self.discard(token, "duplicate classification");
            return Vec::new();
        }

        let result = match result {
            Ok(result) => result,
            Err(err) => {
                self.log.warn(token, &format!("classification failed: {}", err));
                ClassificationResult::failure(&err)
            }
        };

        if result.stop_slideshow {
            self.log.record(token, "service asked for the slideshow");
            self.slideshow.start();
            self.session.pending_result = Some(result);
            return self.schedule(token, Timer::GracePeriod);
        }

        self.finish(token, result)
    }

    fn on_timer(&mut self, token: SessionToken, timer: Timer) -> Vec<Effect> {
        if token != self.session.token || self.session.pending_timer != Some(timer) {
            self.discard(token, "timer");
            return Vec::new();
        }
        self.session.pending_timer = None;

        match timer {
            Timer::GracePeriod => match self.session.pending_result.take() {
                Some(result) => self.finish(token, result),
                None => Vec::new(),
            },
            Timer::SlideshowStop => {
                self.stop_slideshow();
                self.panel_visible = true;
                self.log.record(token, "slideshow stopped");
                Vec::new()
            }
        }
    }

    fn on_reset(&mut self) -> Vec<Effect> {
        let token = self.session.token.next();
        self.session = UploadSession::new(token);
        self.slideshow.stop();
        self.panel_visible = true;
        self.log.record(token, "reset");
        vec![Effect::CancelTimers]
    }

    fn on_wake_requested(&mut self) -> Vec<Effect> {
        if self.backend.probing {
            return Vec::new();
        }
        self.backend = BackendStatus::probing();
        self.metrics.record_wake_probe();
        vec![Effect::Probe]
    }

    fn on_wake_finished(&mut self, result: WorkflowResult<WakeReply>) {
        self.backend = match result {
            Ok(reply) => {
                self.log
                    .record(self.session.token, &format!("backend awake: {}", reply.status));
                BackendStatus::from_reply(reply)
            }
            Err(err) => {
                self.log
                    .warn(self.session.token, &format!("wake probe failed: {}", err));
                BackendStatus::unavailable()
            }
        };
    }

    fn finish(&mut self, token: SessionToken, result: ClassificationResult) -> Vec<Effect> {
        if result.is_error() {
            self.metrics.record_failed();
        } else {
            self.metrics.record_succeeded();
        }
        self.log
            .record(token, &format!("resolved: {}", result.headline()));

        let stop_slideshow = result.stop_slideshow;
        self.session.resolve(result);

        if stop_slideshow {
            self.schedule(token, Timer::SlideshowStop)
        } else {
            Vec::new()
        }
    }

    fn schedule(&mut self, token: SessionToken, timer: Timer) -> Vec<Effect> {
        let after = match timer {
            Timer::GracePeriod => self.settings.grace_period,
            Timer::SlideshowStop => self.settings.stop_delay,
        };
        self.session.pending_timer = Some(timer);
        vec![Effect::Schedule {
            token,
            timer,
            after,
        }]
    }

    fn stop_slideshow(&mut self) {
        self.slideshow.stop();
        self.panel_visible = false;
    }

    fn is_current(&mut self, token: SessionToken, phase: Phase, what: &str) -> bool {
        if token == self.session.token && self.session.phase == phase {
            return true;
        }
        self.discard(token, what);
        false
    }

    fn discard(&mut self, stale: SessionToken, what: &str) {
        self.metrics.record_stale();
        self.log.discard(self.session.token, stale, what);
    }

    fn busy(&self) -> bool {
        self.session.in_flight() || self.slideshow.is_playing()
    }

    pub fn gallery(&self) -> &GalleryState {
        &self.gallery
    }

    pub fn gallery_ready(&self) -> bool {
        matches!(&self.gallery, GalleryState::Ready(g) if !g.is_empty())
    }

    pub fn session(&self) -> &UploadSession {
        &self.session
    }

    pub fn slideshow(&self) -> &Slideshow {
        &self.slideshow
    }

    pub fn backend(&self) -> &BackendStatus {
        &self.backend
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    pub fn panel_visible(&self) -> bool {
        self.panel_visible
    }

    /// Whether the picker and the Identify control may be offered.
    pub fn upload_enabled(&self) -> bool {
        self.gallery_ready()
            && (!self.settings.wake_probe || self.backend.awake)
            && !self.busy()
    }

    pub fn slideshow_playing(&self) -> bool {
        self.slideshow.is_playing()
    }

    /// Frame to draw; only while the request is still being searched for.
    pub fn slideshow_frame(&self) -> Option<&GalleryImage> {
        if !self.panel_visible || !self.session.searching || !self.slideshow.is_playing() {
            return None;
        }
        match &self.gallery {
            GalleryState::Ready(gallery) => gallery.get(self.slideshow.index()),
            _ => None,
        }
    }

    /// Result to draw; never at the same time as a slideshow frame.
    pub fn visible_result(&self) -> Option<&ClassificationResult> {
        if !self.panel_visible || self.session.searching {
            return None;
        }
        self.session.result.as_ref()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new(WorkflowSettings::default())
    }
}
