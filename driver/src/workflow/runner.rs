use anyhow::Context;
use identcore::gallery::load_gallery;
use identcore::interface::{read_preview, BackendStatus, ClassificationResult, SelectedFile};
use identcore::telemetry::MetricsSnapshot;
use identcore::workflow::{Effect, Event, GalleryState, Workflow};
use identcore::{Classifier, WidgetConfig};
use log::{info, warn};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Outcome of one headless run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub result: Option<ClassificationResult>,
    pub alerts: Vec<String>,
    pub backend: BackendStatus,
    pub frames_shown: usize,
    /// Time from start until the result became visible.
    pub resolved_after: Option<Duration>,
    pub elapsed: Duration,
    pub metrics: MetricsSnapshot,
}

/// Drives the workflow reducer on tokio, standing in for the widget's event loop.
#[derive(Clone)]
pub struct Runner<C> {
    config: WidgetConfig,
    classifier: C,
}

/// Background work owned by a run; aborted on every exit path.
#[derive(Default)]
struct Timers {
    session_timer: Option<JoinHandle<()>>,
    ticker: Option<JoinHandle<()>>,
}

impl Timers {
    fn replace_session_timer(&mut self, handle: JoinHandle<()>) {
        self.cancel_session_timer();
        self.session_timer = Some(handle);
    }

    fn cancel_session_timer(&mut self) {
        if let Some(handle) = self.session_timer.take() {
            handle.abort();
        }
    }

    fn cancel_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        self.cancel_session_timer();
        self.cancel_ticker();
    }
}

impl<C> Runner<C>
where
    C: Classifier + Clone + Send + Sync + 'static,
{
    pub fn new(config: WidgetConfig, classifier: C) -> Self {
        Self { config, classifier }
    }

    pub async fn run(&self, image: Option<PathBuf>) -> anyhow::Result<RunReport> {
        let started = Instant::now();
        let mut workflow = Workflow::new(self.config.workflow_settings());
        let (tx, mut rx) = unbounded_channel();
        let mut timers = Timers::default();
        let mut alerts = Vec::new();

        let gallery = load_gallery(self.config.gallery_dir.clone(), self.config.gallery_timeout()).await;
        workflow.update(Event::GalleryLoaded(gallery));
        if let GalleryState::Failed(err) = workflow.gallery() {
            return Err(err.clone())
                .with_context(|| format!("loading gallery {}", self.config.gallery_dir.display()));
        }

        if self.config.wake_probe {
            let effects = workflow.update(Event::WakeRequested);
            self.execute(effects, &tx, &mut timers, &mut alerts);
            let event = next_event(&mut rx).await?;
            workflow.update(event);
            info!("backend: {}", workflow.backend().message);
            if !workflow.backend().awake {
                return Ok(self.report(&workflow, alerts, 0, None, started));
            }
        }

        if let Some(path) = image {
            match SelectedFile::from_path(&path) {
                Ok(file) => {
                    workflow.update(Event::FileSelected(file));
                }
                Err(err) => {
                    warn!("{}", err);
                    alerts.push(err.to_string());
                    return Ok(self.report(&workflow, alerts, 0, None, started));
                }
            }
        }

        let effects = workflow.update(Event::Identify);
        self.execute(effects, &tx, &mut timers, &mut alerts);

        let mut frames_shown = 0;
        let mut resolved_after = None;
        while !settled(&workflow) {
            self.sync_ticker(&workflow, &tx, &mut timers);

            let event = next_event(&mut rx).await?;
            let effects = workflow.update(event);
            self.execute(effects, &tx, &mut timers, &mut alerts);

            if workflow.slideshow_frame().is_some() {
                frames_shown += 1;
            }
            if resolved_after.is_none() && workflow.visible_result().is_some() {
                resolved_after = Some(started.elapsed());
            }
        }

        Ok(self.report(&workflow, alerts, frames_shown, resolved_after, started))
    }

    fn execute(
        &self,
        effects: Vec<Effect>,
        tx: &UnboundedSender<Event>,
        timers: &mut Timers,
        alerts: &mut Vec<String>,
    ) {
        for effect in effects {
            match effect {
                Effect::Alert(message) => {
                    warn!("{}", message);
                    alerts.push(message);
                }
                Effect::ReadPreview { token, file, limit } => {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let result = read_preview(file, limit).await;
                        let _ = tx.send(Event::PreviewReady { token, result });
                    });
                }
                Effect::Submit { token, upload } => {
                    let tx = tx.clone();
                    let classifier = self.classifier.clone();
                    tokio::spawn(async move {
                        let result = classifier.classify(upload).await;
                        let _ = tx.send(Event::Classified { token, result });
                    });
                }
                Effect::Schedule {
                    token,
                    timer,
                    after,
                } => {
                    let tx = tx.clone();
                    timers.replace_session_timer(tokio::spawn(async move {
                        tokio::time::sleep(after).await;
                        let _ = tx.send(Event::TimerElapsed { token, timer });
                    }));
                }
                Effect::CancelTimers => timers.cancel_session_timer(),
                Effect::Probe => {
                    let tx = tx.clone();
                    let classifier = self.classifier.clone();
                    tokio::spawn(async move {
                        let result = classifier.wake().await;
                        let _ = tx.send(Event::WakeFinished(result));
                    });
                }
            }
        }
    }

    /// Keeps a tick task alive exactly while the slideshow plays.
    fn sync_ticker(&self, workflow: &Workflow, tx: &UnboundedSender<Event>, timers: &mut Timers) {
        if !workflow.slideshow_playing() {
            timers.cancel_ticker();
            return;
        }
        if timers.ticker.is_some() {
            return;
        }

        let tx = tx.clone();
        let period = self.config.tick_interval();
        timers.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(Event::Tick).is_err() {
                    break;
                }
            }
        }));
    }

    fn report(
        &self,
        workflow: &Workflow,
        alerts: Vec<String>,
        frames_shown: usize,
        resolved_after: Option<Duration>,
        started: Instant,
    ) -> RunReport {
        RunReport {
            result: workflow.session().result.clone(),
            alerts,
            backend: workflow.backend().clone(),
            frames_shown,
            resolved_after,
            elapsed: started.elapsed(),
            metrics: workflow.metrics(),
        }
    }
}

/// Nothing outstanding: no read, no request, no timer, no slideshow.
fn settled(workflow: &Workflow) -> bool {
    let session = workflow.session();
    !session.in_flight() && session.pending_timer.is_none() && !workflow.slideshow_playing()
}

async fn next_event(rx: &mut UnboundedReceiver<Event>) -> anyhow::Result<Event> {
    rx.recv().await.context("event channel closed before the workflow settled")
}
