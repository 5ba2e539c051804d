use anyhow::Context;
use clap::Parser;
use identcore::gallery::{load_gallery, Gallery};
use identcore::interface::{read_preview, SelectedFile, IMAGE_EXTENSIONS};
use identcore::remote::ClassifierClient;
use identcore::workflow::{Effect, Event, GalleryState, Workflow};
use identcore::{Classifier, ConfigOverrides, WidgetConfig};
use iced::{
    task, time,
    widget::{button, column, container, image, row, svg, text, Column},
    Alignment, Element, Font, Length, Subscription, Task, Theme,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Image identification widget")]
struct Args {
    /// Load settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Base URL of the classification service
    #[arg(long, env = "IDENTIFY_ENDPOINT")]
    endpoint: Option<String>,
    /// Directory holding the placeholder slideshow images
    #[arg(long)]
    gallery: Option<PathBuf>,
    /// Offer a wake-up control and gate uploads on it
    #[arg(long, default_value_t = false)]
    wake: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = WidgetConfig::resolve(
        args.config.as_deref(),
        ConfigOverrides {
            endpoint: args.endpoint,
            gallery: args.gallery,
            wake: args.wake,
        },
    )
    .context("resolving configuration")?;
    let client = ClassifierClient::from_config(&config).context("building classifier client")?;
    log::info!("classification service at {}", client.base_url());

    iced::application(
        move || Identifier::boot(config.clone(), client.clone()),
        Identifier::update,
        Identifier::view,
    )
    .title(application_title)
    .subscription(application_subscription)
    .theme(application_theme)
    .run()
    .context("running widget")
}

fn application_title(_: &Identifier) -> String {
    "Image Identifier".into()
}

/// Slideshow ticks exist only while the slideshow is playing.
fn application_subscription(state: &Identifier) -> Subscription<Message> {
    if state.workflow.slideshow_playing() {
        time::every(state.config.tick_interval()).map(|_| Message::Workflow(Event::Tick))
    } else {
        Subscription::none()
    }
}

fn application_theme(_: &Identifier) -> Theme {
    Theme::Light
}

#[derive(Debug, Clone)]
enum Message {
    Workflow(Event),
    ChooseFile,
    ToggleReply,
}

/// Decoded gallery entry, kept alongside the reducer's paths.
#[derive(Debug, Clone)]
enum Frame {
    Raster(image::Handle),
    Vector(svg::Handle),
}

struct Identifier {
    config: WidgetConfig,
    client: ClassifierClient,
    workflow: Workflow,
    frames: Vec<Frame>,
    preview: Option<image::Handle>,
    /// Dropping the handle aborts the pending delay.
    session_timer: Option<task::Handle>,
    show_reply: bool,
}

impl Identifier {
    fn boot(config: WidgetConfig, client: ClassifierClient) -> (Self, Task<Message>) {
        let workflow = Workflow::new(config.workflow_settings());
        let load = load_gallery(config.gallery_dir.clone(), config.gallery_timeout());
        (
            Identifier {
                config,
                client,
                workflow,
                frames: Vec::new(),
                preview: None,
                session_timer: None,
                show_reply: false,
            },
            Task::perform(load, |result| {
                Message::Workflow(Event::GalleryLoaded(result))
            }),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Workflow(event) => state.dispatch(event),
            Message::ChooseFile => match pick_image() {
                Some(Ok(file)) => state.dispatch(Event::FileSelected(file)),
                Some(Err(err)) => {
                    show_alert(&err.to_string());
                    Task::none()
                }
                None => Task::none(),
            },
            Message::ToggleReply => {
                state.show_reply = !state.show_reply;
                Task::none()
            }
        }
    }

    fn dispatch(&mut self, event: Event) -> Task<Message> {
        let effects = self.workflow.update(event);
        self.sync_frames();
        self.sync_preview();

        let mut tasks = Vec::with_capacity(effects.len());
        for effect in effects {
            tasks.push(self.execute(effect));
        }
        Task::batch(tasks)
    }

    fn execute(&mut self, effect: Effect) -> Task<Message> {
        match effect {
            Effect::Alert(message) => {
                show_alert(&message);
                Task::none()
            }
            Effect::ReadPreview { token, file, limit } => {
                Task::perform(read_preview(file, limit), move |result| {
                    Message::Workflow(Event::PreviewReady { token, result })
                })
            }
            Effect::Submit { token, upload } => {
                let client = self.client.clone();
                Task::perform(
                    async move { client.classify(upload).await },
                    move |result| Message::Workflow(Event::Classified { token, result }),
                )
            }
            Effect::Schedule {
                token,
                timer,
                after,
            } => {
                let (delay, handle) = Task::perform(tokio::time::sleep(after), move |_| {
                    Message::Workflow(Event::TimerElapsed { token, timer })
                })
                .abortable();
                self.session_timer = Some(handle.abort_on_drop());
                delay
            }
            Effect::CancelTimers => {
                self.session_timer = None;
                Task::none()
            }
            Effect::Probe => {
                let client = self.client.clone();
                Task::perform(async move { client.wake().await }, |result| {
                    Message::Workflow(Event::WakeFinished(result))
                })
            }
        }
    }

    fn sync_frames(&mut self) {
        if !self.frames.is_empty() {
            return;
        }
        if let GalleryState::Ready(gallery) = self.workflow.gallery() {
            self.frames = decode_frames(gallery);
        }
    }

    fn sync_preview(&mut self) {
        match &self.workflow.session().preview {
            Some(preview) if self.preview.is_none() => {
                self.preview = Some(image::Handle::from_bytes(preview.bytes.to_vec()));
            }
            Some(_) => {}
            None => self.preview = None,
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let heading = text("Object Detection using ResNet-101 Model").size(34);

        let body: Element<'_, Message> = match state.workflow.gallery() {
            GalleryState::Loading => text("Loading images...").size(18).into(),
            GalleryState::Failed(err) => text(format!("Placeholder images unavailable: {err}"))
                .size(18)
                .into(),
            GalleryState::Ready(_) if state.workflow.panel_visible() => state.panel(),
            GalleryState::Ready(_) => Column::new().into(),
        };

        let layout = column![heading, body]
            .spacing(28)
            .padding(32)
            .align_x(Alignment::Center);

        container(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    fn panel(&self) -> Element<'_, Message> {
        let workflow = &self.workflow;
        let backend = workflow.backend();
        let mut panel = Column::new()
            .spacing(16)
            .align_x(Alignment::Center)
            .push(text("Upload an Image and click on Detect").size(22));

        if workflow.settings().wake_probe {
            if !backend.awake {
                let wake = button("Wake up server")
                    .padding(10)
                    .on_press_maybe(
                        (!backend.probing).then_some(Message::Workflow(Event::WakeRequested)),
                    );
                panel = panel.push(wake);
            }
            if !backend.message.is_empty() {
                panel = panel.push(text(&backend.message).size(14));
            }
        }

        if workflow.upload_enabled() {
            let chosen = workflow
                .session()
                .selection
                .as_ref()
                .map(|file| file.name.as_str())
                .unwrap_or("No file chosen");
            panel = panel
                .push(
                    row![
                        button("Choose image")
                            .on_press(Message::ChooseFile)
                            .padding(10),
                        text(chosen).size(14),
                    ]
                    .spacing(12)
                    .align_y(Alignment::Center),
                )
                .push(
                    button("Detect")
                        .on_press(Message::Workflow(Event::Identify))
                        .padding(10),
                );
        }

        if workflow.session().searching {
            panel = match workflow.slideshow_frame() {
                Some(_) => panel.push(self.frame_view(workflow.slideshow().index())),
                None => panel.push(text("Searching...").size(16)),
            };
        } else if let Some(result) = workflow.visible_result() {
            if let Some(preview) = &self.preview {
                panel = panel.push(image(preview.clone()).width(Length::Fixed(320.0)));
            }
            panel = panel
                .push(text("Your Uploaded Image contains:").size(18))
                .push(text(result.headline()).size(28));
            if let Some(probability) = result.probability_label() {
                panel = panel.push(text(format!("Probability: {probability}")).size(16));
            }
            if let Some(error) = &result.error {
                if error != result.headline() {
                    panel = panel.push(text(error).size(14));
                }
            }
            let toggle = if self.show_reply {
                "Hide server reply"
            } else {
                "Show server reply"
            };
            panel = panel.push(button(toggle).on_press(Message::ToggleReply).padding(6));
            if self.show_reply {
                panel = panel.push(
                    container(text(result.pretty()).size(12).font(Font::MONOSPACE)).padding(8),
                );
            }
            panel = panel.push(
                button("Reset")
                    .on_press(Message::Workflow(Event::Reset))
                    .padding(10),
            );
        }

        panel.into()
    }

    fn frame_view(&self, index: usize) -> Element<'_, Message> {
        let size = Length::Fixed(320.0);
        match self.frames.get(index) {
            Some(Frame::Raster(handle)) => image(handle.clone()).width(size).height(size).into(),
            Some(Frame::Vector(handle)) => svg(handle.clone()).width(size).height(size).into(),
            None => text("Searching...").size(16).into(),
        }
    }
}

fn decode_frames(gallery: &Gallery) -> Vec<Frame> {
    gallery
        .iter()
        .map(|entry| {
            if entry.is_vector() {
                Frame::Vector(svg::Handle::from_path(entry.path.clone()))
            } else {
                Frame::Raster(image::Handle::from_path(entry.path.clone()))
            }
        })
        .collect()
}

/// Returns `None` when the dialog is dismissed.
fn pick_image() -> Option<identcore::WorkflowResult<SelectedFile>> {
    let path = rfd::FileDialog::new()
        .set_title("Choose an image")
        .add_filter("Images", IMAGE_EXTENSIONS)
        .pick_file()?;
    Some(SelectedFile::from_path(path))
}

fn show_alert(message: &str) {
    log::warn!("alert: {}", message);
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Warning)
        .set_title("Image Identifier")
        .set_description(message)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}
