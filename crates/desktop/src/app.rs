use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use iced::widget::{button, column, container, image, pick_list, row, slider, text, text_input};
use iced::{Element, Length, Subscription, Task, Theme};

use facelock_core::display::domain::overlay::Overlay;
use facelock_core::monitor::presence_monitor_use_case::MonitorOutcome;

use crate::settings::{Appearance, Settings};
use crate::workers::monitor_worker::{self, WorkerMessage};

/// How often the UI drains worker messages while monitoring.
const POLL_INTERVAL: Duration = Duration::from_millis(33);

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Message {
    Start,
    Stop,
    Tick,
    LockDelayChanged(u32),
    ConfidenceChanged(u32),
    DetectEveryChanged(u32),
    CameraChanged(String),
    AppearanceChanged(Appearance),
    RestoreDefaults,
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Idle,
    Downloading(u64, u64),
    Starting,
    Monitoring(Overlay),
    Finished(MonitorOutcome),
    Failed(String),
}

impl Status {
    pub fn label(&self) -> String {
        match self {
            Status::Idle => "Stopped".to_string(),
            Status::Downloading(downloaded, total) if *total > 0 => {
                format!(
                    "Downloading face model... {}%",
                    downloaded * 100 / total
                )
            }
            Status::Downloading(downloaded, _) => {
                format!("Downloading face model... {downloaded} bytes")
            }
            Status::Starting => "Starting camera...".to_string(),
            Status::Monitoring(Overlay::Faces(boxes)) => match boxes.len() {
                0 => "Watching".to_string(),
                1 => boxes[0].label.clone(),
                n => format!("{} ({n})", boxes[0].label),
            },
            Status::Monitoring(overlay) => overlay.message().unwrap_or_default().to_string(),
            Status::Finished(outcome) => capitalize(&outcome.to_string()),
            Status::Failed(e) => format!("Error: {e}"),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

struct Worker {
    rx: Receiver<WorkerMessage>,
    quit: Sender<()>,
}

pub struct App {
    pub settings: Settings,
    status: Status,
    worker: Option<Worker>,
    preview: Option<image::Handle>,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        (
            Self {
                settings: Settings::load(),
                status: Status::Idle,
                worker: None,
                preview: None,
            },
            Task::none(),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Start => {
                if self.worker.is_none() {
                    let (rx, quit) = monitor_worker::spawn(self.settings.to_monitor_config());
                    self.worker = Some(Worker { rx, quit });
                    self.status = Status::Starting;
                    self.preview = None;
                }
            }
            Message::Stop => {
                if let Some(worker) = &self.worker {
                    let _ = worker.quit.try_send(());
                }
            }
            Message::Tick => self.drain_worker(),
            Message::LockDelayChanged(val) => {
                self.settings.lock_delay_secs = val;
                self.settings.save();
            }
            Message::ConfidenceChanged(val) => {
                self.settings.confidence = val;
                self.settings.save();
            }
            Message::DetectEveryChanged(val) => {
                self.settings.detect_every = val;
                self.settings.save();
            }
            Message::CameraChanged(camera) => {
                self.settings.camera = camera;
                self.settings.save();
            }
            Message::AppearanceChanged(appearance) => {
                self.settings.appearance = appearance;
                self.settings.save();
            }
            Message::RestoreDefaults => {
                self.settings = Settings::default();
                self.settings.save();
            }
        }
        Task::none()
    }

    /// Applies everything the worker sent since the last tick. Only the
    /// newest frame is turned into an image handle.
    fn drain_worker(&mut self) {
        let Some(worker) = &self.worker else {
            return;
        };

        let mut latest_frame = None;
        let mut finished = false;
        for msg in worker.rx.try_iter() {
            match msg {
                WorkerMessage::DownloadProgress(downloaded, total) => {
                    self.status = Status::Downloading(downloaded, total);
                }
                WorkerMessage::CameraReady {
                    device,
                    width,
                    height,
                } => {
                    log::info!("Camera {device} streaming at {width}x{height}");
                    self.status = Status::Starting;
                }
                WorkerMessage::Frame(frame) => latest_frame = Some(frame),
                WorkerMessage::Finished(outcome) => {
                    self.status = Status::Finished(outcome);
                    finished = true;
                }
                WorkerMessage::Error(e) => {
                    self.status = Status::Failed(e);
                    finished = true;
                }
            }
        }

        if let Some(frame) = latest_frame {
            if !finished {
                self.status = Status::Monitoring(frame.overlay);
            }
            self.preview = Some(image::Handle::from_rgba(
                frame.width,
                frame.height,
                frame.rgba,
            ));
        }
        if finished {
            self.worker = None;
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let running = self.worker.is_some();

        let preview: Element<'_, Message> = match &self.preview {
            Some(handle) => image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => container(text("No camera image").size(14))
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into(),
        };

        let status = text(self.status.label()).size(16);

        let toggle = if running {
            button(text("Stop")).on_press(Message::Stop).style(button::danger)
        } else {
            button(text("Start")).on_press(Message::Start).style(button::primary)
        };

        let settings = &self.settings;
        // changes apply on the next start
        let camera = text_input("Camera device", &settings.camera)
            .on_input_maybe((!running).then_some(Message::CameraChanged));

        let controls = column![
            labeled(
                format!("Lock after {}s without a face", settings.lock_delay_secs),
                slider(3..=300, settings.lock_delay_secs, Message::LockDelayChanged),
            ),
            labeled(
                format!("Detection confidence {}%", settings.confidence),
                slider(10..=95, settings.confidence, Message::ConfidenceChanged),
            ),
            labeled(
                format!("Detect every {} frame(s)", settings.detect_every),
                slider(1..=10, settings.detect_every, Message::DetectEveryChanged),
            ),
            labeled("Camera".to_string(), camera),
            row![
                pick_list(
                    Appearance::ALL,
                    Some(settings.appearance),
                    Message::AppearanceChanged
                ),
                button(text("Restore defaults"))
                    .on_press_maybe((!running).then_some(Message::RestoreDefaults))
                    .style(button::secondary),
            ]
            .spacing(8),
        ]
        .spacing(10)
        .width(Length::Fixed(280.0));

        let body = row![
            container(preview)
                .width(Length::Fill)
                .height(Length::Fill)
                .style(container::rounded_box),
            controls
        ]
        .spacing(16)
        .height(Length::Fill);

        column![row![container(status).width(Length::Fill), toggle], body]
            .spacing(12)
            .padding(16)
            .height(Length::Fill)
            .into()
    }

    pub fn theme(&self) -> Theme {
        match self.settings.appearance {
            Appearance::Dark => Theme::Dark,
            Appearance::Light => Theme::Light,
        }
    }

    pub fn subscription(&self) -> Subscription<Message> {
        if self.worker.is_some() {
            iced::time::every(POLL_INTERVAL).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }
}

fn labeled<'a>(
    label: String,
    control: impl Into<Element<'a, Message>>,
) -> Element<'a, Message> {
    column![text(label).size(13), control.into()].spacing(4).into()
}
