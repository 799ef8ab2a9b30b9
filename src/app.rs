use std::path::PathBuf;

use futures::StreamExt;
use iced::{Task, Theme};

use crate::api::ResolverClient;
use crate::application::{DownloadCoordinator, DownloadEvent};
use crate::config::AppConfig;
use crate::domain::{AppError, DownloadPlan};
use crate::library::MediaLibrary;
use crate::storage::StorageStrategy;
use crate::ui::{DownloadMessage, DownloadView};

pub struct DownloadApp {
    view: DownloadView,
    coordinator: DownloadCoordinator,
}

impl Default for DownloadApp {
    fn default() -> Self {
        Self::new(AppConfig::load())
    }
}

impl DownloadApp {
    pub fn new(config: AppConfig) -> Self {
        let coordinator = DownloadCoordinator::new(
            ResolverClient::new(config.resolver),
            MediaLibrary::default_location(),
            config.storage,
        );

        Self {
            view: DownloadView::default(),
            coordinator,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Ui(DownloadMessage),
    /// Resolved stream info, or the error to surface
    PlanReady(Result<DownloadPlan, AppError>),
    /// Granted destination directory; `None` means the user declined
    DestinationResolved(Option<PathBuf>, DownloadPlan),
    /// Progress and terminal events from the transfer stream
    Transfer(DownloadEvent),
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::Ui(ui_msg) => {
            app.view.update(ui_msg.clone());

            if let DownloadMessage::DownloadPressed = ui_msg {
                // Empty input and re-submission are both silent no-ops
                if app.view.url.trim().is_empty() || app.view.is_downloading {
                    return Task::none();
                }

                app.view.is_downloading = true;
                app.view.progress = 0;
                app.view.status_message = "Resolving stream info...".to_string();

                let coordinator = app.coordinator.clone();
                let url = app.view.url.clone();
                return Task::perform(
                    async move { coordinator.prepare_download(url).await },
                    Message::PlanReady,
                );
            }
        }
        Message::PlanReady(result) => match result {
            Ok(plan) => {
                // Only the scoped strategy opens a folder picker
                app.view.status_message = match app.coordinator.storage() {
                    StorageStrategy::ScopedDirectoryPermission => {
                        "Choose a download folder...".to_string()
                    }
                    StorageStrategy::FixedAppDirectory => {
                        "Preparing download folder...".to_string()
                    }
                };

                let coordinator = app.coordinator.clone();
                return Task::perform(
                    async move { coordinator.resolve_destination().await },
                    move |dest| Message::DestinationResolved(dest, plan.clone()),
                );
            }
            Err(e) => {
                app.view.is_downloading = false;
                app.view.progress = 0;
                app.view.status_message = e.to_string();
            }
        },
        Message::DestinationResolved(dest, plan) => match dest {
            Some(dir) => {
                app.view.status_message = format!("Downloading to: {}", dir.display());

                let stream = app.coordinator.download_stream(plan, dir);
                return Task::stream(stream.map(Message::Transfer));
            }
            None => {
                // Permission declined: reset without surfacing anything
                app.view.is_downloading = false;
                app.view.progress = 0;
                app.view.status_message = "Paste a video URL to download".to_string();
            }
        },
        Message::Transfer(event) => match event {
            DownloadEvent::Progress(percent) => {
                app.view.progress = percent;
                app.view.status_message = format!("Downloading: {}%", percent);
            }
            DownloadEvent::Completed(path) => {
                app.view.is_downloading = false;
                app.view.progress = 0;
                app.view.status_message = format!("\"{}\" has been downloaded.", path.display());
            }
            DownloadEvent::Failed(e) => {
                app.view.is_downloading = false;
                app.view.progress = 0;
                app.view.status_message = e.to_string();
            }
        },
    }
    Task::none()
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::Ui)
}

pub fn theme(app: &DownloadApp) -> Theme {
    if app.view.dark_mode {
        Theme::Dark
    } else {
        Theme::Light
    }
}
