use iced::{
    widget::{button, column, progress_bar, text, text_input, toggler, Space},
    Element, Length,
};

/// Main view state
pub struct DownloadView {
    pub url: String,
    pub status_message: String,
    pub progress: u8,
    pub is_downloading: bool,
    pub dark_mode: bool,
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            url: String::new(),
            status_message: "Paste a video URL to download".to_string(),
            progress: 0,
            is_downloading: false,
            // Matches the app's initial color mode
            dark_mode: true,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlChanged(String),
    DownloadPressed,
    ThemeToggled(bool),
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UrlChanged(url) => {
                self.url = url;
            }
            DownloadMessage::ThemeToggled(dark) => {
                self.dark_mode = dark;
            }
            DownloadMessage::DownloadPressed => {
                // Handled by the app
            }
        }
    }

    pub fn view(&self) -> Element<'_, DownloadMessage> {
        let mut input = text_input("https://www.youtube.com/watch?v=xxxxxxxxx", &self.url);
        if !self.is_downloading {
            input = input.on_input(DownloadMessage::UrlChanged);
        }

        let mut content = column![
            text("ViBE").size(32),
            Space::new().height(Length::Fixed(20.0)),
            text("Video URL:").size(16),
            input.padding(10),
            Space::new().height(Length::Fixed(10.0)),
            text(&self.status_message).size(14),
        ];

        if self.is_downloading {
            content = content.push(progress_bar(0.0..=100.0, self.progress as f32));
            content = content.push(text(format!("{}%", self.progress)).size(14));
        }

        content = content.push(Space::new().height(Length::Fixed(20.0)));
        content = content.push(
            button(if self.is_downloading {
                "Downloading..."
            } else {
                "Download"
            })
            .on_press_maybe((!self.is_downloading).then_some(DownloadMessage::DownloadPressed))
            .padding([10, 20]),
        );
        content = content.push(Space::new().height(Length::Fixed(20.0)));
        content = content.push(
            toggler(self.dark_mode)
                .label("Dark mode")
                .on_toggle(DownloadMessage::ThemeToggled),
        );

        content.padding(20).spacing(10).into()
    }
}
