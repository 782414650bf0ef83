use iced::widget::{button, column, container, image, row, text, text_editor};
use iced::{event, window, Event};
use iced::{Element, Subscription, Task, Theme};
use iced::{Length, Alignment};
use rfd::FileDialog;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod config;
mod generate;
mod media;
mod state;
mod ui;

use config::Config;
use generate::{DescriptionGenerator, GeminiGenerator, GenerationError};
use media::file::{is_supported, IMAGE_EXTENSIONS};
use media::{LoadedImage, PreviewError};
use state::autosave::{self, Ticket};
use state::session::Session;
use state::store::{MemoryStore, SettingsStore, SqliteStore};

/// Main application state
struct ProductCopy {
    /// Everything the window shows, minus the editor buffers
    session: Session,
    /// Backend for the Generate button
    generator: Arc<dyn DescriptionGenerator>,
    /// Editor buffers; their text is mirrored into the session on every edit
    features: text_editor::Content,
    audience: text_editor::Content,
    /// GPU handle for the current preview, rebuilt only when the preview changes
    preview_handle: Option<image::Handle>,
}

/// Which text area an edit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Features,
    Audience,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked "Choose Image"
    PickImage,
    /// A file was dropped onto the window
    ImageDropped(PathBuf),
    /// Background preview conversion finished
    PreviewReady(u64, Result<LoadedImage, PreviewError>),
    FeaturesEdited(text_editor::Action),
    AudienceEdited(text_editor::Action),
    /// An autosave timer elapsed
    AutosaveDue(Ticket),
    DarkModeToggled(bool),
    /// User clicked "Generate Description"
    Generate,
    /// The generation call returned
    GenerationFinished(u64, Result<String, GenerationError>),
    Clear,
    CopyDescription,
}

impl ProductCopy {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let config = Config::from_env().unwrap_or_else(|e| {
            tracing::warn!("⚠️  {}", e);
            Config::default()
        });

        if config.api_key.is_none() {
            tracing::warn!("⚠️  GEMINI_API_KEY is not set; generation will fail until it is");
        }

        let session = Session::open(open_store(&config.data_dir));
        let generator: Arc<dyn DescriptionGenerator> = Arc::new(GeminiGenerator::new(&config));

        tracing::info!("🎨 Product Copy Studio ready (model: {})", config.model);

        (Self::with_session(session, generator), Task::none())
    }

    fn with_session(session: Session, generator: Arc<dyn DescriptionGenerator>) -> Self {
        ProductCopy {
            features: text_editor::Content::with_text(session.features()),
            audience: text_editor::Content::with_text(session.audience()),
            session,
            generator,
            preview_handle: None,
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickImage => {
                // Show the native file picker dialog
                let file = FileDialog::new()
                    .set_title("Select Product Image")
                    .add_filter("Images", IMAGE_EXTENSIONS)
                    .pick_file();

                match file {
                    Some(path) => self.load_image(&path),
                    None => Task::none(),
                }
            }
            Message::ImageDropped(path) => self.load_image(&path),
            Message::PreviewReady(id, result) => {
                // A failed load keeps the previous handle along with the previous image
                let loaded = result.is_ok();
                if self.session.preview_ready(id, result) && loaded {
                    // The widget owns its buffer, so the bytes are copied once per load
                    self.preview_handle = self
                        .session
                        .preview()
                        .map(|preview| image::Handle::from_bytes(preview.bytes.to_vec()));
                }
                Task::none()
            }
            Message::FeaturesEdited(action) => match self.edit(Field::Features, action) {
                Some(ticket) => self.schedule_autosave(ticket),
                None => Task::none(),
            },
            Message::AudienceEdited(action) => match self.edit(Field::Audience, action) {
                Some(ticket) => self.schedule_autosave(ticket),
                None => Task::none(),
            },
            Message::AutosaveDue(ticket) => {
                self.session.autosave_elapsed(ticket);
                Task::none()
            }
            Message::DarkModeToggled(dark_mode) => {
                self.session.set_dark_mode(dark_mode);
                Task::none()
            }
            Message::Generate => match self.session.begin_generation() {
                Ok(request) => Task::perform(
                    request.run(self.generator.clone()),
                    |(id, result)| Message::GenerationFinished(id, result),
                ),
                Err(e) => {
                    tracing::info!("Generate rejected: {}", e);
                    Task::none()
                }
            },
            Message::GenerationFinished(id, result) => {
                self.session.finish_generation(id, result);
                Task::none()
            }
            Message::Clear => {
                self.session.clear();
                self.preview_handle = None;
                Task::none()
            }
            Message::CopyDescription => {
                iced::clipboard::write(self.session.description().to_string())
            }
        }
    }

    /// Start loading a picked or dropped file; the read happens in the preview task
    fn load_image(&mut self, path: &Path) -> Task<Message> {
        if !is_supported(path) {
            let name = path.file_name().unwrap_or_default().to_string_lossy();
            self.session.reject_image(format!("{} is not a supported image type.", name));
            return Task::none();
        }

        match self.session.select_image(Some(path.to_path_buf())) {
            Some(job) => Task::perform(media::preview::render(job), |(id, result)| {
                Message::PreviewReady(id, result)
            }),
            None => Task::none(),
        }
    }

    /// Apply an editor action and mirror the text into the session.
    /// Returns the autosave ticket when the text changed.
    fn edit(&mut self, field: Field, action: text_editor::Action) -> Option<Ticket> {
        let is_edit = action.is_edit();
        let content = match field {
            Field::Features => &mut self.features,
            Field::Audience => &mut self.audience,
        };
        content.perform(action);

        if !is_edit {
            return None;
        }

        let text = editor_text(content);
        Some(match field {
            Field::Features => self.session.edit_features(text),
            Field::Audience => self.session.edit_audience(text),
        })
    }

    fn schedule_autosave(&self, ticket: Ticket) -> Task<Message> {
        Task::perform(
            autosave::elapsed(ticket, self.session.autosave_delay()),
            Message::AutosaveDue,
        )
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let session = &self.session;

        let panels = row![
            ui::input_panel::view(
                self.preview_handle.as_ref(),
                session.image().map(|file| file.name()),
                &self.features,
                &self.audience,
            ),
            ui::output_panel::view(session.description(), session.is_loading(), session.error()),
        ]
        .spacing(24)
        .height(Length::Fill);

        // Disabled while a request is in flight
        let generate = button(
            container(text(if session.is_loading() {
                "Generating Description..."
            } else {
                "Generate Description"
            })
            .size(18))
            .center_x(Length::Fill),
        )
        .width(Length::Fill)
        .padding(14)
        .on_press_maybe((!session.is_loading()).then_some(Message::Generate));

        let content = column![
            ui::header::view(session.dark_mode()),
            panels,
            generate,
            text("Descriptions are generated by an AI model; review them before publishing.")
                .size(12)
                .style(text::secondary),
        ]
        .spacing(20)
        .padding(32)
        .align_x(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Dark mode preference drives the whole window's theme
    fn theme(&self) -> Theme {
        if self.session.dark_mode() {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    /// Window events: files dropped onto the window become image selections
    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(|event, _status, _window| match event {
            Event::Window(window::Event::FileDropped(path)) => Some(Message::ImageDropped(path)),
            _ => None,
        })
    }
}

/// Editor contents without the line ending `Content::text` appends
fn editor_text(content: &text_editor::Content) -> String {
    let mut text = content.text();
    if text.ends_with('\n') {
        text.pop();
    }
    text
}

/// Open the settings database, falling back to a volatile store
fn open_store(data_dir: &Path) -> Box<dyn SettingsStore> {
    match SqliteStore::open(data_dir) {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::warn!("⚠️  {}; preferences will not be saved this session", e);
            Box::new(MemoryStore::new())
        }
    }
}

/// Console logging; honours RUST_LOG, defaults to info
fn init_logging() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn main() -> iced::Result {
    init_logging();

    iced::application(
        "Product Copy Studio",
        ProductCopy::update,
        ProductCopy::view,
    )
    .theme(ProductCopy::theme)
    .subscription(ProductCopy::subscription)
    .window_size((1200.0, 860.0))
    .centered()
    .run_with(ProductCopy::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::settings::Settings;
    use std::rc::Rc;
    use text_editor::{Action, Edit};

    fn open_app() -> (ProductCopy, Rc<MemoryStore>) {
        let store = Rc::new(MemoryStore::new());
        let session = Session::open(Box::new(store.clone()));
        let generator: Arc<dyn DescriptionGenerator> =
            Arc::new(GeminiGenerator::new(&Config::default()));
        (ProductCopy::with_session(session, generator), store)
    }

    fn replace_all(app: &mut ProductCopy, field: Field, text: &str) -> Option<Ticket> {
        app.edit(field, Action::SelectAll);
        app.edit(field, Action::Edit(Edit::Paste(Arc::new(text.to_string()))))
    }

    #[test]
    fn test_editor_text_drops_one_line_ending() {
        assert_eq!(editor_text(&text_editor::Content::with_text("Teens")), "Teens");
        assert_eq!(editor_text(&text_editor::Content::new()), "");
        assert_eq!(
            editor_text(&text_editor::Content::with_text("Material: Cotton\nFit: Loose")),
            "Material: Cotton\nFit: Loose"
        );
    }

    #[test]
    fn test_edited_audience_is_saved_verbatim() {
        let (mut app, store) = open_app();

        let ticket = replace_all(&mut app, Field::Audience, "Teens").unwrap();
        let _ = app.update(Message::AutosaveDue(ticket));

        assert_eq!(app.session.audience(), "Teens");
        let saved = store.load(state::settings::SETTINGS_KEY, Settings::default());
        assert_eq!(saved.audience, "Teens");
        assert_eq!(saved.features, Settings::default().features);
    }

    #[test]
    fn test_saved_text_reloads_without_growing() {
        let (mut app, store) = open_app();
        let ticket = replace_all(&mut app, Field::Features, "Material: Cotton").unwrap();
        let _ = app.update(Message::AutosaveDue(ticket));

        let session = Session::open(Box::new(store.clone()));
        let reopened = ProductCopy::with_session(session, app.generator.clone());

        assert_eq!(editor_text(&reopened.features), "Material: Cotton");
        assert_eq!(reopened.session.features(), "Material: Cotton");
    }

    #[test]
    fn test_cursor_moves_do_not_schedule_saves() {
        let (mut app, store) = open_app();
        let writes = store.writes().len();

        assert!(app.edit(Field::Features, Action::SelectAll).is_none());

        assert_eq!(store.writes().len(), writes);
    }
}
