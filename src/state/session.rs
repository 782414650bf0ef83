/// The view-controller behind the main window
///
/// `Session` owns every piece of UI state and decides what async work the
/// window has to start. It never awaits anything itself: operations that
/// need a timer, a preview or a generation call hand back a job (`Ticket`,
/// `PreviewJob`, `GenerationRequest`) that the caller runs and reports back
/// through the matching `*_elapsed` / `*_ready` / `finish_*` method.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::autosave::{Debouncer, Ticket, AUTOSAVE_DELAY};
use super::settings::{Settings, SETTINGS_KEY};
use super::store::SettingsStore;
use crate::generate::{DescriptionGenerator, GenerationError};
use crate::media::{ImageFile, ImagePreview, LoadedImage, PreviewError, PreviewJob};
use std::path::PathBuf;

/// Reasons `begin_generation` refuses to start
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please upload a product image.")]
    MissingImage,

    #[error("A description is already being generated.")]
    Busy,
}

/// Inputs for one generation call
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub id: u64,
    pub image: ImageFile,
    pub features: String,
    pub audience: String,
}

impl GenerationRequest {
    /// Perform the call; the id comes back so the session can match it up
    pub async fn run(
        self,
        generator: Arc<dyn DescriptionGenerator>,
    ) -> (u64, Result<String, GenerationError>) {
        tracing::info!("✨ Generating description with {} for {}", generator.name(), self.image.name());
        let result = generator
            .generate(&self.image, &self.features, &self.audience)
            .await;
        (self.id, result)
    }
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    id: u64,
    /// Set by `clear`; the outcome is dropped when it arrives
    discarded: bool,
}

pub struct Session {
    store: Box<dyn SettingsStore>,
    /// Last settings handed to the store
    saved: Settings,

    features: String,
    audience: String,
    dark_mode: bool,

    image: Option<ImageFile>,
    preview: Option<ImagePreview>,
    description: String,
    loading: bool,
    error: Option<String>,

    autosave: Debouncer,
    preview_seq: u64,
    pending_preview: Option<u64>,
    request_seq: u64,
    in_flight: Option<InFlight>,
}

impl Session {
    /// Load settings from `store` and seed it on first run
    pub fn open(store: Box<dyn SettingsStore>) -> Self {
        Self::with_autosave_delay(store, AUTOSAVE_DELAY)
    }

    pub fn with_autosave_delay(store: Box<dyn SettingsStore>, delay: Duration) -> Self {
        let settings = store.load(SETTINGS_KEY, Settings::default());
        tracing::info!("⚙️  Settings loaded (dark mode: {})", settings.dark_mode);

        let mut session = Session {
            store,
            features: settings.features.clone(),
            audience: settings.audience.clone(),
            dark_mode: settings.dark_mode,
            saved: settings.clone(),
            image: None,
            preview: None,
            description: String::new(),
            loading: false,
            error: None,
            autosave: Debouncer::new(delay),
            preview_seq: 0,
            pending_preview: None,
            request_seq: 0,
            in_flight: None,
        };

        // Writing the loaded value back creates the entry on first run
        session.persist(settings);
        session
    }

    pub fn features(&self) -> &str {
        &self.features
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn image(&self) -> Option<&ImageFile> {
        self.image.as_ref()
    }

    pub fn preview(&self) -> Option<&ImagePreview> {
        self.preview.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Settings as last written to the store
    #[cfg(test)]
    pub fn saved_settings(&self) -> &Settings {
        &self.saved
    }

    pub fn autosave_delay(&self) -> Duration {
        self.autosave.delay()
    }

    // ========== Text fields & autosave ==========

    /// Replace the features text; returns the ticket of the autosave to schedule
    pub fn edit_features(&mut self, text: impl Into<String>) -> Ticket {
        self.features = text.into();
        self.autosave.schedule()
    }

    /// Replace the audience text; returns the ticket of the autosave to schedule
    pub fn edit_audience(&mut self, text: impl Into<String>) -> Ticket {
        self.audience = text.into();
        self.autosave.schedule()
    }

    /// An autosave timer elapsed. Saves if it is still the latest one.
    pub fn autosave_elapsed(&mut self, ticket: Ticket) -> bool {
        if !self.autosave.fire(ticket) {
            return false;
        }

        let settings = self.saved.with_text(&self.features, &self.audience);
        tracing::debug!("💾 Autosaving text fields");
        self.persist(settings);
        true
    }

    /// Stop any pending autosave; called when the window goes away
    pub fn close(&mut self) {
        self.autosave.cancel();
    }

    // ========== Theme ==========

    /// Change the theme and persist the flag right away
    pub fn set_dark_mode(&mut self, dark_mode: bool) {
        self.dark_mode = dark_mode;

        let mut settings = self.saved.clone();
        settings.dark_mode = dark_mode;
        self.persist(settings);
    }

    #[cfg(test)]
    pub fn toggle_dark_mode(&mut self) {
        self.set_dark_mode(!self.dark_mode);
    }

    // ========== Image & preview ==========

    /// Select (or deselect) the product image.
    ///
    /// Any load still running for an earlier selection is superseded.
    /// The current image stays on screen until the new file has been read
    /// and previewed. Returns the job to run when a file was selected.
    pub fn select_image(&mut self, path: Option<PathBuf>) -> Option<PreviewJob> {
        self.preview_seq += 1;

        match path {
            Some(path) => {
                tracing::info!("🖼️  Image selected: {}", path.display());
                self.pending_preview = Some(self.preview_seq);
                Some(PreviewJob {
                    id: self.preview_seq,
                    path,
                })
            }
            None => {
                self.image = None;
                self.preview = None;
                self.pending_preview = None;
                None
            }
        }
    }

    /// A file could not be used as the product image; the current
    /// selection is left as it was
    pub fn reject_image(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!("⚠️  Image rejected: {}", reason);
        self.error = Some(reason);
    }

    /// A load finished. Returns false if it was stale.
    ///
    /// On failure the previous selection is kept and the error is shown.
    pub fn preview_ready(&mut self, id: u64, result: Result<LoadedImage, PreviewError>) -> bool {
        if self.pending_preview != Some(id) {
            tracing::debug!("Dropping stale preview #{}", id);
            return false;
        }
        self.pending_preview = None;

        match result {
            Ok(LoadedImage { file, preview }) => {
                tracing::debug!("Loaded {:?}", file);
                self.image = Some(file);
                self.preview = Some(preview);
            }
            Err(e) => {
                tracing::warn!("⚠️  Preview failed: {}", e);
                self.error = Some(e.to_string());
            }
        }
        true
    }

    // ========== Generation ==========

    /// Validate and start a generation.
    ///
    /// On success loading is set, the previous result and error are
    /// cleared, and the returned request must be run and reported back
    /// through `finish_generation`.
    pub fn begin_generation(&mut self) -> Result<GenerationRequest, ValidationError> {
        if self.loading {
            return Err(ValidationError::Busy);
        }

        let image = match &self.image {
            Some(image) => image.clone(),
            None => {
                let err = ValidationError::MissingImage;
                self.error = Some(err.to_string());
                return Err(err);
            }
        };

        self.request_seq += 1;
        self.error = None;
        self.description.clear();
        self.loading = true;
        self.in_flight = Some(InFlight {
            id: self.request_seq,
            discarded: false,
        });

        Ok(GenerationRequest {
            id: self.request_seq,
            image,
            features: self.features.clone(),
            audience: self.audience.clone(),
        })
    }

    /// Record the outcome of a request. Returns false if the outcome was
    /// not applied (unknown request, or cleared while in flight).
    pub fn finish_generation(&mut self, id: u64, result: Result<String, GenerationError>) -> bool {
        let in_flight = match self.in_flight {
            Some(in_flight) if in_flight.id == id => in_flight,
            _ => {
                tracing::debug!("Ignoring result of unknown request #{}", id);
                return false;
            }
        };

        self.in_flight = None;
        self.loading = false;

        if in_flight.discarded {
            tracing::info!("Discarding result of request #{} (cleared while running)", id);
            return false;
        }

        match result {
            Ok(description) => {
                tracing::info!("✅ Description generated ({} chars)", description.len());
                self.description = description;
            }
            Err(e) => {
                tracing::warn!("⚠️  Generation failed: {}", e);
                self.error = Some(e.user_message());
            }
        }
        true
    }

    // ========== Clear ==========

    /// Reset image, preview, description and error together
    pub fn clear(&mut self) {
        self.preview_seq += 1;
        self.pending_preview = None;
        self.image = None;
        self.preview = None;
        self.description.clear();
        self.error = None;

        if let Some(in_flight) = self.in_flight.as_mut() {
            in_flight.discarded = true;
        }
    }

    fn persist(&mut self, settings: Settings) {
        if let Err(e) = self.store.save(SETTINGS_KEY, &settings) {
            tracing::warn!("⚠️  Failed to save settings: {}", e);
        }
        self.saved = settings;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("image", &self.image)
            .field("loading", &self.loading)
            .field("error", &self.error)
            .field("dark_mode", &self.dark_mode)
            .finish()
    }
}
