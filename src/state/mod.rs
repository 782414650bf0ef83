/// State management module
///
/// This module handles all application state, including:
/// - Persisted user preferences (settings.rs)
/// - The settings key-value store (store.rs)
/// - Debounced autosave of edited text (autosave.rs)
/// - The window's view-controller and generation flow (session.rs)

pub mod autosave;
pub mod session;
pub mod settings;
pub mod store;
