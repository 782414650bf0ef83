/// Product image handling
///
/// This module handles:
/// - The in-memory image file and its MIME type (file.rs)
/// - Reading files and turning them into data-URL previews off the UI thread (preview.rs)

pub mod file;
pub mod preview;

pub use file::ImageFile;
pub use preview::{ImagePreview, LoadedImage, PreviewError, PreviewJob};
