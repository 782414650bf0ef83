/// Preview generation for the selected product image
/// Reads the file, encodes it as a data URL and reads its dimensions
use base64::{engine::general_purpose, Engine as _};
use image::ImageReader;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use super::file::ImageFile;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreviewError {
    #[error("The selected file is empty.")]
    Empty,

    #[error("Could not read {name}: {reason}")]
    Read { name: String, reason: String },

    #[error("Preview worker failed: {0}")]
    Worker(String),
}

/// Displayable form of an image
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePreview {
    /// `data:<mime>;base64,<payload>`
    pub data_url: String,
    /// Pixel size, when the format was recognised
    pub dimensions: Option<(u32, u32)>,
    /// File bytes for the image widget, shared with the `ImageFile`
    pub bytes: Arc<Vec<u8>>,
}

impl std::fmt::Debug for ImagePreview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePreview")
            .field("data_url_len", &self.data_url.len())
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

/// One pending selection; `id` lets the session drop stale results
#[derive(Debug, Clone)]
pub struct PreviewJob {
    pub id: u64,
    pub path: PathBuf,
}

/// A selection that has been read and previewed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub file: ImageFile,
    pub preview: ImagePreview,
}

/// Read the file and build its preview off the UI thread
pub async fn render(job: PreviewJob) -> (u64, Result<LoadedImage, PreviewError>) {
    let PreviewJob { id, path } = job;
    (id, load(path).await)
}

async fn load(path: PathBuf) -> Result<LoadedImage, PreviewError> {
    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let bytes = tokio::fs::read(&path).await.map_err(|e| PreviewError::Read {
        name: name.clone(),
        reason: e.to_string(),
    })?;
    let file = ImageFile::from_bytes(name, bytes);

    // Spawn blocking because base64 and header decoding touch the whole file
    let worker_file = file.clone();
    let preview = tokio::task::spawn_blocking(move || render_blocking(&worker_file))
        .await
        .map_err(|e| PreviewError::Worker(format!("Task join error: {}", e)))??;

    Ok(LoadedImage { file, preview })
}

/// Blocking implementation of preview generation
pub fn render_blocking(file: &ImageFile) -> Result<ImagePreview, PreviewError> {
    if file.is_empty() {
        return Err(PreviewError::Empty);
    }

    let data_url = to_data_url(file.mime(), file.bytes());

    // Dimensions are informational; an unknown format still gets a data URL
    let dimensions = ImageReader::new(Cursor::new(file.bytes()))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.into_dimensions().ok());

    match dimensions {
        Some((w, h)) => tracing::debug!("🖼️  Preview for {}: {}x{}", file.name(), w, h),
        None => tracing::debug!("🖼️  Preview for {}: dimensions unknown", file.name()),
    }

    Ok(ImagePreview {
        data_url,
        dimensions,
        bytes: file.shared_bytes(),
    })
}

/// Encode bytes as a base64 data URL
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, general_purpose::STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgba};

    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_data_url_format() {
        assert_eq!(to_data_url("image/png", b"abc"), "data:image/png;base64,YWJj");
        assert_eq!(to_data_url("image/gif", b""), "data:image/gif;base64,");
    }

    #[test]
    fn test_render_png() {
        let file = ImageFile::from_bytes("sample.png", sample_png(2, 3));

        let preview = render_blocking(&file).unwrap();

        assert!(preview.data_url.starts_with("data:image/png;base64,iVBORw0KGgo"));
        assert_eq!(preview.dimensions, Some((2, 3)));
        assert_eq!(preview.bytes.as_slice(), file.bytes());
    }

    #[test]
    fn test_render_unknown_format_still_previews() {
        let file = ImageFile::from_bytes("scan.bin", vec![1, 2, 3, 4]);

        let preview = render_blocking(&file).unwrap();

        assert_eq!(preview.data_url, "data:application/octet-stream;base64,AQIDBA==");
        assert_eq!(preview.dimensions, None);
    }

    #[test]
    fn test_render_empty_file() {
        let file = ImageFile::from_bytes("empty.png", Vec::new());
        assert_eq!(render_blocking(&file), Err(PreviewError::Empty));
    }

    #[tokio::test]
    async fn test_render_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.png");
        std::fs::write(&path, sample_png(1, 1)).unwrap();

        let (id, result) = render(PreviewJob { id: 7, path }).await;

        assert_eq!(id, 7);
        let loaded = result.unwrap();
        assert_eq!(loaded.file.name(), "sample.png");
        assert_eq!(loaded.file.mime(), "image/png");
        assert_eq!(loaded.preview.dimensions, Some((1, 1)));
        // Preview shares the file's buffer
        assert!(Arc::ptr_eq(&loaded.preview.bytes, &loaded.file.shared_bytes()));
    }

    #[tokio::test]
    async fn test_render_missing_file() {
        let job = PreviewJob {
            id: 3,
            path: PathBuf::from("/nonexistent/sample.png"),
        };

        let (id, result) = render(job).await;

        assert_eq!(id, 3);
        match result {
            Err(PreviewError::Read { name, .. }) => assert_eq!(name, "sample.png"),
            other => panic!("expected a read error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_render_empty_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        std::fs::write(&path, b"").unwrap();

        let (_, result) = render(PreviewJob { id: 1, path }).await;

        assert_eq!(result, Err(PreviewError::Empty));
    }
}
