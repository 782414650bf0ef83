/// Image files picked by the user
use image::ImageFormat;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Extensions offered by the file picker and accepted on drop
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "tif", "tiff", "ico"];

/// An image selected for generation.
///
/// The bytes are shared, so cloning is cheap (messages and requests
/// carry their own copy of the handle).
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    name: String,
    mime: String,
    bytes: Arc<Vec<u8>>,
}

impl ImageFile {
    /// Build from in-memory bytes; the MIME type is sniffed from the
    /// content first and from the file name second
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime = detect_mime(&name, &bytes).to_string();
        Self {
            name,
            mime,
            bytes: Arc::new(bytes),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Handle to the same buffer, without copying
    pub fn shared_bytes(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Check whether a path looks like a supported image
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn detect_mime(name: &str, bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .or_else(|_| ImageFormat::from_path(name))
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

    #[test]
    fn test_mime_from_content() {
        // Content wins over a misleading extension
        let file = ImageFile::from_bytes("photo.jpg", PNG_MAGIC.to_vec());
        assert_eq!(file.mime(), "image/png");
    }

    #[test]
    fn test_mime_from_extension() {
        let file = ImageFile::from_bytes("shirt.webp", vec![0, 1, 2, 3]);
        assert_eq!(file.mime(), "image/webp");
    }

    #[test]
    fn test_unknown_mime() {
        let file = ImageFile::from_bytes("notes", vec![0, 1, 2, 3]);
        assert_eq!(file.mime(), "application/octet-stream");
    }

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported(Path::new("/tmp/sample.PNG")));
        assert!(is_supported(Path::new("tee.jpeg")));
        assert!(!is_supported(Path::new("notes.txt")));
        assert!(!is_supported(Path::new("no_extension")));
    }

    #[test]
    fn test_shared_bytes_point_at_same_buffer() {
        let file = ImageFile::from_bytes("sample.png", PNG_MAGIC.to_vec());
        let shared = file.shared_bytes();
        assert_eq!(shared.as_ptr(), file.bytes().as_ptr());
    }

    #[test]
    fn test_debug_omits_bytes() {
        let file = ImageFile::from_bytes("sample.png", PNG_MAGIC.to_vec());
        let debug = format!("{:?}", file);
        assert!(debug.contains("sample.png"));
        assert!(debug.contains("len: 8"));
    }
}
