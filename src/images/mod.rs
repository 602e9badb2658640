//! Image retrieval and thumbnail derivation for cards.

pub mod retrieve;
pub mod thumbnail;

use image::ImageFormat;

pub use retrieve::{retrieve_image, ImageSource, SavedImage};
pub use thumbnail::{create_thumbnail, fit_and_crop, Thumbnail};

/// Image encodings a card image may be stored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
}

impl ImageKind {
    /// Maps a `Content-Type` value to a kind. Parameters (`; charset=...`) are ignored.
    pub fn from_mime(content_type: &str) -> Option<Self> {
        let media_type = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match media_type.as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Infers a kind from the trailing extension of a URL or path, ignoring
    /// any query string or fragment.
    pub fn from_location(location: &str) -> Option<Self> {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let file_name = path.rsplit('/').next().unwrap_or_default();
        let (_, ext) = file_name.rsplit_once('.')?;

        Self::from_extension(ext)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }

    pub fn format(&self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Gif => ImageFormat::Gif,
        }
    }
}

/// True for content types that carry no information about the encoding.
pub fn is_generic_content_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    media_type == "binary/octet-stream" || media_type == "application/octet-stream"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mime() {
        assert_eq!(ImageKind::from_mime("image/jpeg"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_mime("image/jpg"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_mime("IMAGE/PNG; charset=binary"), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_mime("image/gif"), Some(ImageKind::Gif));
        assert_eq!(ImageKind::from_mime("image/webp"), None);
        assert_eq!(ImageKind::from_mime("text/html"), None);
    }

    #[test]
    fn test_from_location() {
        assert_eq!(
            ImageKind::from_location("https://cdn.example.com/a/b/photo.JPG"),
            Some(ImageKind::Jpeg)
        );
        assert_eq!(
            ImageKind::from_location("https://cdn.example.com/photo.jpeg?w=600#x"),
            Some(ImageKind::Jpeg)
        );
        assert_eq!(ImageKind::from_location("images/logo.png"), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_location("https://example.com/image"), None);
        assert_eq!(ImageKind::from_location("https://example.com/photo.webp"), None);
        // a dot in the host is not an extension
        assert_eq!(ImageKind::from_location("https://example.gif/"), None);
    }

    #[test]
    fn test_generic_content_types() {
        assert!(is_generic_content_type("binary/octet-stream"));
        assert!(is_generic_content_type("application/octet-stream"));
        assert!(is_generic_content_type("Binary/Octet-Stream"));
        assert!(!is_generic_content_type("image/png"));
        assert!(!is_generic_content_type("text/html"));
    }

    #[test]
    fn test_extension_round_trip() {
        for kind in [ImageKind::Jpeg, ImageKind::Png, ImageKind::Gif] {
            assert_eq!(ImageKind::from_extension(kind.extension()), Some(kind));
        }
    }
}
