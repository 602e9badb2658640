//! Downloads the card image and decides which encoding it is stored as.
//!
//! Resolution is a bounded state machine: the document's own image gets one
//! attempt, the configured default image gets one more, and if the default
//! image does not resolve either the retrieval fails instead of looping.

use std::path::{Path, PathBuf};

use crate::config::{DefaultImage, Settings};
use crate::eid::Eid;
use crate::errors::{Result, UnfurlError};
use crate::http::{HttpClient, HttpResponse};
use crate::images::{is_generic_content_type, ImageKind};
use crate::storage::{BackendLocal, StorageManager};

const MAX_RESOLUTION_ATTEMPTS: usize = 2;

/// Which image to retrieve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Absolute URL taken from the document
    Remote(String),
    /// The configured default image
    Default,
}

/// An original image written to disk.
#[derive(Debug, Clone)]
pub struct SavedImage {
    pub id: Eid,
    pub kind: ImageKind,
    pub path: PathBuf,
    /// Site-relative path, `/`-separated
    pub relative_path: String,
}

#[derive(Debug)]
enum Resolution {
    Resolved { kind: ImageKind, bytes: Vec<u8> },
    Unrecognized,
}

/// Decides the encoding of a fetched image.
///
/// A recognized `Content-Type` wins. A missing or generic (octet-stream) one
/// defers to the URL extension, then optionally to the bytes themselves. A
/// present but unrecognized type is never second-guessed.
pub fn resolve_kind(url: &str, resp: &HttpResponse, sniff_bytes: bool) -> Option<ImageKind> {
    if !resp.is_success() {
        log::warn!("{url}: image request answered {}", resp.status);
        return None;
    }

    match resp.content_type.as_deref() {
        Some(content_type) if !is_generic_content_type(content_type) => {
            let kind = ImageKind::from_mime(content_type);
            if kind.is_none() {
                log::warn!("{url}: unrecognized image content type {content_type:?}");
            }
            kind
        }
        _ => {
            if let Some(kind) = ImageKind::from_location(url) {
                log::info!(
                    "{url}: no usable Content-Type, using URL extension .{}",
                    kind.extension()
                );
                return Some(kind);
            }

            if sniff_bytes {
                let sniffed = infer::get(&resp.body).and_then(|ftype| ImageKind::from_mime(ftype.mime_type()));
                if let Some(kind) = sniffed {
                    log::info!("{url}: detected {} from image bytes", kind.extension());
                    return Some(kind);
                }
            }

            log::warn!("{url}: no usable Content-Type and the URL extension gives no clue");
            None
        }
    }
}

fn resolve_remote(
    http: &dyn HttpClient,
    url: &str,
    sniff_bytes: bool,
) -> Result<Resolution> {
    let resp = http.get(url)?;

    Ok(match resolve_kind(url, &resp, sniff_bytes) {
        Some(kind) => Resolution::Resolved {
            kind,
            bytes: resp.body,
        },
        None => Resolution::Unrecognized,
    })
}

fn resolve_default(http: &dyn HttpClient, settings: &Settings) -> Result<Resolution> {
    match &settings.default_image_source {
        DefaultImage::Remote(url) => resolve_remote(http, url, settings.sniff_image_bytes),
        DefaultImage::Local(path) => {
            let Some(kind) = ImageKind::from_location(&path.to_string_lossy()) else {
                return Ok(Resolution::Unrecognized);
            };
            let bytes = std::fs::read(path)?;
            Ok(Resolution::Resolved { kind, bytes })
        }
    }
}

/// Retrieves `source` into `save_dir` under a fresh unique name.
///
/// `relative_dir` is the site-relative form of `save_dir`, used to build
/// [`SavedImage::relative_path`].
pub fn retrieve_image(
    http: &dyn HttpClient,
    settings: &Settings,
    source: ImageSource,
    save_dir: &Path,
    relative_dir: &str,
) -> Result<SavedImage> {
    let mut source = source;

    for _ in 0..MAX_RESOLUTION_ATTEMPTS {
        let resolution = match &source {
            ImageSource::Remote(url) => resolve_remote(http, url, settings.sniff_image_bytes)?,
            ImageSource::Default => resolve_default(http, settings)?,
        };

        match resolution {
            Resolution::Resolved { kind, bytes } => {
                return save_image(&bytes, kind, save_dir, relative_dir);
            }
            Resolution::Unrecognized if source == ImageSource::Default => break,
            Resolution::Unrecognized => {
                log::warn!(
                    "using the default image {} instead",
                    settings.default_image
                );
                source = ImageSource::Default;
            }
        }
    }

    Err(UnfurlError::UnresolvableImage {
        url: settings.default_image.clone(),
    })
}

fn save_image(
    bytes: &[u8],
    kind: ImageKind,
    save_dir: &Path,
    relative_dir: &str,
) -> Result<SavedImage> {
    let store = BackendLocal::new(save_dir)?;

    let id = Eid::new();
    let filename = format!("{id}.{}", kind.extension());
    store.write(&filename, bytes)?;

    Ok(SavedImage {
        path: store.path_of(&filename),
        relative_path: format!("{relative_dir}/{filename}"),
        id,
        kind,
    })
}
