use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Map;

use crate::errors::{Result, UnfurlError};
use crate::http::HttpClient;
use crate::metadata::page::{parse_page, PageMetadata};
use crate::metadata::types::{MetadataDocument, OneOrMany};

pub const NO_TITLE: &str = "(No Title)";

/// How far into the body a `<meta charset>` declaration is looked for
const CHARSET_SNIFF_LEN: usize = 1024;

static META_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([a-z0-9_.:-]+)"#)
        .expect("Failed to compile meta charset regex")
});

fn header_charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

fn meta_charset(body: &[u8]) -> Option<&'static Encoding> {
    let head = String::from_utf8_lossy(&body[..body.len().min(CHARSET_SNIFF_LEN)]);
    let label = META_CHARSET.captures(&head)?.get(1)?;
    Encoding::for_label(label.as_str().as_bytes())
}

/// Decodes a page body by its declared charset.
///
/// The `Content-Type` charset wins, then a `<meta charset>` (or `http-equiv`)
/// declaration near the top of the document, then UTF-8. A byte order mark
/// overrides all of them.
pub fn decode_page(content_type: Option<&str>, body: &[u8]) -> String {
    let encoding = content_type
        .and_then(header_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| meta_charset(body))
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = encoding.decode(body);
    if had_errors {
        log::warn!("page is not valid {}, some characters were replaced", used.name());
    }

    text.into_owned()
}

/// Fetches `url` and builds its document. Nothing is persisted.
///
/// Network failures and non-2xx page responses are returned as errors.
pub fn fetch_document(
    http: &dyn HttpClient,
    url: &str,
    default_image: &str,
) -> Result<MetadataDocument> {
    let resp = http.get(url)?;
    if !resp.is_success() {
        return Err(UnfurlError::HttpStatus {
            url: url.to_string(),
            status: resp.status,
        });
    }

    let html = decode_page(resp.content_type.as_deref(), &resp.body);
    let page = parse_page(&html);

    Ok(build_document(url, page, default_image))
}

/// Applies the fallback defaults to whatever the page exposed.
pub fn build_document(url: &str, page: PageMetadata, default_image: &str) -> MetadataDocument {
    let PageMetadata {
        mut properties,
        document_title,
    } = page;

    let mut first = |key: &str| {
        properties
            .remove(key)
            .and_then(|values| values.first().cloned())
    };

    let description = first("description").unwrap_or_default();
    let title = first("title")
        .or(document_title)
        .unwrap_or_else(|| NO_TITLE.to_string());
    let canonical_url = first("url").unwrap_or_else(|| url.to_string());

    let image = match properties.remove("image") {
        Some(image) => image,
        None => {
            log::warn!(
                "image not found for {url}, using the default card image {default_image}. \
                 Edit the cached document to use a different one."
            );
            OneOrMany::One(default_image.to_string())
        }
    };
    let video = properties.remove("video:url");

    let extra: Map<_, _> = properties
        .into_iter()
        .map(|(key, values)| (key, values.into_value()))
        .collect();

    MetadataDocument {
        url: canonical_url,
        title,
        description,
        image,
        video,
        thumbnail_path: None,
        source_url: Some(url.to_string()),
        extra,
    }
}
