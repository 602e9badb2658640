//! Persistent metadata documents, one JSON file per URL slug.
//!
//! Entries never expire; deleting a file is the only way to force a refetch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::errors::Result;
use crate::metadata::MetadataDocument;
use crate::slug::slugify;
use crate::storage::{BackendLocal, StorageManager};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub struct MetadataCache {
    store: Arc<dyn StorageManager>,
}

impl MetadataCache {
    pub fn new(store: Arc<dyn StorageManager>) -> Self {
        Self { store }
    }

    /// Opens the cache directory, creating it when missing.
    pub fn open(dir: &Path) -> Result<Self> {
        Ok(Self::new(Arc::new(BackendLocal::new(dir)?)))
    }

    pub fn file_name(url: &str) -> String {
        format!("{}.json", slugify(url))
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        self.store.path_of(&Self::file_name(url))
    }

    /// Reads the cached document for `url`. Never touches the network.
    pub fn get(&self, url: &str) -> Result<Option<MetadataDocument>> {
        let ident = Self::file_name(url);
        if !self.store.exists(&ident) {
            return Ok(None);
        }

        let bytes = self.store.read(&ident)?;
        let json = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
        let doc: MetadataDocument = serde_json::from_slice(json)?;

        if let Some(source_url) = doc.source_url.as_deref() {
            if source_url != url {
                log::warn!(
                    "{url} shares cache entry {ident} with {source_url}; \
                     both will render the same card"
                );
            }
        }

        Ok(Some(doc))
    }

    /// Writes the document for `url`, replacing any previous entry.
    pub fn put(&self, url: &str, doc: &MetadataDocument) -> Result<()> {
        let json = serde_json::to_vec(doc)?;
        self.store.write(&Self::file_name(url), &json)?;
        Ok(())
    }

    /// Slugs of every cached document
    pub fn slugs(&self) -> Vec<String> {
        let mut slugs: Vec<String> = self
            .store
            .list()
            .into_iter()
            .filter_map(|name| name.strip_suffix(".json").map(str::to_string))
            .collect();
        slugs.sort();
        slugs
    }
}

/// One mutex per slug, so a slug is resolved and written by one caller at a
/// time while distinct slugs proceed independently.
///
/// Entries are never removed, the map holds one per slug seen during the
/// lifetime of its owner.
#[derive(Default)]
pub struct SlugLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SlugLocks {
    pub fn lock_for(&self, slug: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(slug.to_string()).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::OneOrMany;
    use serde_json::{json, Map};

    fn document() -> MetadataDocument {
        let mut extra = Map::new();
        extra.insert("site_name".into(), json!("Example"));
        extra.insert("locale:alternate".into(), json!(["ja_JP", "fr_FR"]));

        MetadataDocument {
            url: "https://example.com/article".into(),
            title: "T".into(),
            description: "D".into(),
            image: OneOrMany::Many(vec![
                "https://example.com/1.jpg".into(),
                "https://example.com/2.jpg".into(),
            ]),
            video: None,
            thumbnail_path: Some("images/thumbnails/httpsexamplecomarticle/x-thumbnail.jpg".into()),
            source_url: Some("https://example.com/article".into()),
            extra,
        }
    }

    #[test]
    fn test_miss_then_hit() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = MetadataCache::open(tmp.path()).unwrap();
        let url = "https://example.com/article";

        assert!(cache.get(url).unwrap().is_none());

        cache.put(url, &document()).unwrap();
        assert_eq!(
            cache.path_for(url),
            tmp.path().join("httpsexamplecomarticle.json")
        );
        assert_eq!(cache.get(url).unwrap(), Some(document()));
        assert_eq!(cache.slugs(), vec!["httpsexamplecomarticle".to_string()]);
    }

    #[test]
    fn test_round_trip_keeps_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = MetadataCache::open(tmp.path()).unwrap();
        let url = "https://example.com/article";
        cache.put(url, &document()).unwrap();

        let written: serde_json::Value =
            serde_json::from_slice(&std::fs::read(cache.path_for(url)).unwrap()).unwrap();
        let reloaded = serde_json::to_value(cache.get(url).unwrap().unwrap()).unwrap();
        assert_eq!(written, reloaded);

        let mut keys: Vec<&String> = written.as_object().unwrap().keys().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "description",
                "image",
                "locale:alternate",
                "site_name",
                "title",
                "url",
                "urlcard:source_url",
                "urlcard:thumbnail_image"
            ]
        );
    }

    #[test]
    fn test_byte_order_mark_tolerated() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = MetadataCache::open(tmp.path()).unwrap();
        let url = "https://example.com/bom";

        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(
            br#"{"url": "https://example.com/bom", "title": "T", "description": "", "image": "https://example.com/i.png", "pelican:thumbnail_image": "images/thumbnails/httpsexamplecombom/a-thumbnail.png"}"#,
        );
        std::fs::write(cache.path_for(url), bytes).unwrap();

        let doc = cache.get(url).unwrap().unwrap();
        assert_eq!(doc.title, "T");
        assert_eq!(
            doc.thumbnail_path.as_deref(),
            Some("images/thumbnails/httpsexamplecombom/a-thumbnail.png")
        );
    }

    #[test]
    fn test_put_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = MetadataCache::open(tmp.path()).unwrap();
        let url = "https://example.com/article";

        cache.put(url, &document()).unwrap();
        let mut updated = document();
        updated.title = "Updated".into();
        cache.put(url, &updated).unwrap();

        assert_eq!(cache.get(url).unwrap().unwrap().title, "Updated");
    }

    #[test]
    fn test_colliding_urls_share_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = MetadataCache::open(tmp.path()).unwrap();

        cache.put("https://example.com/ab", &document()).unwrap();
        let shared = cache.get("https://example.com/a/b").unwrap();
        assert_eq!(shared, Some(document()));
    }

    #[test]
    fn test_corrupt_entry_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = MetadataCache::open(tmp.path()).unwrap();
        let url = "https://example.com/broken";
        std::fs::write(cache.path_for(url), b"{not json").unwrap();

        assert!(cache.get(url).is_err());
    }

    #[test]
    fn test_slug_locks_are_shared_per_slug() {
        let locks = SlugLocks::default();
        let a = locks.lock_for("a");
        let a_again = locks.lock_for("a");
        let b = locks.lock_for("b");

        assert!(Arc::ptr_eq(&a, &a_again));
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
