use std::sync::{Arc, PoisonError};

use rayon::prelude::*;
use url::Url;

use crate::cache::{MetadataCache, SlugLocks};
use crate::card::CardMarkup;
use crate::config::{Config, Settings, THUMBNAIL_DIR};
use crate::discover::url_paragraphs;
use crate::errors::Result;
use crate::http::{HttpClient, ReqwestClient};
use crate::images::{create_thumbnail, retrieve_image, ImageSource};
use crate::metadata::{fetch_document, MetadataDocument};
use crate::slug::slugify;

/// Replaces bare URL paragraphs in rendered content with preview cards.
pub struct Unfurler {
    settings: Settings,
    http: Arc<dyn HttpClient>,
    cache: MetadataCache,
    locks: SlugLocks,
}

impl Unfurler {
    /// Validates `config` and builds a network-backed unfurler.
    ///
    /// Fails before anything is fetched when no default image is configured.
    pub fn new(config: &Config) -> Result<Self> {
        let settings = config.validate()?;
        let http = ReqwestClient::new(&settings.user_agent, settings.timeout)?;

        Self::with_client(settings, Arc::new(http))
    }

    pub fn with_client(settings: Settings, http: Arc<dyn HttpClient>) -> Result<Self> {
        let cache = MetadataCache::open(&settings.metadata_dir)?;

        Ok(Self {
            settings,
            http,
            cache,
            locks: SlugLocks::default(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// Ensures the thumbnail and metadata directories exist.
    pub fn init(&self) -> Result<()> {
        std::fs::create_dir_all(&self.settings.thumbnail_dir)?;
        std::fs::create_dir_all(&self.settings.metadata_dir)?;
        Ok(())
    }

    /// Substitutes every URL paragraph in `content`.
    ///
    /// Paragraphs are processed in order of appearance and each one replaces
    /// every verbatim occurrence of its span. The first failing URL aborts
    /// the whole document.
    pub fn render(&self, content: &str) -> Result<String> {
        let paragraphs = url_paragraphs(content);
        if paragraphs.is_empty() {
            return Ok(content.to_string());
        }

        let mut replaced = content.to_string();
        for paragraph in paragraphs {
            let doc = self.resolve(paragraph.url)?;
            let card_html = CardMarkup::from_document(&doc).render();

            replaced = replaced.replace(paragraph.span, &card_html);
        }

        Ok(replaced)
    }

    /// Renders several documents, `parallelism` at a time.
    pub fn render_documents(&self, contents: &[String]) -> Vec<Result<String>> {
        if self.settings.parallelism <= 1 || contents.len() <= 1 {
            return contents.iter().map(|content| self.render(content)).collect();
        }

        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.settings.parallelism)
            .build()
        {
            Ok(pool) => pool,
            Err(err) => {
                log::warn!("could not start render pool, rendering sequentially: {err}");
                return contents.iter().map(|content| self.render(content)).collect();
            }
        };

        pool.install(|| {
            contents
                .par_iter()
                .map(|content| self.render(content))
                .collect()
        })
    }

    /// Returns the cached document for `url`, fetching and storing it first
    /// when the cache has none.
    pub fn resolve(&self, url: &str) -> Result<MetadataDocument> {
        let slug = slugify(url);

        let lock = self.locks.lock_for(&slug);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(doc) = self.cache.get(url)? {
            log::debug!("{url}: cache hit");
            return Ok(doc);
        }

        log::info!("retrieving metadata for {url} for the first time, expect a small delay");
        self.fetch_and_store(url, &slug)
    }

    fn fetch_and_store(&self, url: &str, slug: &str) -> Result<MetadataDocument> {
        let mut doc = fetch_document(self.http.as_ref(), url, &self.settings.default_image)?;

        let image_dir = self.settings.thumbnail_dir.join(slug);
        let relative_dir = format!("{THUMBNAIL_DIR}/{slug}");

        let source = self.image_source(url, &doc);
        let original = retrieve_image(
            self.http.as_ref(),
            &self.settings,
            source,
            &image_dir,
            &relative_dir,
        )?;
        log::debug!("{url}: original image saved to {}", original.path.display());

        let thumbnail = create_thumbnail(&original, &relative_dir)?;
        doc.thumbnail_path = Some(thumbnail.relative_path);

        self.cache.put(url, &doc)?;

        Ok(doc)
    }

    /// The document's first image, resolved against the page URL.
    fn image_source(&self, page_url: &str, doc: &MetadataDocument) -> ImageSource {
        let Some(image) = doc.primary_image() else {
            return ImageSource::Default;
        };
        if image == self.settings.default_image {
            return ImageSource::Default;
        }

        match Url::parse(page_url).and_then(|base| base.join(image)) {
            Ok(resolved) => ImageSource::Remote(resolved.to_string()),
            Err(err) => {
                log::warn!("{page_url}: cannot resolve image {image:?}: {err}");
                ImageSource::Default
            }
        }
    }
}
