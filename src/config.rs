use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::images::ImageKind;

const DEFAULT_CONTENT_ROOT: &str = "content";
const DEFAULT_CACHE_ROOT: &str = "cache";
const DEFAULT_TIMEOUT_SECS: u64 = 0;
const DEFAULT_PARALLELISM: usize = 1;

pub const USER_AGENT_DEFAULT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0";

/// Directory under the cache root holding one JSON document per slug
pub const METADATA_CACHE_DIR: &str = "urlcard_ogcache";

/// Site-relative directory holding one image subdirectory per slug
pub const THUMBNAIL_DIR: &str = "images/thumbnails";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("default_image is not set. It is used for cards whose page exposes no image")]
    MissingDefaultImage,

    #[error("default_image {0:?} must be a .jpg, .jpeg, .png or .gif image")]
    UnsupportedDefaultImage(String),

    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config is malformed: {0}")]
    Yaml(#[from] serde_yml::Error),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Site content directory; thumbnails live under `<content_root>/images/thumbnails`
    #[serde(default = "default_content_root")]
    pub content_root: PathBuf,

    /// Cache directory; metadata lives under `<cache_root>/urlcard_ogcache`
    #[serde(default = "default_cache_root")]
    pub cache_root: PathBuf,

    /// Image used when a page exposes none. An http(s) URL or a file path,
    /// relative paths resolve against `content_root`.
    #[serde(default)]
    pub default_image: Option<String>,

    /// Request timeout in seconds, 0 (the default) disables it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Detect the image encoding from its bytes when neither header nor URL tells
    #[serde(default)]
    pub sniff_image_bytes: bool,

    /// Number of documents rendered concurrently
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_root: default_content_root(),
            cache_root: default_cache_root(),
            default_image: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
            sniff_image_bytes: false,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

fn default_content_root() -> PathBuf {
    PathBuf::from(DEFAULT_CONTENT_ROOT)
}

fn default_cache_root() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_ROOT)
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    USER_AGENT_DEFAULT.to_string()
}

fn default_parallelism() -> usize {
    DEFAULT_PARALLELISM
}

/// Where the fallback card image comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DefaultImage {
    Remote(String),
    Local(PathBuf),
}

/// Validated configuration with its derived directories.
#[derive(Clone, Debug)]
pub struct Settings {
    pub content_root: PathBuf,
    pub thumbnail_dir: PathBuf,
    pub metadata_dir: PathBuf,
    /// The configured value, as stored in documents lacking an image
    pub default_image: String,
    pub default_image_source: DefaultImage,
    pub timeout: Option<Duration>,
    pub user_agent: String,
    pub sniff_image_bytes: bool,
    pub parallelism: usize,
}

impl Config {
    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load_with(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("{} not found, using default config", path.display());
            return Ok(Self::default());
        }

        let config_str = std::fs::read_to_string(path)?;
        let config: Self = serde_yml::from_str(&config_str)?;

        Ok(config)
    }

    pub fn metadata_dir(&self) -> PathBuf {
        self.cache_root.join(METADATA_CACHE_DIR)
    }

    pub fn thumbnail_dir(&self) -> PathBuf {
        self.content_root.join(THUMBNAIL_DIR)
    }

    pub fn validate(&self) -> Result<Settings, ConfigError> {
        let default_image = self
            .default_image
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingDefaultImage)?;

        if ImageKind::from_location(default_image).is_none() {
            return Err(ConfigError::UnsupportedDefaultImage(
                default_image.to_string(),
            ));
        }

        let default_image_source =
            if default_image.starts_with("http://") || default_image.starts_with("https://") {
                DefaultImage::Remote(default_image.to_string())
            } else {
                let path = Path::new(default_image);
                if path.is_absolute() && path.exists() {
                    DefaultImage::Local(path.to_path_buf())
                } else {
                    DefaultImage::Local(
                        self.content_root.join(default_image.trim_start_matches('/')),
                    )
                }
            };

        Ok(Settings {
            content_root: self.content_root.clone(),
            thumbnail_dir: self.thumbnail_dir(),
            metadata_dir: self.metadata_dir(),
            default_image: default_image.to_string(),
            default_image_source,
            timeout: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
            user_agent: self.user_agent.clone(),
            sniff_image_bytes: self.sniff_image_bytes,
            parallelism: self.parallelism.max(1),
        })
    }
}
