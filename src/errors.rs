use crate::config::ConfigError;

#[derive(thiserror::Error, Debug)]
pub enum UnfurlError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{url}: server answered with status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("default image {url} does not resolve to a jpg, png or gif image")]
    UnresolvableImage { url: String },

    #[error("reqwest error: {0:?}")]
    Reqwest(#[from] reqwest::Error),

    #[error("io error: {0:?}")]
    IO(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T, E = UnfurlError> = std::result::Result<T, E>;
