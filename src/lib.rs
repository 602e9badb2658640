pub mod cache;
pub mod card;
pub mod config;
pub mod discover;
pub mod eid;
pub mod errors;
pub mod http;
pub mod images;
pub mod metadata;
pub mod slug;
pub mod storage;
pub mod unfurl;

#[cfg(test)]
mod tests;

pub use card::CardMarkup;
pub use config::{Config, ConfigError, Settings};
pub use errors::UnfurlError;
pub use metadata::MetadataDocument;
pub use slug::slugify;
pub use unfurl::Unfurler;
