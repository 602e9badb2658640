pub mod fetcher;
pub mod page;
pub mod types;

pub use fetcher::{build_document, fetch_document, NO_TITLE};
pub use page::{parse_page, PageMetadata};
pub use types::{MetadataDocument, OneOrMany};
