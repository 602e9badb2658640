use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::metadata::types::OneOrMany;

static HEAD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("head").expect("Failed to parse head selector"));
static META_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta").expect("Failed to parse meta selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("Failed to parse title selector"));

const OPEN_GRAPH_PREFIX: &str = "og:";

/// Structured metadata read from a page head.
#[derive(Debug, Clone, Default)]
pub struct PageMetadata {
    /// `og:*` properties with the prefix stripped, in key order
    pub properties: BTreeMap<String, OneOrMany<String>>,
    /// Text of the document `<title>`, if any
    pub document_title: Option<String>,
}

pub fn parse_page(resp_text: &str) -> PageMetadata {
    let document = Html::parse_document(resp_text);

    let document_title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty());

    let mut properties: BTreeMap<String, OneOrMany<String>> = BTreeMap::new();

    let head = match document.select(&HEAD_SELECTOR).next() {
        Some(h) => h,
        None => {
            return PageMetadata {
                properties,
                document_title,
            }
        }
    };

    for element in head.select(&META_SELECTOR) {
        let meta = element.value();
        let meta_key = meta
            .attr("property")
            .or_else(|| meta.attr("name"))
            .unwrap_or_default();

        let Some(key) = meta_key.strip_prefix(OPEN_GRAPH_PREFIX) else {
            continue;
        };
        let Some(meta_value) = meta.attr("content") else {
            continue;
        };
        if key.is_empty() {
            continue;
        }

        let value = meta_value.trim().to_string();
        let merged = match properties.remove(key) {
            Some(existing) => existing.push(value),
            None => OneOrMany::One(value),
        };
        properties.insert(key.to_string(), merged);
    }

    PageMetadata {
        properties,
        document_title,
    }
}
