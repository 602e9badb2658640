//! Card markup for a metadata document.
//!
//! Titles and descriptions are inserted as retrieved, without escaping: they
//! carry the same trust as the rest of the rendered page.

use std::fmt::Display;

use crate::metadata::{MetadataDocument, OneOrMany};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardMarkup {
    ArticleCard {
        url: String,
        thumbnail_path: String,
        title: String,
        description: String,
    },
    VideoEmbed {
        embed_url: String,
    },
}

/// Picks the embed URL: a single value as is, otherwise the first entry
/// containing "embed", otherwise the first entry.
pub fn select_embed_url(video: &OneOrMany<String>) -> Option<&str> {
    match video {
        OneOrMany::One(url) => Some(url.as_str()),
        OneOrMany::Many(urls) => urls
            .iter()
            .find(|url| url.contains("embed"))
            .or_else(|| urls.first())
            .map(String::as_str),
    }
}

impl CardMarkup {
    pub fn from_document(doc: &MetadataDocument) -> Self {
        if let Some(embed_url) = doc.video.as_ref().and_then(select_embed_url) {
            return CardMarkup::VideoEmbed {
                embed_url: embed_url.to_string(),
            };
        }

        CardMarkup::ArticleCard {
            url: doc.url.clone(),
            thumbnail_path: doc.thumbnail_path.clone().unwrap_or_default(),
            title: doc.title.clone(),
            description: doc.description.clone(),
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl Display for CardMarkup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardMarkup::VideoEmbed { embed_url } => write!(
                f,
                r#"
<div class="embed-responsive embed-responsive-16by9 col-xs-12 text-center">
<iframe
src="{embed_url}"
frameborder="0"
allow="autoplay; encrypted-media"
allowfullscreen
class="embed-responsive-item"
></iframe>
</div>
<p/>
"#
            ),
            CardMarkup::ArticleCard {
                url,
                thumbnail_path,
                title,
                description,
            } => write!(
                f,
                r#"
    <center>

    <div class="media border" style="padding:5px;">
    <a href="{url}">
      <img class="mr-3 lazy" data-src="/{thumbnail_path}"></a>
      <div class="media-body text-left">
        <h5 class="mt-0 text-left">{title}</h5>

        <div style="padding-top:8px;padding-bottom:8px;" class="text-left"><small>{description}</small></div>

        <div><em><a href="{url}">Link to Source</a></em></div>
      </div>
    </div>
    </center>
    <p/>

    "#
            ),
        }
    }
}
