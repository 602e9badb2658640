//! Finds paragraphs consisting of nothing but a bare http(s) URL.

use url::Url;

const PARAGRAPH_OPEN: &str = "<p>";
const PARAGRAPH_CLOSE: &str = "</p>";

/// A `<p>URL</p>` span found in rendered content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlParagraph<'a> {
    /// The exact source text, tags included
    pub span: &'a str,
    /// The URL with the paragraph tags stripped
    pub url: &'a str,
}

/// Spans in order of appearance. Repeated spans are reported each time.
///
/// A paragraph qualifies only when its whole body is one URL: no whitespace,
/// no nested markup, an `http://` or `https://` scheme and a parsable URL.
/// Anything else is left alone.
pub fn url_paragraphs(content: &str) -> Vec<UrlParagraph<'_>> {
    let mut found = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = content[cursor..].find(PARAGRAPH_OPEN) {
        let start = cursor + offset;
        let body_start = start + PARAGRAPH_OPEN.len();

        let Some(body_len) = content[body_start..].find(PARAGRAPH_CLOSE) else {
            break;
        };
        let body_end = body_start + body_len;
        let body = &content[body_start..body_end];

        if is_bare_url(body) {
            let end = body_end + PARAGRAPH_CLOSE.len();
            found.push(UrlParagraph {
                span: &content[start..end],
                url: body,
            });
            cursor = end;
        } else {
            // a later <p> inside this body may still qualify
            cursor = body_start;
        }
    }

    found
}

fn is_bare_url(body: &str) -> bool {
    if !(body.starts_with("http://") || body.starts_with("https://")) {
        return false;
    }

    if body
        .chars()
        .any(|c| c.is_whitespace() || c == '<' || c == '>')
    {
        return false;
    }

    Url::parse(body).is_ok()
}
