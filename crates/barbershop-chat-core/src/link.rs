//! Bare link detection and render-time autolinking.
//!
//! Two token shapes count as links: absolute `http(s)://` URLs and WhatsApp
//! short links (`wa.me/<digits>`). Both the normalizer and the fragmenter use
//! the same pattern so that a URL protected from Markdown stripping is also the
//! URL that keeps a reply in one bubble.

use std::sync::LazyLock;

use regex::Regex;

/// Matches a bare URL or WhatsApp short link.
///
/// The trailing word boundary keeps sentence punctuation (`wa.me/55.`) out of
/// the match.
pub(crate) static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:https?://\S+|wa\.me/\d+)\b").expect("link pattern is valid")
});

/// One piece of rendered message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Plain text, byte-for-byte from the source.
    Text(&'a str),
    /// A navigable link.
    Link {
        /// Visible text, exactly as it appeared in the message.
        text: &'a str,
        /// Target URL, with `https://` added when the source had no scheme.
        href: String,
    },
}

impl Segment<'_> {
    /// The visible text of this segment.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) | Self::Link { text, .. } => text,
        }
    }
}

/// Check whether `text` contains a bare URL or `wa.me` link.
#[must_use]
pub fn contains_link(text: &str) -> bool {
    LINK_PATTERN.is_match(text)
}

/// Split `text` into plain and link segments.
///
/// Concatenating the visible text of every segment reproduces `text` exactly.
#[must_use]
pub fn linkify(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for found in LINK_PATTERN.find_iter(text) {
        if found.start() > last {
            segments.push(Segment::Text(&text[last..found.start()]));
        }

        let token = found.as_str();
        let href = if token.starts_with("http") {
            token.to_string()
        } else {
            format!("https://{token}")
        };
        segments.push(Segment::Link { text: token, href });

        last = found.end();
    }

    if last < text.len() {
        segments.push(Segment::Text(&text[last..]));
    }

    segments
}
