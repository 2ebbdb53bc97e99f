//! Markdown cleanup for assistant replies.
//!
//! The chat renders plain text, so emphasis, inline code, headings, bullets and
//! Markdown links are stripped. Bare URLs and `wa.me` links are masked before
//! any rule runs and restored afterwards, so no rule can touch them.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::link::LINK_PATTERN;

/// Start and end markers for a masked link. Private-use code points never
/// appear in Markdown syntax.
const MASK_OPEN: char = '\u{E000}';
const MASK_CLOSE: char = '\u{E001}';

/// Plain bullet that replaces `-`, `*` and `+` list markers.
const BULLET: &str = "• ";

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("normalizer pattern is valid")
}

static BOLD_STARS: LazyLock<Regex> = LazyLock::new(|| pattern(r"\*\*(.*?)\*\*"));
static BOLD_UNDERSCORES: LazyLock<Regex> = LazyLock::new(|| pattern(r"__(.*?)__"));
static ITALIC_STAR: LazyLock<Regex> = LazyLock::new(|| pattern(r"\*(.*?)\*"));
static ITALIC_UNDERSCORE: LazyLock<Regex> = LazyLock::new(|| pattern(r"_(.*?)_"));
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| pattern(r"`(.*?)`"));
static HEADING: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?m)^[ \t]*(?:#{1,6}[ \t]+)+"));
static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?m)^[ \t]*[-*+][ \t]+"));
static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| pattern(r"\[([^\]]+)\]\([^)]+\)"));
static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| pattern(r"\n{3,}"));
static MASKED: LazyLock<Regex> = LazyLock::new(|| pattern(r"\x{E000}(\d+)\x{E001}"));

/// Strip Markdown artifacts from a raw model reply.
///
/// The result is a fixed point: `normalize(&normalize(s)) == normalize(s)`.
/// A single pass can uncover new markup (a link label that starts with `- `
/// lands at the start of a line), so passes repeat until nothing changes.
/// Every changing pass either shortens the text or turns a list marker into a
/// bullet, so the loop ends.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let mut current = normalize_pass(raw);
    loop {
        let next = normalize_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_pass(text: &str) -> String {
    let (masked, links) = mask_links(text);

    let mut out = masked;
    for rule in [
        &*BOLD_STARS,
        &*BOLD_UNDERSCORES,
        &*ITALIC_STAR,
        &*ITALIC_UNDERSCORE,
        &*INLINE_CODE,
    ] {
        out = rule.replace_all(&out, "${1}").into_owned();
    }
    out = HEADING.replace_all(&out, "").into_owned();
    out = LIST_MARKER.replace_all(&out, BULLET).into_owned();
    out = MARKDOWN_LINK.replace_all(&out, "${1}").into_owned();
    out = BLANK_RUN.replace_all(&out, "\n\n").into_owned();

    unmask_links(&out, &links).trim().to_string()
}

/// Replace every bare link with an indexed placeholder.
fn mask_links(text: &str) -> (String, Vec<&str>) {
    let links: Vec<&str> = LINK_PATTERN.find_iter(text).map(|m| m.as_str()).collect();
    let mut index = 0;
    let masked = LINK_PATTERN.replace_all(text, |_: &Captures| {
        let placeholder = format!("{MASK_OPEN}{index}{MASK_CLOSE}");
        index += 1;
        placeholder
    });
    (masked.into_owned(), links)
}

fn unmask_links(text: &str, links: &[&str]) -> String {
    MASKED
        .replace_all(text, |caps: &Captures| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            caps.get(1)
                .and_then(|m| m.as_str().parse::<usize>().ok())
                .and_then(|index| links.get(index))
                .map_or_else(|| whole.to_string(), |link| (*link).to_string())
        })
        .into_owned()
}
