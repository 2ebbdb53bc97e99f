//! Splitting a normalized reply into chat bubbles.
//!
//! Long replies are shown as a short burst of messages, the way a person types
//! in a messenger. Splitting happens at sentence boundaries and is purely a
//! presentation concern: the reply has already been fully received.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

use crate::link::contains_link;

/// Sentence-terminal punctuation followed by whitespace.
static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("sentence pattern is valid"));

/// A period trailing `!` or `?`, as in `Ótimo!.`.
static STRAY_PERIOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([!?])\.").expect("stray period pattern is valid"));

/// Tuning for bubble splitting and staged reveal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FragmentConfig {
    /// Replies shorter than this (in characters) are never split.
    #[serde(default = "FragmentConfig::default_short_message_chars")]
    pub short_message_chars: usize,

    /// Sentences are packed into one bubble while it stays under this length.
    #[serde(default = "FragmentConfig::default_pack_chars")]
    pub pack_chars: usize,

    /// Upper bound on bubbles per reply.
    #[serde(default = "FragmentConfig::default_max_bubbles")]
    pub max_bubbles: usize,

    /// Gap between consecutive bubbles, in milliseconds.
    #[serde(default = "FragmentConfig::default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,
}

impl FragmentConfig {
    const fn default_short_message_chars() -> usize {
        150
    }

    const fn default_pack_chars() -> usize {
        200
    }

    const fn default_max_bubbles() -> usize {
        3
    }

    const fn default_reveal_delay_ms() -> u64 {
        1500
    }

    /// Get the reveal delay as a `Duration`.
    #[must_use]
    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}

impl Default for FragmentConfig {
    fn default() -> Self {
        Self {
            short_message_chars: Self::default_short_message_chars(),
            pack_chars: Self::default_pack_chars(),
            max_bubbles: Self::default_max_bubbles(),
            reveal_delay_ms: Self::default_reveal_delay_ms(),
        }
    }
}

/// Split a normalized reply into the bubbles to display, in order.
///
/// Always returns at least one bubble. A reply that contains a link or is
/// shorter than [`FragmentConfig::short_message_chars`] is returned whole, so a
/// URL is never cut across two bubbles. A period directly after `!` or `?` is
/// dropped first.
#[must_use]
pub fn fragment(text: &str, config: &FragmentConfig) -> Vec<String> {
    let text = STRAY_PERIOD.replace_all(text, "${1}");
    let text = text.as_ref();

    if contains_link(text) || text.chars().count() < config.short_message_chars {
        return vec![text.to_string()];
    }

    let packed = pack_sentences(&split_sentences(text), config.pack_chars);
    if packed.is_empty() {
        return vec![text.to_string()];
    }

    cap_bubbles(packed, config.max_bubbles)
}

/// Split on `.`, `!` or `?` followed by whitespace, keeping the punctuation
/// with its sentence and dropping the whitespace.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for found in SENTENCE_BREAK.find_iter(text) {
        // The punctuation mark is a single ASCII byte.
        let end = found.start() + 1;
        push_sentence(&mut sentences, &text[start..end]);
        start = found.end();
    }
    push_sentence(&mut sentences, &text[start..]);

    sentences
}

fn push_sentence<'a>(sentences: &mut Vec<&'a str>, candidate: &'a str) {
    let sentence = candidate.trim();
    if !sentence.is_empty() {
        sentences.push(sentence);
    }
}

/// Greedily pack consecutive sentences while the bubble stays under `limit`.
fn pack_sentences(sentences: &[&str], limit: usize) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut current = String::new();

    for sentence in sentences {
        if current.chars().count() + sentence.chars().count() < limit {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(sentence);
        } else {
            if !current.is_empty() {
                fragments.push(std::mem::take(&mut current));
            }
            current.push_str(sentence);
        }
    }

    if !current.is_empty() {
        fragments.push(current);
    }

    fragments
}

/// Regroup fragments into at most `max` contiguous groups without dropping
/// content. The last group absorbs the remainder.
fn cap_bubbles(fragments: Vec<String>, max: usize) -> Vec<String> {
    let max = max.max(1);
    if fragments.len() <= max {
        return fragments;
    }

    let group = fragments.len() / max;
    (0..max)
        .map(|i| {
            let start = i * group;
            let end = if i + 1 == max {
                fragments.len()
            } else {
                start + group
            };
            fragments[start..end].join(" ")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_sentence(tag: usize) -> String {
        // 121 characters including the final period.
        format!("Frase numero {tag:03} {}.", "x".repeat(103))
    }

    #[test]
    fn short_reply_is_one_bubble() {
        let text = "Plano Mensal: R$49,90\n\nQuer saber mais?";
        assert_eq!(fragment(text, &FragmentConfig::default()), vec![text]);
    }

    #[test]
    fn reply_with_link_is_never_split() {
        let sentences: Vec<String> = (0..6).map(long_sentence).collect();
        let text = format!("{} Fale conosco: wa.me/5521997760398", sentences.join(" "));

        let bubbles = fragment(&text, &FragmentConfig::default());
        assert_eq!(bubbles, vec![text]);
    }

    #[test]
    fn long_reply_packs_sentences() {
        let text = format!(
            "{} {} {}",
            "Primeira frase curta.",
            "Segunda frase também curta!",
            "x".repeat(190) + "?"
        );

        let bubbles = fragment(&text, &FragmentConfig::default());
        assert_eq!(bubbles.len(), 2);
        assert_eq!(bubbles[0], "Primeira frase curta. Segunda frase também curta!");
        assert!(bubbles[1].ends_with('?'));
    }

    #[test]
    fn more_than_three_fragments_regroup_into_three() {
        let sentences: Vec<String> = (0..7).map(long_sentence).collect();
        let text = sentences.join(" ");

        let bubbles = fragment(&text, &FragmentConfig::default());
        assert_eq!(bubbles.len(), 3);

        // 7 fragments → groups of 2, 2, 3.
        assert_eq!(bubbles[0], sentences[0..2].join(" "));
        assert_eq!(bubbles[1], sentences[2..4].join(" "));
        assert_eq!(bubbles[2], sentences[4..7].join(" "));

        let rebuilt: String = bubbles.concat().split_whitespace().collect();
        let original: String = text.split_whitespace().collect();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn period_after_exclamation_or_question_is_dropped() {
        assert_eq!(
            fragment("Que ótimo!. Quer testar?.", &FragmentConfig::default()),
            vec!["Que ótimo! Quer testar?"]
        );
        assert_eq!(
            fragment("Preço: R$49,90. Fim.", &FragmentConfig::default()),
            vec!["Preço: R$49,90. Fim."]
        );
    }

    #[test]
    fn stray_periods_are_dropped_before_splitting() {
        let sentences: Vec<String> = (0..2).map(|tag| format!("{}!.", long_sentence(tag))).collect();
        let bubbles = fragment(&sentences.join(" "), &FragmentConfig::default());
        assert_eq!(bubbles.len(), 2);
        assert!(bubbles.iter().all(|b| b.ends_with(".!")));
    }

    #[test]
    fn text_without_punctuation_stays_whole() {
        let text = "palavra ".repeat(40);
        let text = text.trim();
        assert_eq!(fragment(text, &FragmentConfig::default()), vec![text]);
    }

    #[test]
    fn empty_text_yields_single_empty_bubble() {
        assert_eq!(fragment("", &FragmentConfig::default()), vec![String::new()]);
    }

    #[test]
    fn split_keeps_punctuation() {
        assert_eq!(
            split_sentences("Oi. Tudo bem?  Sim!\nÓtimo"),
            vec!["Oi.", "Tudo bem?", "Sim!", "Ótimo"]
        );
    }

    #[test]
    fn cap_with_exact_limit_is_untouched() {
        let fragments = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(cap_bubbles(fragments.clone(), 3), fragments);
    }

    #[test]
    fn config_defaults() {
        let config = FragmentConfig::default();
        assert_eq!(config.short_message_chars, 150);
        assert_eq!(config.pack_chars, 200);
        assert_eq!(config.max_bubbles, 3);
        assert_eq!(config.reveal_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: FragmentConfig = serde_json::from_str(r#"{"max_bubbles": 2}"#).unwrap();
        assert_eq!(config.max_bubbles, 2);
        assert_eq!(config.pack_chars, 200);
    }
}
