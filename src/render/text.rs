//! Plain-text rendering of exported items.

use crate::client::{WordDetail, WordLookup};
use crate::domain::item::scalar_string;
use crate::domain::{KeyedItem, TargetType};
use crate::index::DedupSnapshot;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::warn;

/// Memoizes word detail lookups; failures are remembered as missing.
pub struct WordCache<'a> {
    lookup: Option<&'a dyn WordLookup>,
    cache: HashMap<String, Option<WordDetail>>,
}

impl<'a> WordCache<'a> {
    pub fn new(lookup: &'a dyn WordLookup) -> Self {
        Self { lookup: Some(lookup), cache: HashMap::new() }
    }

    /// A cache that never looks anything up.
    pub fn offline() -> Self {
        Self { lookup: None, cache: HashMap::new() }
    }

    pub fn get(&mut self, word_id: &str) -> Option<&WordDetail> {
        if word_id.is_empty() {
            return None;
        }
        let lookup = self.lookup;
        self.cache
            .entry(word_id.to_string())
            .or_insert_with(|| match lookup?.word_detail(word_id) {
                Ok(detail) => detail,
                Err(err) => {
                    warn!("word detail lookup failed for {word_id}: {err}");
                    None
                }
            })
            .as_ref()
    }
}

/// Render every item as a `---` separated block. Returns the text and the number of
/// items that produced a block.
pub fn render_text(snapshot: &DedupSnapshot, words: &mut WordCache<'_>) -> (String, usize) {
    let mut out = String::new();
    let mut rendered = 0usize;
    for block in snapshot.iter().filter_map(|item| render_block(item, words)) {
        out.push_str(&block);
        rendered += 1;
    }
    (out, rendered)
}

/// One item as `"\n---\n"` followed by its lines, or `None` when it has no text.
pub fn render_block(item: &KeyedItem, words: &mut WordCache<'_>) -> Option<String> {
    let lines = render_item(item, words);
    if lines.is_empty() {
        return None;
    }
    let mut block = String::from("\n---\n");
    for line in lines {
        block.push_str(&line);
        block.push('\n');
    }
    Some(block)
}

fn render_item(item: &KeyedItem, words: &mut WordCache<'_>) -> Vec<String> {
    let Some(target) = item.record.target() else {
        return Vec::new();
    };
    let target_type = item.key.target_type;
    if target_type.is_sentence_like() {
        render_sentence(target, words)
    } else if target_type == TargetType::WORD {
        render_word(target, words)
    } else {
        first_text(target, &["title", "notationTitle"]).into_iter().collect()
    }
}

fn render_sentence(target: &Map<String, Value>, words: &mut WordCache<'_>) -> Vec<String> {
    let japanese = first_text(target, &["title", "notationTitle"]).unwrap_or_default();
    if japanese.is_empty() {
        return Vec::new();
    }
    let translation = first_text(target, &["trans", "excerpt"]).unwrap_or_default();
    let word_id = text(target, "wordId");

    let mut lines = Vec::new();
    if !word_id.is_empty() {
        let (spell, pron) = words
            .get(&word_id)
            .map(|w| (w.spell.clone(), w.pron.clone()))
            .unwrap_or_default();
        let mut head = spell;
        if !pron.is_empty() && pron != head {
            head = if head.is_empty() { format!("[{pron}]") } else { format!("{head} [{pron}]") };
        }
        lines.push(with_word_id(head, &word_id));
    }
    lines.push(japanese);
    if !translation.is_empty() {
        lines.push(translation);
    }
    lines
}

fn render_word(target: &Map<String, Value>, words: &mut WordCache<'_>) -> Vec<String> {
    let word_id = first_text(target, &["objectId", "id"]).unwrap_or_default();
    let mut spell = first_text(target, &["spell", "title"]).unwrap_or_default();
    let mut pron = text(target, "pron");
    let mut accent = text(target, "accent");
    let mut excerpt = text(target, "excerpt");

    if !word_id.is_empty() && (spell.is_empty() || pron.is_empty()) {
        if let Some(detail) = words.get(&word_id) {
            fill(&mut spell, &detail.spell);
            fill(&mut pron, &detail.pron);
            fill(&mut accent, &detail.accent);
            fill(&mut excerpt, &detail.excerpt);
        }
    }
    if spell.is_empty() && excerpt.is_empty() {
        return Vec::new();
    }

    let mut head = spell;
    if !pron.is_empty() {
        head = if head.is_empty() { format!("[{pron}]") } else { format!("{head} [{pron}]") };
    }
    if !accent.is_empty() {
        head = format!("{head} {accent}").trim().to_string();
    }
    if !word_id.is_empty() {
        head = with_word_id(head, &word_id);
    }

    let mut lines = Vec::new();
    if !head.is_empty() {
        lines.push(head);
    }
    if !excerpt.is_empty() {
        lines.push(excerpt);
    }
    lines
}

fn with_word_id(head: String, word_id: &str) -> String {
    if head.is_empty() {
        format!("wordId={word_id}")
    } else {
        format!("{head} (wordId={word_id})")
    }
}

fn fill(slot: &mut String, fallback: &str) {
    if slot.is_empty() {
        *slot = fallback.trim().to_string();
    }
}

fn text(target: &Map<String, Value>, field: &str) -> String {
    target.get(field).and_then(scalar_string).unwrap_or_default()
}

fn first_text(target: &Map<String, Value>, fields: &[&str]) -> Option<String> {
    fields.iter().map(|f| text(target, f)).find(|s| !s.is_empty())
}
