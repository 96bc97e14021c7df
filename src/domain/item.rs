//! Item identity: type tags, sort orders, keys and opaque records.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Server-side `targetType` tag. Values are observed from traffic, not documented, so this
/// stays an open integer rather than a closed enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetType(pub i64);

impl TargetType {
    pub const WORD: TargetType = TargetType(102);
    pub const EXAMPLE: TargetType = TargetType(103);
    pub const SENTENCE: TargetType = TargetType(120);

    pub fn is_sentence_like(self) -> bool {
        self == Self::EXAMPLE || self == Self::SENTENCE
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-side `sortType` value. Each sort order exposes a differently ordered (and
/// differently clamped) slice of the same folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortOrder(pub i64);

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identity of a saved item across every partition it shows up in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemKey {
    pub target_type: TargetType,
    pub source_id: String,
}

impl ItemKey {
    pub fn new(target_type: TargetType, source_id: impl Into<String>) -> Self {
        Self { target_type, source_id: source_id.into() }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.target_type, self.source_id)
    }
}

/// One saved item exactly as the collection API returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawItem(pub Value);

impl RawItem {
    pub fn target_type(&self) -> Option<TargetType> {
        self.0.get("targetType").and_then(Value::as_i64).map(TargetType)
    }

    /// The nested `target` object carrying the item's own fields.
    pub fn target(&self) -> Option<&serde_json::Map<String, Value>> {
        self.0.get("target").and_then(Value::as_object)
    }

    /// Derive the item's key.
    ///
    /// The id is `target.objectId`, then `target.id`, then `"<wordId>::<title>"`. Returns
    /// `None` when the record has no integer type tag, no `target` object or nothing to
    /// identify it by.
    pub fn key(&self) -> Option<ItemKey> {
        let target_type = self.target_type()?;
        let target = self.target()?;

        let direct = ["objectId", "id"]
            .iter()
            .filter_map(|field| target.get(*field).and_then(scalar_string))
            .find(|id| !id.is_empty());
        if let Some(id) = direct {
            return Some(ItemKey::new(target_type, id));
        }

        let word_id = target.get("wordId").and_then(scalar_string).unwrap_or_default();
        let title = target.get("title").and_then(scalar_string).unwrap_or_default();
        if word_id.is_empty() && title.is_empty() {
            return None;
        }
        Some(ItemKey::new(target_type, format!("{word_id}::{title}")))
    }
}

/// A record paired with the key it was filed under.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedItem {
    pub key: ItemKey,
    pub record: RawItem,
}

/// Read a JSON string or number as text; ids arrive as either.
pub(crate) fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_prefers_object_id() {
        let item = RawItem(json!({"targetType": 120, "target": {"objectId": "s1", "id": "other"}}));
        assert_eq!(item.key(), Some(ItemKey::new(TargetType::SENTENCE, "s1")));
        assert_eq!(item.key().map(|k| k.to_string()), Some("120:s1".to_string()));
    }

    #[test]
    fn key_falls_back_to_id_then_word_and_title() {
        let by_id = RawItem(json!({"targetType": 102, "target": {"id": 42}}));
        assert_eq!(by_id.key(), Some(ItemKey::new(TargetType::WORD, "42")));

        let composite = RawItem(json!({"targetType": 103, "target": {"wordId": "w9", "title": "猫"}}));
        assert_eq!(composite.key(), Some(ItemKey::new(TargetType::EXAMPLE, "w9::猫")));
    }

    #[test]
    fn key_is_none_without_type_target_or_identity() {
        assert!(RawItem(json!({"target": {"objectId": "x"}})).key().is_none());
        assert!(RawItem(json!({"targetType": 102})).key().is_none());
        assert!(RawItem(json!({"targetType": 102, "target": {"spell": "猫"}})).key().is_none());
    }

    #[test]
    fn same_item_from_different_views_gets_same_key() {
        let a = RawItem(json!({"targetType": 102, "target": {"objectId": "w1"}, "sortType": 0}));
        let b = RawItem(json!({"targetType": 102, "target": {"objectId": "w1", "spell": "犬"}}));
        assert_eq!(a.key(), b.key());
    }
}
