//! Single-pass keyed fold.

use crate::rules::Reconcile;
use std::collections::HashMap;

/// What a fold did with one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// First version seen for its key.
    Inserted,
    /// Replaced the previous survivor.
    Replaced,
    /// Lost against the current survivor and was discarded.
    Kept,
    /// Had no identity key and was dropped.
    Unusable,
}

/// Counters for one fold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FoldStats {
    pub seen: usize,
    pub unusable: usize,
    pub replaced: usize,
    pub kept: usize,
}

/// One survivor per identity key, in first-seen key order.
///
/// Every candidate is compared only against the current survivor for its
/// key, so input is consumed in one pass without sorting.
pub struct Fold<T: Reconcile> {
    index: HashMap<T::Key, usize>,
    survivors: Vec<T>,
    stats: FoldStats,
}

impl<T: Reconcile> Default for Fold<T> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            survivors: Vec::new(),
            stats: FoldStats::default(),
        }
    }
}

impl<T: Reconcile> Fold<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one candidate into the table.
    pub fn offer(&mut self, candidate: T) -> Offer {
        self.stats.seen += 1;
        let Some(key) = candidate.key() else {
            self.stats.unusable += 1;
            return Offer::Unusable;
        };

        match self.index.get(&key) {
            None => {
                self.index.insert(key, self.survivors.len());
                self.survivors.push(candidate);
                Offer::Inserted
            }
            Some(&slot) => {
                if candidate.supersedes(&self.survivors[slot]) {
                    self.survivors[slot] = candidate;
                    self.stats.replaced += 1;
                    Offer::Replaced
                } else {
                    self.stats.kept += 1;
                    Offer::Kept
                }
            }
        }
    }

    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.index.get(key).map(|&slot| &self.survivors[slot])
    }

    pub fn len(&self) -> usize {
        self.survivors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.survivors.is_empty()
    }

    pub fn stats(&self) -> FoldStats {
        self.stats
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.survivors.iter()
    }

    pub fn into_survivors(self) -> Vec<T> {
        self.survivors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatdig_types::{ChatMessage, DedupKey, Member};
    use serde_json::json;

    fn message(v: serde_json::Value) -> ChatMessage {
        ChatMessage::from_value(&v).unwrap()
    }

    #[test]
    fn keeps_one_survivor_per_key() {
        let mut fold = Fold::new();
        assert_eq!(fold.offer(message(json!({"id": 1, "date": 5}))), Offer::Inserted);
        assert_eq!(fold.offer(message(json!({"id": 2, "date": 1}))), Offer::Inserted);
        assert_eq!(fold.offer(message(json!({"id": 1, "date": 9}))), Offer::Replaced);
        assert_eq!(fold.offer(message(json!({"id": 1, "date": 3}))), Offer::Kept);

        assert_eq!(fold.len(), 2);
        let key = DedupKey::of(&json!({"id": 1})).unwrap();
        assert_eq!(fold.get(&key).unwrap().date_ms(), Some(9.0));
        assert_eq!(
            fold.stats(),
            FoldStats {
                seen: 4,
                unusable: 0,
                replaced: 1,
                kept: 1
            }
        );
    }

    #[test]
    fn replacement_keeps_first_seen_position() {
        let mut fold = Fold::new();
        fold.offer(message(json!({"id": "a", "date": 1})));
        fold.offer(message(json!({"id": "b", "date": 1})));
        fold.offer(message(json!({"id": "a", "date": 2})));
        let order: Vec<_> = fold.iter().map(|m| m.id.clone().unwrap()).collect();
        assert_eq!(order, [json!("a"), json!("b")]);
    }

    #[test]
    fn unusable_candidates_are_counted_and_dropped() {
        let mut fold = Fold::new();
        assert_eq!(fold.offer(message(json!({"content": "?"}))), Offer::Unusable);
        assert!(fold.is_empty());
        assert_eq!(fold.stats().unusable, 1);
    }

    #[test]
    fn member_fold_sequence() {
        let mut fold = Fold::new();
        for v in [
            json!({"id": 3, "deleted": true}),
            json!({"id": 3}),
            json!({"id": 3, "realname": "Carol"}),
            json!({"id": 3, "realname": "Caroline"}),
        ] {
            fold.offer(Member::from_value(&v).unwrap());
        }
        let survivor = fold.get(&3).unwrap();
        assert_eq!(survivor.realname.as_deref(), Some("Carol"));
        assert!(!survivor.deleted);
        assert_eq!(fold.into_survivors().len(), 1);
    }
}
