//! Per-entity tie-break rules.

use chatdig_types::{Chat, ChatMessage, DedupKey, Member, as_f64};
use std::cmp::Ordering;
use std::hash::Hash;

/// An entity that can be folded by identity key.
pub trait Reconcile {
    type Key: Eq + Hash + Clone;

    /// Identity shared by every stored version, or `None` if the record is
    /// unusable.
    fn key(&self) -> Option<Self::Key>;

    /// Whether this candidate should replace the current survivor.
    fn supersedes(&self, existing: &Self) -> bool;
}

/// First-seen-with-quality wins: a live record beats a deleted one, and a
/// named record beats an unnamed one. Otherwise the existing record stays.
impl Reconcile for Member {
    type Key = i64;

    fn key(&self) -> Option<i64> {
        Some(self.id)
    }

    fn supersedes(&self, existing: &Self) -> bool {
        if existing.deleted && !self.deleted {
            return true;
        }
        !existing.has_name() && self.has_name()
    }
}

/// The most recent version wins; on equal recency the later-seen one does.
impl Reconcile for Chat {
    type Key = String;

    fn key(&self) -> Option<String> {
        Some(self.gid.clone())
    }

    fn supersedes(&self, existing: &Self) -> bool {
        chat_recency(self) >= chat_recency(existing)
    }
}

/// Live beats deleted, then newer beats older. Ties keep the earlier-seen
/// version.
impl Reconcile for ChatMessage {
    type Key = DedupKey;

    fn key(&self) -> Option<DedupKey> {
        self.dedup_key().cloned()
    }

    fn supersedes(&self, existing: &Self) -> bool {
        compare_scores(message_score(self), message_score(existing)) == Ordering::Greater
    }
}

/// Recency of a chat version: the first numeric value among `editedDate`,
/// `lastActiveTime`, `lastAccessTime`, `createdDate`, or 0.
pub fn chat_recency(chat: &Chat) -> f64 {
    chat.recency_fields()
        .into_iter()
        .flatten()
        .find_map(as_f64)
        .unwrap_or(0.0)
}

/// Score of a message version: `(1 if live else 0, date or 0)`.
pub fn message_score(message: &ChatMessage) -> (u8, f64) {
    let live = u8::from(!message.deleted);
    (live, message.date_ms().unwrap_or(0.0))
}

fn compare_scores(a: (u8, f64), b: (u8, f64)) -> Ordering {
    a.0.cmp(&b.0).then_with(|| a.1.total_cmp(&b.1))
}
