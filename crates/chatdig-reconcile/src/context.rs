//! Per-database reconciliation state.

use crate::fold::{Fold, FoldStats, Offer};
use chatdig_store::{RecordSource, StoreError, StoreName};
use chatdig_types::{Chat, ChatMessage, Member};
use serde_json::Value;
use std::collections::BTreeMap;

/// Switches controlling which message versions survive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Keep soft-deleted messages instead of dropping them up front.
    pub include_deleted: bool,
    /// Skip message reconciliation: every stored version becomes its own row.
    pub include_duplicates: bool,
}

/// Counters for a whole database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub members: FoldStats,
    pub chats: FoldStats,
    pub messages: FoldStats,
    /// Values that were not objects or lacked their identity field.
    pub malformed: usize,
    /// Soft-deleted messages dropped before reconciliation.
    pub deleted_dropped: usize,
}

enum MessageTable {
    Keyed(Fold<ChatMessage>),
    Audit(Vec<ChatMessage>),
}

/// Reconciliation state for one database. Created per export and never
/// shared between databases.
pub struct ReconcileContext {
    options: ReconcileOptions,
    members: Fold<Member>,
    chats: Fold<Chat>,
    messages: MessageTable,
    malformed: usize,
    deleted_dropped: usize,
    audit_stats: FoldStats,
}

/// Reconciled entity tables handed to the export assembler.
#[derive(Debug, Clone, Default)]
pub struct Reconciled {
    pub members: BTreeMap<i64, Member>,
    pub chats: BTreeMap<String, Chat>,
    /// Surviving messages in first-seen order.
    pub messages: Vec<ChatMessage>,
    pub stats: ReconcileStats,
}

impl ReconcileContext {
    pub fn new(options: ReconcileOptions) -> Self {
        let messages = if options.include_duplicates {
            MessageTable::Audit(Vec::new())
        } else {
            MessageTable::Keyed(Fold::new())
        };
        Self {
            options,
            members: Fold::new(),
            chats: Fold::new(),
            messages,
            malformed: 0,
            deleted_dropped: 0,
            audit_stats: FoldStats::default(),
        }
    }

    /// Read and fold all three stores of `db`.
    pub fn load(
        source: &dyn RecordSource,
        db: &str,
        options: ReconcileOptions,
    ) -> Result<Reconciled, StoreError> {
        let mut ctx = Self::new(options);

        tracing::info!(db = %db, "loading members");
        for value in source.records(db, StoreName::Member)? {
            if let Some(value) = ctx.readable(value)? {
                ctx.offer_member(&value);
            }
        }

        tracing::info!(db = %db, "loading chats");
        for value in source.records(db, StoreName::Chat)? {
            if let Some(value) = ctx.readable(value)? {
                ctx.offer_chat(&value);
            }
        }

        tracing::info!(db = %db, "loading messages");
        for value in source.records(db, StoreName::ChatMessage)? {
            if let Some(value) = ctx.readable(value)? {
                ctx.offer_message(&value);
            }
        }

        let reconciled = ctx.finish();
        let stats = &reconciled.stats;
        tracing::info!(
            db = %db,
            members = reconciled.members.len(),
            chats = reconciled.chats.len(),
            "messages selected {}",
            reconciled.messages.len()
        );
        tracing::debug!(
            db = %db,
            malformed = stats.malformed,
            deleted_dropped = stats.deleted_dropped,
            messages_replaced = stats.messages.replaced,
            messages_discarded = stats.messages.kept,
            "reconciliation finished"
        );
        Ok(reconciled)
    }

    pub fn offer_member(&mut self, value: &Value) -> Offer {
        match Member::from_value(value) {
            Some(member) => self.members.offer(member),
            None => self.malformed(StoreName::Member, value),
        }
    }

    pub fn offer_chat(&mut self, value: &Value) -> Offer {
        match Chat::from_value(value) {
            Some(chat) => self.chats.offer(chat),
            None => self.malformed(StoreName::Chat, value),
        }
    }

    /// Fold one stored message version. Returns `None` when the version was
    /// dropped for being soft-deleted.
    pub fn offer_message(&mut self, value: &Value) -> Option<Offer> {
        let Some(message) = ChatMessage::from_value(value) else {
            return Some(self.malformed(StoreName::ChatMessage, value));
        };
        if message.deleted && !self.options.include_deleted {
            self.deleted_dropped += 1;
            return None;
        }

        let offer = match &mut self.messages {
            MessageTable::Keyed(fold) => fold.offer(message),
            MessageTable::Audit(rows) => {
                self.audit_stats.seen += 1;
                if message.dedup_key().is_none() {
                    self.audit_stats.unusable += 1;
                    Offer::Unusable
                } else {
                    rows.push(message);
                    Offer::Inserted
                }
            }
        };
        Some(offer)
    }

    pub fn member(&self, id: i64) -> Option<&Member> {
        self.members.get(&id)
    }

    pub fn chat(&self, gid: &str) -> Option<&Chat> {
        self.chats.get(&gid.to_string())
    }

    pub fn message_count(&self) -> usize {
        match &self.messages {
            MessageTable::Keyed(fold) => fold.len(),
            MessageTable::Audit(rows) => rows.len(),
        }
    }

    /// Consume the context into plain tables.
    pub fn finish(self) -> Reconciled {
        let (messages, message_stats) = match self.messages {
            MessageTable::Keyed(fold) => {
                let stats = fold.stats();
                (fold.into_survivors(), stats)
            }
            MessageTable::Audit(rows) => (rows, self.audit_stats),
        };
        let stats = ReconcileStats {
            members: self.members.stats(),
            chats: self.chats.stats(),
            messages: message_stats,
            malformed: self.malformed,
            deleted_dropped: self.deleted_dropped,
        };
        Reconciled {
            members: self.members.into_survivors().into_iter().map(|m| (m.id, m)).collect(),
            chats: self.chats.into_survivors().into_iter().map(|c| (c.gid.clone(), c)).collect(),
            messages,
            stats,
        }
    }

    /// A record that does not parse is counted and skipped; I/O and decode
    /// failures still abort the load.
    fn readable(&mut self, item: Result<Value, StoreError>) -> Result<Option<Value>, StoreError> {
        match item {
            Ok(value) => Ok(Some(value)),
            Err(e @ StoreError::Parse { .. }) => {
                tracing::warn!("Skipping unreadable record: {e}");
                self.malformed += 1;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn malformed(&mut self, store: StoreName, value: &Value) -> Offer {
        self.malformed += 1;
        tracing::debug!(
            "Skipping unusable {store} record: {}",
            chatdig_types::preview(&value.to_string(), 120)
        );
        Offer::Unusable
    }
}
