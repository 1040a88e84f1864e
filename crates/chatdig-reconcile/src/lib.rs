//! Streaming reconciliation of duplicate entity versions for chatdig.
//!
//! The store is append-only and compaction-prone, so the same member, chat
//! or message can appear several times with different completeness,
//! deletion state or recency. Each entity type is folded in a single pass
//! into one survivor per identity key.

pub mod context;
pub mod fold;
pub mod rules;

pub use context::{ReconcileContext, ReconcileOptions, ReconcileStats, Reconciled};
pub use fold::{Fold, FoldStats, Offer};
pub use rules::{Reconcile, chat_recency, message_score};
