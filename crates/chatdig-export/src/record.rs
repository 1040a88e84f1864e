//! The flat export record.

use chatdig_types::is_truthy;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

/// Column order of the tabular output. Stable across releases.
pub const CSV_COLUMNS: [&str; 27] = [
    "db_name",
    "chat_id",
    "chat_name",
    "chat_type",
    "chat_members",
    "message_id",
    "message_gid",
    "message_index",
    "union_id",
    "sender_id",
    "sender_account",
    "sender_realname",
    "timestamp_ms",
    "timestamp_iso",
    "content_type",
    "content",
    "content_json",
    "data_json",
    "keys",
    "deleted",
    "file_name",
    "file_size",
    "file_type",
    "url",
    "emoji",
    "image_path",
    "image_thumb_path",
];

/// One surviving message joined with its sender and chat.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRecord {
    pub db_name: String,
    pub chat_id: Option<String>,
    pub chat_name: Option<String>,
    pub chat_type: Option<String>,
    pub chat_members: Option<Value>,
    pub message_id: Option<Value>,
    pub message_gid: Option<String>,
    pub message_index: Option<Value>,
    pub union_id: Option<Value>,
    pub sender_id: Option<Value>,
    pub sender_account: Option<String>,
    pub sender_realname: Option<String>,
    pub timestamp_ms: Option<i64>,
    pub timestamp_iso: Option<String>,
    pub content_type: Option<String>,
    pub content: String,
    pub content_json: Option<Value>,
    pub data_json: Option<Value>,
    pub keys: Option<Value>,
    pub deleted: bool,
    pub file_name: Option<Value>,
    pub file_size: Option<Value>,
    pub file_type: Option<Value>,
    pub url: Option<Value>,
    pub emoji: Option<Value>,
    pub image_path: Option<String>,
    pub image_thumb_path: Option<String>,
}

impl ExportRecord {
    /// Ascending export order: timestamp, then index, then message id, each
    /// defaulting to 0 when absent.
    pub fn export_order(&self, other: &Self) -> Ordering {
        self.timestamp_ms
            .unwrap_or(0)
            .cmp(&other.timestamp_ms.unwrap_or(0))
            .then_with(|| {
                OrderValue::of(self.message_index.as_ref())
                    .cmp(&OrderValue::of(other.message_index.as_ref()))
            })
            .then_with(|| {
                OrderValue::of(self.message_id.as_ref())
                    .cmp(&OrderValue::of(other.message_id.as_ref()))
            })
    }

    /// Cells in `CSV_COLUMNS` order, before line-break escaping.
    ///
    /// Nested columns are embedded as JSON text and left empty when falsy.
    pub fn csv_cells(&self) -> Vec<String> {
        vec![
            self.db_name.clone(),
            text_cell(&self.chat_id),
            text_cell(&self.chat_name),
            text_cell(&self.chat_type),
            json_cell(&self.chat_members),
            value_cell(&self.message_id),
            text_cell(&self.message_gid),
            value_cell(&self.message_index),
            value_cell(&self.union_id),
            value_cell(&self.sender_id),
            text_cell(&self.sender_account),
            text_cell(&self.sender_realname),
            self.timestamp_ms.map(|ms| ms.to_string()).unwrap_or_default(),
            text_cell(&self.timestamp_iso),
            text_cell(&self.content_type),
            self.content.clone(),
            json_cell(&self.content_json),
            json_cell(&self.data_json),
            value_cell(&self.keys),
            self.deleted.to_string(),
            value_cell(&self.file_name),
            value_cell(&self.file_size),
            value_cell(&self.file_type),
            value_cell(&self.url),
            value_cell(&self.emoji),
            text_cell(&self.image_path),
            text_cell(&self.image_thumb_path),
        ]
    }
}

/// Sort key for loosely typed index and id values. Numbers order before
/// text; falsy values count as 0.
#[derive(Debug, PartialEq)]
enum OrderValue {
    Number(f64),
    Text(String),
}

impl OrderValue {
    fn of(value: Option<&Value>) -> Self {
        match value {
            None => Self::Number(0.0),
            Some(v) if !is_truthy(v) => Self::Number(0.0),
            Some(Value::Number(n)) => Self::Number(n.as_f64().unwrap_or(0.0)),
            Some(Value::String(s)) => Self::Text(s.clone()),
            Some(other) => Self::Text(other.to_string()),
        }
    }
}

impl Eq for OrderValue {}

impl PartialOrd for OrderValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
        }
    }
}

fn text_cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn value_cell(value: &Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn json_cell(value: &Option<Value>) -> String {
    match value {
        Some(v) if is_truthy(v) => v.to_string(),
        _ => String::new(),
    }
}
