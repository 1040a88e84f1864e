//! Entity records reconstructed from the chat client's record stores.
//!
//! Each record is built from a raw store value with `from_value`, which
//! returns `None` when the value is not an object or lacks its identity
//! field. Fields that are present but of an unexpected type are treated as
//! absent rather than coerced.

use crate::value::{as_i64, is_truthy, truthy};
use serde::Serialize;
use serde_json::{Map, Value};

/// A chat participant, keyed by its integral `id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Member {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realname: Option<String>,
    pub deleted: bool,
    /// Every other field of the stored record, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Truthiness of the stored `realname`, whatever its type.
    #[serde(skip)]
    named: bool,
}

impl Member {
    /// Builds a member from a stored record. The `id` must be a JSON integer;
    /// whole floats such as `7.0` and numeric strings are rejected.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let id = obj.get("id").and_then(integer_id)?;
        let account = obj.get("account").and_then(Value::as_str).map(str::to_string);
        let realname = obj.get("realname").and_then(Value::as_str).map(str::to_string);
        let deleted = obj.get("deleted").is_some_and(is_truthy);
        let named = obj.get("realname").is_some_and(is_truthy);

        let extra = obj
            .iter()
            .filter(|(k, v)| match k.as_str() {
                "id" | "deleted" => false,
                "account" | "realname" => !v.is_string(),
                _ => true,
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Some(Self {
            id,
            account,
            realname,
            deleted,
            extra,
            named,
        })
    }

    /// Whether the record carries a truthy `realname`, string or not.
    pub fn has_name(&self) -> bool {
        self.named
    }
}

fn integer_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

/// A conversation, keyed by its global id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub gid: String,
    pub id: Option<Value>,
    #[serde(rename = "type")]
    pub chat_type: Option<String>,
    pub name: Option<String>,
    pub members: Option<Value>,
    pub admins: Option<Value>,
    pub created_date: Option<Value>,
    pub edited_date: Option<Value>,
    pub last_active_time: Option<Value>,
    pub last_access_time: Option<Value>,
    #[serde(rename = "theOtherMemberID")]
    pub the_other_member_id: Option<Value>,
}

impl Chat {
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let gid = obj
            .get("gid")
            .and_then(Value::as_str)
            .filter(|g| !g.is_empty())?
            .to_string();
        let field = |name: &str| obj.get(name).filter(|v| !v.is_null()).cloned();
        let text = |name: &str| obj.get(name).and_then(Value::as_str).map(str::to_string);

        Some(Self {
            gid,
            id: field("id"),
            chat_type: text("type"),
            name: text("name"),
            members: field("members").map(normalize_id_set),
            admins: field("admins").map(normalize_id_set),
            created_date: field("createdDate"),
            edited_date: field("editedDate"),
            last_active_time: field("lastActiveTime"),
            last_access_time: field("lastAccessTime"),
            the_other_member_id: field("theOtherMemberID"),
        })
    }

    /// Recency fields in the order they are consulted when two versions of
    /// the same chat compete.
    pub fn recency_fields(&self) -> [Option<&Value>; 4] {
        [
            self.edited_date.as_ref(),
            self.last_active_time.as_ref(),
            self.last_access_time.as_ref(),
            self.created_date.as_ref(),
        ]
    }
}

/// Member and admin lists are sets in the client. All-integer lists are
/// sorted and de-duplicated; any other shape passes through untouched.
fn normalize_id_set(value: Value) -> Value {
    let Value::Array(items) = &value else {
        return value;
    };
    let ids: Option<Vec<i64>> = items.iter().map(as_i64).collect();
    match ids {
        Some(mut ids) => {
            ids.sort_unstable();
            ids.dedup();
            Value::Array(ids.into_iter().map(Value::from).collect())
        }
        None => value,
    }
}

/// One stored version of a chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: Option<Value>,
    pub gid: Option<String>,
    pub union_id: Option<Value>,
    /// Gid of the owning chat.
    pub cgid: Option<String>,
    /// Sender member id, as stored.
    pub user: Option<Value>,
    /// Epoch milliseconds, as stored. May be missing or non-numeric.
    pub date: Option<Value>,
    pub index: Option<Value>,
    pub content_type: Option<String>,
    pub content: Option<Value>,
    pub data: Option<Value>,
    pub keys: Option<Value>,
    pub deleted: bool,
    key: Option<DedupKey>,
}

impl ChatMessage {
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let field = |name: &str| obj.get(name).filter(|v| !v.is_null()).cloned();
        let text = |name: &str| obj.get(name).and_then(Value::as_str).map(str::to_string);

        Some(Self {
            id: field("id"),
            gid: text("gid"),
            union_id: field("unionId"),
            cgid: text("cgid"),
            user: field("user"),
            date: field("date"),
            index: field("index"),
            content_type: text("contentType"),
            content: obj.get("content").cloned(),
            data: field("data"),
            keys: field("keys"),
            deleted: obj.get("deleted").is_some_and(is_truthy),
            key: DedupKey::of(value),
        })
    }

    /// Identity shared by every stored version of this message, or `None`
    /// when the record cannot be tied to any logical message.
    pub fn dedup_key(&self) -> Option<&DedupKey> {
        self.key.as_ref()
    }

    /// Sender id usable for member lookup.
    pub fn sender_id(&self) -> Option<i64> {
        self.user.as_ref().and_then(as_i64)
    }

    /// Numeric timestamp, if the stored date is a number.
    pub fn date_ms(&self) -> Option<f64> {
        self.date.as_ref().and_then(crate::value::as_f64)
    }
}

/// Identity used to recognise different stored versions of one message:
/// the first truthy of `unionId`, `id`, `gid`, rendered as text. A falsy
/// but present `gid` (`""`, `0`) is still an identity; only a missing or null
/// `gid` leaves the record without one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupKey(String);

impl DedupKey {
    pub fn of(value: &Value) -> Option<Self> {
        let raw = truthy(value, "unionId")
            .or_else(|| truthy(value, "id"))
            .or_else(|| value.get("gid").filter(|v| !v.is_null()))?;
        let text = match raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Some(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DedupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
