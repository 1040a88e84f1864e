//! Joins reconciled messages with their sender and chat.

use crate::content::{ContentMeta, parse_content};
use crate::image::ImageLocator;
use crate::record::ExportRecord;
use crate::timestamp::{TimeZoneMode, format_timestamp};
use chatdig_reconcile::Reconciled;
use chatdig_types::is_truthy;
use std::path::Path;
use tracing::debug;

/// Build the ordered export records for one reconciled database.
///
/// Missing senders or chats leave the joined fields empty. The sort is
/// stable, so records with equal order keys keep their reconciliation order.
pub fn assemble(
    reconciled: &Reconciled,
    db_name: &str,
    zone: TimeZoneMode,
    images: &ImageLocator,
) -> Vec<ExportRecord> {
    let mut records: Vec<ExportRecord> = reconciled
        .messages
        .iter()
        .map(|msg| {
            let sender = msg.sender_id().and_then(|id| reconciled.members.get(&id));
            let chat = msg.cgid.as_deref().and_then(|gid| reconciled.chats.get(gid));
            let content = parse_content(msg.content.as_ref());
            let meta = ContentMeta::derive(
                content.parsed.as_ref(),
                msg.content_type.as_deref(),
                msg.gid.as_deref(),
            );
            let sidecar = meta
                .image_ref
                .as_deref()
                .map(|id| images.locate(id, meta.mime_type()))
                .unwrap_or_default();
            let (timestamp_ms, timestamp_iso) = format_timestamp(msg.date.as_ref(), zone);

            if msg.sender_id().is_some() && sender.is_none() {
                debug!(db = %db_name, sender = ?msg.user, "sender not found");
            }

            ExportRecord {
                db_name: db_name.to_string(),
                chat_id: msg.cgid.clone(),
                chat_name: chat.and_then(|c| c.name.clone()),
                chat_type: chat.and_then(|c| c.chat_type.clone()),
                chat_members: chat.and_then(|c| c.members.clone()),
                message_id: msg.id.clone(),
                message_gid: msg.gid.clone(),
                message_index: msg.index.clone(),
                union_id: msg.union_id.clone(),
                sender_id: msg.user.clone(),
                sender_account: sender.and_then(|m| m.account.clone()),
                sender_realname: sender.and_then(|m| m.realname.clone()),
                timestamp_ms,
                timestamp_iso,
                content_type: msg.content_type.clone(),
                content: content.raw,
                content_json: content.parsed,
                data_json: msg.data.clone().filter(is_truthy),
                keys: msg.keys.clone(),
                deleted: msg.deleted,
                file_name: meta.file_name,
                file_size: meta.file_size,
                file_type: meta.file_type,
                url: meta.url,
                emoji: meta.emoji,
                image_path: sidecar.image.as_deref().map(display_path),
                image_thumb_path: sidecar.thumb.as_deref().map(display_path),
            }
        })
        .collect();

    records.sort_by(|a, b| a.export_order(b));
    records
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatdig_reconcile::{ReconcileContext, ReconcileOptions};
    use serde_json::json;

    fn reconcile(messages: &[serde_json::Value]) -> Reconciled {
        let mut ctx = ReconcileContext::new(ReconcileOptions::default());
        ctx.offer_member(&json!({"id": 7, "account": "ann", "realname": "Ann"}));
        ctx.offer_chat(&json!({"gid": "c1", "name": "General", "type": "group", "members": [7, 3, 7]}));
        for m in messages {
            ctx.offer_message(m);
        }
        ctx.finish()
    }

    fn locator() -> ImageLocator {
        ImageLocator::new(Path::new("/nonexistent-chatdig-root"), "db")
    }

    #[test]
    fn joins_sender_and_chat() {
        let r = reconcile(&[json!({
            "gid": "m1", "cgid": "c1", "user": 7, "date": 1_700_000_000_000i64,
            "contentType": "text", "content": "hi"
        })]);
        let records = assemble(&r, "db", TimeZoneMode::Utc, &locator());
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.sender_account.as_deref(), Some("ann"));
        assert_eq!(rec.sender_realname.as_deref(), Some("Ann"));
        assert_eq!(rec.chat_name.as_deref(), Some("General"));
        assert_eq!(rec.chat_type.as_deref(), Some("group"));
        assert_eq!(rec.chat_members, Some(json!([3, 7])));
        assert_eq!(rec.timestamp_ms, Some(1_700_000_000_000));
        assert_eq!(rec.timestamp_iso.as_deref(), Some("2023-11-14T22:13:20+00:00"));
        assert_eq!(rec.content, "hi");
        assert!(rec.content_json.is_none());
    }

    #[test]
    fn missing_lookups_yield_empty_fields() {
        let r = reconcile(&[json!({"gid": "m1", "cgid": "nope", "user": 99, "date": "soon"})]);
        let rec = &assemble(&r, "db", TimeZoneMode::Utc, &locator())[0];
        assert!(rec.sender_account.is_none());
        assert!(rec.chat_name.is_none());
        assert_eq!(rec.chat_id.as_deref(), Some("nope"));
        assert_eq!(rec.sender_id, Some(json!(99)));
        assert!(rec.timestamp_ms.is_none());
        assert!(rec.timestamp_iso.is_none());
    }

    #[test]
    fn records_are_ordered_by_time_index_id() {
        let r = reconcile(&[
            json!({"gid": "b", "date": 200, "index": 1}),
            json!({"gid": "a", "date": 100, "index": 5}),
            json!({"gid": "c", "date": 200, "index": 0}),
            json!({"gid": "d"}),
        ]);
        let gids: Vec<_> = assemble(&r, "db", TimeZoneMode::Utc, &locator())
            .into_iter()
            .map(|rec| rec.message_gid.unwrap_or_default())
            .collect();
        assert_eq!(gids, ["d", "a", "c", "b"]);
    }

    #[test]
    fn falsy_data_becomes_null() {
        let r = reconcile(&[
            json!({"gid": "a", "date": 1, "data": {}}),
            json!({"gid": "b", "date": 2, "data": []}),
            json!({"gid": "c", "date": 3, "data": 0}),
            json!({"gid": "d", "date": 4, "data": {"files": [1]}}),
        ]);
        let data: Vec<_> = assemble(&r, "db", TimeZoneMode::Utc, &locator())
            .into_iter()
            .map(|rec| rec.data_json)
            .collect();
        assert_eq!(data, [None, None, None, Some(json!({"files": [1]}))]);
    }

    #[test]
    fn structured_content_fills_attachment_fields() {
        let r = reconcile(&[json!({
            "gid": "m1", "contentType": "file",
            "content": "{\"name\":\"report.pdf\",\"size\":2048,\"type\":\"application/pdf\",\"url\":\"/f/1\"}"
        })]);
        let rec = &assemble(&r, "db", TimeZoneMode::Utc, &locator())[0];
        assert_eq!(rec.file_name, Some(json!("report.pdf")));
        assert_eq!(rec.file_size, Some(json!(2048)));
        assert_eq!(rec.file_type, Some(json!("application/pdf")));
        assert_eq!(rec.url, Some(json!("/f/1")));
        assert!(rec.image_path.is_none());
    }
}
