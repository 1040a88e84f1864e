//! Interpretation of the free-form message `content` field.

use chatdig_types::truthy;
use serde_json::Value;

/// Raw text of a message's content plus its structured form, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedContent {
    /// The stored text, unmodified.
    pub raw: String,
    pub parsed: Option<Value>,
}

/// Split stored content into raw text and, when it looks like JSON, the
/// parsed structure.
///
/// Only text whose first non-whitespace character is `{` or `[` is parsed.
/// Parse failures are not errors; the structure is simply absent.
pub fn parse_content(content: Option<&Value>) -> ParsedContent {
    let raw = match content {
        None => return ParsedContent { raw: String::new(), parsed: None },
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            return ParsedContent {
                raw: other.to_string(),
                parsed: None,
            };
        }
    };

    let trimmed = raw.trim();
    let parsed = if trimmed.starts_with('{') || trimmed.starts_with('[') {
        serde_json::from_str(trimmed).ok()
    } else {
        None
    };
    ParsedContent { raw, parsed }
}

/// Attachment, emoji and image-reference fields derived from parsed content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentMeta {
    pub file_name: Option<Value>,
    pub file_size: Option<Value>,
    pub file_type: Option<Value>,
    pub url: Option<Value>,
    pub emoji: Option<Value>,
    /// Identifier of the sidecar image file, for image messages only.
    pub image_ref: Option<String>,
}

impl ContentMeta {
    /// Derive metadata from a parsed content object.
    ///
    /// Anything other than a JSON object yields empty metadata.
    pub fn derive(parsed: Option<&Value>, content_type: Option<&str>, message_gid: Option<&str>) -> Self {
        let Some(obj) = parsed.filter(|v| v.is_object()) else {
            return Self::default();
        };
        let field = |name: &str| obj.get(name).filter(|v| !v.is_null()).cloned();

        let emoji = if obj.get("type").and_then(Value::as_str) == Some("emoji") {
            field("content")
        } else {
            None
        };

        let image_ref = if content_type == Some("image") {
            truthy(obj, "gid")
                .map(|gid| match gid {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .or_else(|| message_gid.filter(|g| !g.is_empty()).map(str::to_string))
        } else {
            None
        };

        Self {
            file_name: field("name"),
            file_size: field("size"),
            file_type: field("type"),
            url: field("url"),
            emoji,
            image_ref,
        }
    }

    /// Mime type of the attachment, when `type` holds one.
    pub fn mime_type(&self) -> Option<&str> {
        self.file_type.as_ref().and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_text_is_not_parsed() {
        let c = parse_content(Some(&json!("hello {world}")));
        assert_eq!(c.raw, "hello {world}");
        assert!(c.parsed.is_none());
    }

    #[test]
    fn json_object_is_parsed_and_raw_kept() {
        let text = "  {\"name\": \"a.png\", \"size\": 12}\n";
        let c = parse_content(Some(&json!(text)));
        assert_eq!(c.raw, text);
        assert_eq!(c.parsed, Some(json!({"name": "a.png", "size": 12})));
    }

    #[test]
    fn json_array_is_parsed() {
        let c = parse_content(Some(&json!("[1, 2]")));
        assert_eq!(c.parsed, Some(json!([1, 2])));
    }

    #[test]
    fn malformed_json_degrades() {
        let c = parse_content(Some(&json!("{not json")));
        assert_eq!(c.raw, "{not json");
        assert!(c.parsed.is_none());
    }

    #[test]
    fn non_text_content_is_stringified() {
        let c = parse_content(Some(&json!({"a": 1})));
        assert_eq!(c.raw, "{\"a\":1}");
        assert!(c.parsed.is_none());

        let c = parse_content(Some(&json!(7)));
        assert_eq!(c.raw, "7");
    }

    #[test]
    fn missing_content_is_empty() {
        let c = parse_content(None);
        assert_eq!(c.raw, "");
        assert!(c.parsed.is_none());
    }

    #[test]
    fn file_fields() {
        let parsed = json!({"name": "report.pdf", "size": 2048, "type": "application/pdf", "url": "/f/1"});
        let meta = ContentMeta::derive(Some(&parsed), Some("file"), None);
        assert_eq!(meta.file_name, Some(json!("report.pdf")));
        assert_eq!(meta.file_size, Some(json!(2048)));
        assert_eq!(meta.mime_type(), Some("application/pdf"));
        assert_eq!(meta.url, Some(json!("/f/1")));
        assert!(meta.emoji.is_none());
        assert!(meta.image_ref.is_none());
    }

    #[test]
    fn emoji_payload() {
        let parsed = json!({"type": "emoji", "content": ":smile:"});
        let meta = ContentMeta::derive(Some(&parsed), Some("object"), None);
        assert_eq!(meta.emoji, Some(json!(":smile:")));
    }

    #[test]
    fn image_ref_prefers_content_gid() {
        let parsed = json!({"gid": "img-1", "type": "image/png"});
        let meta = ContentMeta::derive(Some(&parsed), Some("image"), Some("msg-1"));
        assert_eq!(meta.image_ref.as_deref(), Some("img-1"));

        let parsed = json!({"type": "image/png"});
        let meta = ContentMeta::derive(Some(&parsed), Some("image"), Some("msg-1"));
        assert_eq!(meta.image_ref.as_deref(), Some("msg-1"));
    }

    #[test]
    fn image_ref_only_for_image_messages() {
        let parsed = json!({"gid": "img-1"});
        let meta = ContentMeta::derive(Some(&parsed), Some("file"), Some("msg-1"));
        assert!(meta.image_ref.is_none());
    }

    #[test]
    fn non_object_structure_has_no_meta() {
        let parsed = json!([{"name": "x"}]);
        assert_eq!(ContentMeta::derive(Some(&parsed), Some("image"), Some("m")), ContentMeta::default());
        assert_eq!(ContentMeta::derive(None, Some("image"), Some("m")), ContentMeta::default());
    }
}
