//! Decoding of the files and embeds fields of a tool record
//!
//! Both fields use the same unwrap as results. Anything that does not decode
//! to the expected shape yields an empty list.

use crate::unwrap::{unwrap_json, Payload};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a file attachment is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    /// Shown inline
    Image,
    /// Offered as a download
    File,
}

/// A file produced by a tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttachment {
    /// Image or other file
    pub kind: AttachmentKind,
    /// Where the file lives
    pub url: String,
    /// Display name, if one was given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl FileAttachment {
    /// Name to show, falling back to the last URL segment
    pub fn display_name(&self) -> &str {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name;
        }
        self.url
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(&self.url)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(url) if !url.is_empty() => Some(Self {
                kind: guess_kind(url),
                url: url.clone(),
                name: None,
            }),
            Value::Object(map) => {
                let url = map.get("url")?.as_str()?.to_string();
                if url.is_empty() {
                    return None;
                }
                let kind = match map.get("type").and_then(Value::as_str) {
                    Some("image") => AttachmentKind::Image,
                    Some(_) => AttachmentKind::File,
                    None => guess_kind(&url),
                };
                let name = map.get("name").and_then(Value::as_str).map(str::to_string);
                Some(Self { kind, url, name })
            }
            _ => None,
        }
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg"];

fn guess_kind(url: &str) -> AttachmentKind {
    if url.starts_with("data:image/") {
        return AttachmentKind::Image;
    }
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let is_image = path
        .rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);
    if is_image {
        AttachmentKind::Image
    } else {
        AttachmentKind::File
    }
}

fn decode_list(raw: &str, max_depth: usize) -> Vec<Value> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match unwrap_json(raw, max_depth).payload {
        Payload::Json(Value::Array(items)) => items,
        other => {
            tracing::debug!(payload = ?other, "attachment field is not a list, ignoring");
            Vec::new()
        }
    }
}

/// Decode the files field into attachments
pub fn decode_files(raw: &str, max_depth: usize) -> Vec<FileAttachment> {
    decode_list(raw, max_depth)
        .iter()
        .filter_map(FileAttachment::from_value)
        .collect()
}

/// Whether `url` can be loaded in an embedded frame
pub fn is_embeddable(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}

/// Decode the embeds field into frame URLs
///
/// Entries that are not http(s) URLs are dropped here, so a record whose
/// embeds are all unusable falls back to showing its result.
pub fn decode_embeds(raw: &str, max_depth: usize) -> Vec<String> {
    decode_list(raw, max_depth)
        .into_iter()
        .filter_map(|item| match item {
            Value::String(url) if is_embeddable(&url) => Some(url.trim().to_string()),
            Value::String(url) => {
                tracing::debug!(url, "dropping embed with unsupported scheme");
                None
            }
            _ => None,
        })
        .collect()
}
