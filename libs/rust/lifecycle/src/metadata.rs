use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Value, json};
use tracing::debug;

use crate::record::ProposalRecord;

lazy_static! {
    static ref LINE_BREAKS: Regex = Regex::new(r"[\r\n]+").unwrap();
}

/// Minion routing flags carried by some v2 metadata blobs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TypeFlags {
    pub is_minion: bool,
    pub is_transmutation: bool,
}

impl TypeFlags {
    fn from_value(value: &Value) -> Self {
        TypeFlags {
            is_minion: value
                .get("isMinion")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            is_transmutation: value
                .get("isTransmutation")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }
}

/// The canonical JSON blob the proposal submission form writes into
/// `details`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetailsPayload {
    pub title: String,
    pub description: String,
    pub link: Option<String>,
}

impl DetailsPayload {
    /// Serializes in the submitted shape. An absent `link` is omitted
    /// entirely rather than written as null.
    pub fn to_details(&self) -> String {
        let mut blob = json!({
            "title": self.title,
            "description": self.description,
        });
        if let Some(link) = &self.link {
            blob["link"] = json!(link);
        }
        blob.to_string()
    }
}

/// Tilde rows, the oldest on-chain encoding: `id~<hash>~<applicant>~<title>`,
/// recognized by the literal `id` head field.
fn tilde_fields(details: &str) -> Option<Vec<&str>> {
    let fields: Vec<&str> = details.split('~').collect();
    (fields.first() == Some(&"id")).then_some(fields)
}

/// Straight JSON parse after stripping line breaks. On-chain blobs often
/// carry raw newlines inside string values, which plain JSON rejects.
fn parse_json(details: &str) -> Option<Value> {
    serde_json::from_str(&LINE_BREAKS.replace_all(details, "")).ok()
}

/// Second chance for blobs written with an unquoted `link:` key. Only the
/// first occurrence is repaired, and the raw text is parsed as-is.
fn parse_repaired_json(details: &str) -> Option<Value> {
    if !details.contains("link:") {
        return None;
    }
    serde_json::from_str(&details.replacen("link:", "\"link\":", 1)).ok()
}

/// Last resort for plain `link:<target>` blobs that defeat both JSON
/// stages: the trimmed remainder after the first marker.
fn bare_link(details: &str) -> Option<String> {
    let (_, rest) = details.split_once("link:")?;
    let trimmed = rest.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn string_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn optional_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    }
}

impl ProposalRecord {
    /// Display title extracted from `details`. Tilde rows read field 3,
    /// `{`-prefixed blobs go through the JSON stages, anything else is
    /// taken verbatim. An empty or unparseable blob synthesizes
    /// `Proposal {proposalIndex}`.
    pub fn title(&self) -> String {
        if let Some(fields) = tilde_fields(&self.details) {
            return fields.get(3).map(|s| (*s).to_string()).unwrap_or_default();
        }
        if self.details.starts_with('{') {
            if let Some(parsed) = parse_json(&self.details) {
                return string_field(&parsed, "title");
            }
            if let Some(repaired) = parse_repaired_json(&self.details) {
                return string_field(&repaired, "title");
            }
            debug!(
                proposal_index = self.proposal_index,
                "Could not parse proposal details as JSON"
            );
            return self.fallback_title();
        }
        if self.details.is_empty() {
            self.fallback_title()
        } else {
            self.details.clone()
        }
    }

    /// Long-form body extracted from `details`. Unlike the title there is
    /// no tilde or plain-text handling here. Repaired blobs kept their
    /// body under a `details` key rather than `description`.
    pub fn description(&self) -> String {
        if let Some(parsed) = parse_json(&self.details) {
            return string_field(&parsed, "description");
        }
        if let Some(repaired) = parse_repaired_json(&self.details) {
            return string_field(&repaired, "details");
        }
        if self.details.contains("link:") {
            return String::new();
        }
        debug!(
            proposal_index = self.proposal_index,
            "Could not parse proposal details as JSON"
        );
        String::new()
    }

    /// External link extracted from `details`, `None` when no stage finds
    /// one.
    pub fn link(&self) -> Option<String> {
        if let Some(parsed) = parse_json(&self.details) {
            return optional_field(&parsed, "link");
        }
        if let Some(repaired) = parse_repaired_json(&self.details) {
            return optional_field(&repaired, "link");
        }
        if !self.details.contains("link:") {
            debug!(
                proposal_index = self.proposal_index,
                "Could not parse proposal details as JSON"
            );
            return None;
        }
        bare_link(&self.details)
    }

    /// Minion routing flags, default when no JSON stage parses.
    pub fn type_flags(&self) -> TypeFlags {
        if let Some(parsed) = parse_json(&self.details) {
            return TypeFlags::from_value(&parsed);
        }
        if let Some(repaired) = parse_repaired_json(&self.details) {
            return TypeFlags::from_value(&repaired);
        }
        if !self.details.contains("link:") {
            debug!(
                proposal_index = self.proposal_index,
                "Could not parse proposal details as JSON"
            );
        }
        TypeFlags::default()
    }

    fn fallback_title(&self) -> String {
        format!("Proposal {}", self.proposal_index)
    }
}
