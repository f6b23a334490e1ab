// ── Messages ──
//
// Operator-to-operator messages shown in the dashboard inbox.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::{EntityId, Resource, SortKey};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessagePriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl MessagePriority {
    fn rank(self) -> u64 {
        match self {
            Self::Low => 0,
            Self::Normal => 1,
            Self::High => 2,
            Self::Urgent => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: EntityId,
    pub subject: String,
    #[serde(default)]
    pub body: String,
    pub sender: String,
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default)]
    pub priority: MessagePriority,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDraft {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
    #[serde(default)]
    pub priority: MessagePriority,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<MessagePriority>,
}

impl MessagePatch {
    pub fn mark_read() -> Self {
        Self {
            read: Some(true),
            ..Self::default()
        }
    }
}

impl Resource for Message {
    type Draft = MessageDraft;
    type Patch = MessagePatch;

    const COLLECTION: &'static str = "messages";
    const LABEL: &'static str = "message";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn apply_patch(&mut self, patch: &MessagePatch) {
        if let Some(read) = patch.read {
            self.read = read;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
    }

    /// Messages are bucketed by priority.
    fn category(&self) -> Option<&str> {
        Some(self.priority.as_ref())
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "subject" => Some(SortKey::text(&self.subject)),
            "sender" => Some(SortKey::text(&self.sender)),
            "priority" => Some(SortKey::Number(self.priority.rank())),
            "read" => Some(SortKey::Flag(self.read)),
            "createdAt" => Some(SortKey::Time(self.created_at)),
            _ => None,
        }
    }

    fn matches_text(&self, needle: &str) -> bool {
        self.subject.to_lowercase().contains(needle)
            || self.body.to_lowercase().contains(needle)
            || self.sender.to_lowercase().contains(needle)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn priority_defaults_to_normal() {
        let msg: Message = serde_json::from_value(json!({
            "id": "m1",
            "subject": "Maintenance window",
            "sender": "noc",
            "createdAt": "2026-03-01T12:00:00Z"
        }))
        .unwrap();
        assert_eq!(msg.priority, MessagePriority::Normal);
        assert!(!msg.read);
        assert_eq!(msg.category(), Some("normal"));
    }

    #[test]
    fn mark_read_patch_serializes_minimally() {
        let body = serde_json::to_value(MessagePatch::mark_read()).unwrap();
        assert_eq!(body, json!({ "read": true }));
    }

    #[test]
    fn priority_parses_from_str() {
        let p: MessagePriority = "urgent".parse().unwrap();
        assert_eq!(p, MessagePriority::Urgent);
        assert!(MessagePriority::Urgent.rank() > MessagePriority::Low.rank());
    }
}
