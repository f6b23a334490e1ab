// ── Documents ──
//
// Runbooks, audit exports, diagrams and other files attached to the
// operations dashboard. Created through multipart upload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityId, Resource, SortKey};
use crate::validate::UploadFile;

/// A stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub file_name: String,
    pub content_type: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Metadata sent alongside an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Resource for Document {
    type Draft = DocumentDraft;
    type Patch = DocumentPatch;

    const COLLECTION: &'static str = "documents";
    const LABEL: &'static str = "document";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn apply_patch(&mut self, patch: &DocumentPatch) {
        if let Some(ref title) = patch.title {
            self.title.clone_from(title);
        }
        if let Some(ref description) = patch.description {
            self.description = Some(description.clone());
        }
        if let Some(ref category) = patch.category {
            self.category = Some(category.clone());
        }
        if let Some(ref tags) = patch.tags {
            self.tags.clone_from(tags);
        }
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn size_bytes(&self) -> u64 {
        self.size
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "title" => Some(SortKey::text(&self.title)),
            "fileName" => Some(SortKey::text(&self.file_name)),
            "contentType" => Some(SortKey::text(&self.content_type)),
            "category" => Some(SortKey::text(self.category.as_deref().unwrap_or(""))),
            "size" => Some(SortKey::Number(self.size)),
            "createdAt" => Some(SortKey::Time(self.created_at)),
            "updatedAt" => Some(SortKey::Time(self.updated_at.unwrap_or(self.created_at))),
            _ => None,
        }
    }

    fn matches_text(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.file_name.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }

    /// Untitled batch uploads take their title from the file name.
    fn draft_for_upload(base: &DocumentDraft, file: &UploadFile) -> DocumentDraft {
        let mut draft = base.clone();
        if draft.title.trim().is_empty() {
            draft.title = file.stem().to_owned();
        }
        draft
    }
}
