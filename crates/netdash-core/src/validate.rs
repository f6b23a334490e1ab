// ── Pre-flight upload validation ──
//
// Runs before any network call. Every violated rule is reported, not just
// the first, so the UI can show the full list at once.

use bytes::Bytes;
use netdash_api::UploadPayload;

use crate::error::{CoreError, ValidationIssue, ValidationRule};
use crate::format::format_size;

/// Default upload ceiling: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// A file picked or dropped by the user, not yet sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        u64::try_from(self.bytes.len()).unwrap_or(u64::MAX)
    }

    /// File name without its final extension.
    pub fn stem(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.file_name,
        }
    }

    pub fn to_payload(&self) -> UploadPayload {
        UploadPayload::new(
            self.file_name.clone(),
            self.content_type.clone(),
            self.bytes.clone(),
        )
    }
}

/// Size ceiling and content-type allow-list applied before upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_size_bytes: u64,
    /// Exact types (`application/pdf`) or family wildcards (`image/*`).
    /// An empty list allows every type.
    pub allowed_content_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_content_types: [
                "application/pdf",
                "application/json",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                "text/plain",
                "text/csv",
                "text/markdown",
                "image/*",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl UploadPolicy {
    /// Whether `content_type` is on the allow-list. Parameters such as
    /// `; charset=utf-8` are ignored.
    pub fn allows(&self, content_type: &str) -> bool {
        if self.allowed_content_types.is_empty() {
            return true;
        }
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if essence.is_empty() {
            return false;
        }
        self.allowed_content_types.iter().any(|allowed| {
            let allowed = allowed.trim().to_ascii_lowercase();
            match allowed.strip_suffix("/*") {
                Some(family) => essence
                    .split_once('/')
                    .is_some_and(|(head, _)| head == family),
                None => allowed == essence,
            }
        })
    }

    /// Check `file` against every rule.
    pub fn check(&self, file: &UploadFile) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if file.bytes.is_empty() {
            issues.push(ValidationIssue::new(
                ValidationRule::EmptyFile,
                format!("{} is empty", file.file_name),
            ));
        }
        if file.size() > self.max_size_bytes {
            issues.push(ValidationIssue::new(
                ValidationRule::MaxSize,
                format!(
                    "{} is {}, larger than the {} limit",
                    file.file_name,
                    format_size(file.size()),
                    format_size(self.max_size_bytes)
                ),
            ));
        }
        if !self.allows(&file.content_type) {
            issues.push(ValidationIssue::new(
                ValidationRule::ContentType,
                format!(
                    "{} has type '{}', which is not allowed",
                    file.file_name, file.content_type
                ),
            ));
        }
        issues
    }

    pub fn validate(&self, file: &UploadFile) -> Result<(), CoreError> {
        let issues = self.check(file);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(CoreError::validation(issues))
        }
    }
}
