// ── Domain model ──
//
// Identity keys, the `Resource` contract shared by every collection, and
// the concrete dashboard resources.

mod document;
mod entity_id;
mod message;
mod resource;

pub use document::{Document, DocumentDraft, DocumentPatch};
pub use entity_id::EntityId;
pub use message::{Message, MessageDraft, MessagePatch, MessagePriority};
pub use resource::{Resource, ResourceStats, SortKey, UNCATEGORIZED};
