//! Async HTTP client for the netdash operations backend.
//!
//! Every dashboard collection (documents, messages, ...) is exposed by the
//! backend under the same REST shape:
//!
//! - `GET    /{collection}`          paginated list ([`Page`])
//! - `GET    /{collection}/search`   full-text search ([`SearchResponse`])
//! - `GET    /{collection}/{id}`     single item
//! - `POST   /{collection}`          JSON create
//! - `POST   /{collection}/upload`   multipart create with a binary payload
//! - `PUT    /{collection}/{id}`     update
//! - `DELETE /{collection}/{id}`     removal ([`Confirmation`])
//!
//! [`ApiClient`] is generic over the item type; `netdash-core` layers the
//! per-resource state containers on top.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::{ApiClient, UPLOAD_CHUNK_SIZE};
pub use error::Error;
pub use transport::{DEFAULT_TIMEOUT, TlsMode, TransportConfig};
pub use types::{
    Confirmation, ListQuery, Page, PageMeta, ProgressFn, SearchQuery, SearchResponse, SortOrder,
    TransferProgress, UploadPayload,
};
