// REST client for the dashboard backend.
//
// Wraps `reqwest::Client` with collection-scoped URL construction,
// bearer-token auth, uniform error mapping, and streamed multipart
// uploads with progress reporting. Every collection (documents,
// messages, ...) shares the same endpoint shape.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{
    Confirmation, ListQuery, Page, ProgressFn, SearchQuery, SearchResponse, TransferProgress,
    UploadPayload,
};

/// Size of each streamed upload chunk.
pub const UPLOAD_CHUNK_SIZE: usize = 16 * 1024;

/// Error body shape returned by the backend on non-2xx responses.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Async client for the dashboard REST API.
///
/// Cheap to clone: `reqwest::Client` is internally reference-counted.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for `base_url`, optionally injecting a bearer token
    /// as a sensitive default header on every request.
    pub fn new(
        base_url: &str,
        transport: &TransportConfig,
        token: Option<&SecretString>,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| Error::Authentication {
                    message: format!("invalid API token header value: {e}"),
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = transport.build_client(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn with_client(http: reqwest::Client, base_url: &str, timeout: Duration) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            timeout,
        })
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The backend base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Configured per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // ── Collection endpoints ─────────────────────────────────────────

    /// `GET /{collection}` with pagination, sort, and filter parameters.
    pub async fn list_page<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &ListQuery,
    ) -> Result<Page<T>, Error> {
        let url = self.url(&[collection])?;
        let params = query.to_params();
        debug!("GET {url} params={params:?}");

        let resp = self.send(self.http.get(url).query(&params)).await?;
        self.handle_response(resp).await
    }

    /// `GET /{collection}/search?q=...`
    pub async fn search<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &SearchQuery,
    ) -> Result<SearchResponse<T>, Error> {
        let url = self.url(&[collection, "search"])?;
        let params = query.to_params();
        debug!("GET {url} params={params:?}");

        let resp = self.send(self.http.get(url).query(&params)).await?;
        self.handle_response(resp).await
    }

    /// `GET /{collection}/{id}`
    pub async fn fetch<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<T, Error> {
        let url = self.url(&[collection, id])?;
        debug!("GET {url}");

        let resp = self.send(self.http.get(url)).await?;
        self.handle_response(resp).await
    }

    /// `POST /{collection}` with a JSON body.
    pub async fn create<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        collection: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(&[collection])?;
        debug!("POST {url}");

        let resp = self.send(self.http.post(url).json(body)).await?;
        self.handle_response(resp).await
    }

    /// `POST /{collection}/upload` as multipart: a `metadata` JSON part plus
    /// the streamed `file` part. `progress` is called for every chunk and
    /// once more with `sent == total` after the server accepts the upload.
    pub async fn upload<T: DeserializeOwned, M: Serialize + Sync>(
        &self,
        collection: &str,
        metadata: &M,
        payload: UploadPayload,
        progress: Option<ProgressFn>,
    ) -> Result<T, Error> {
        let url = self.url(&[collection, "upload"])?;
        let total = payload.len();
        debug!(file = %payload.file_name, bytes = total, "POST {url} (multipart)");

        let metadata = serde_json::to_string(metadata).map_err(|e| Error::Deserialization {
            message: format!("failed to encode upload metadata: {e}"),
            body: String::new(),
        })?;

        let body = chunked_body(payload.bytes.clone(), progress.clone());
        let file_part = Part::stream_with_length(body, total)
            .file_name(payload.file_name.clone())
            .mime_str(&payload.content_type)?;
        let form = Form::new().text("metadata", metadata).part("file", file_part);

        let resp = self.send(self.http.post(url).multipart(form)).await?;
        let item = self.handle_response(resp).await?;

        if let Some(progress) = progress {
            progress(TransferProgress { sent: total, total });
        }
        Ok(item)
    }

    /// `PUT /{collection}/{id}` with a JSON body.
    pub async fn update<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        collection: &str,
        id: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(&[collection, id])?;
        debug!("PUT {url}");

        let resp = self.send(self.http.put(url).json(body)).await?;
        self.handle_response(resp).await
    }

    /// `DELETE /{collection}/{id}`. An empty 2xx body counts as success.
    pub async fn remove(&self, collection: &str, id: &str) -> Result<Confirmation, Error> {
        let url = self.url(&[collection, id])?;
        debug!("DELETE {url}");

        let resp = self.send(self.http.delete(url)).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(self.error_from(resp).await);
        }
        let body = self.read_body(resp).await?;
        if body.trim().is_empty() {
            return Ok(Confirmation::default());
        }
        parse_body(&body)
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Join path segments onto the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, Error> {
        builder.send().await.map_err(|e| self.transport_error(e))
    }

    /// Surface reqwest timeouts as `Error::Timeout` so callers never
    /// have to inspect the reqwest error to detect them.
    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }

    async fn read_body(&self, resp: Response) -> Result<String, Error> {
        resp.text().await.map_err(|e| self.transport_error(e))
    }

    async fn handle_response<T: DeserializeOwned>(&self, resp: Response) -> Result<T, Error> {
        if !resp.status().is_success() {
            return Err(self.error_from(resp).await);
        }
        let body = self.read_body(resp).await?;
        trace!(bytes = body.len(), "response body received");
        parse_body(&body)
    }

    async fn error_from(&self, resp: Response) -> Error {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();

        if status == StatusCode::UNAUTHORIZED {
            return Error::Authentication {
                message: server_message(&body)
                    .unwrap_or_else(|| "missing or invalid API token".into()),
            };
        }

        let parsed = serde_json::from_str::<ErrorResponse>(&body).ok();
        let code = parsed.as_ref().and_then(|p| p.code.clone());
        let message = parsed
            .and_then(|p| p.message)
            .unwrap_or_else(|| preview(&body, status));

        Error::Server {
            status: status.as_u16(),
            message,
            code,
        }
    }
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    })
}

fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|p| p.message)
}

fn preview(body: &str, status: StatusCode) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_owned()
    } else {
        trimmed.chars().take(200).collect()
    }
}

/// Stream `bytes` in fixed-size chunks, reporting cumulative progress as
/// each chunk is handed to the connection.
fn chunked_body(bytes: Bytes, progress: Option<ProgressFn>) -> reqwest::Body {
    let total = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
    let stream = async_stream::stream! {
        let mut offset = 0usize;
        while offset < bytes.len() {
            let end = (offset + UPLOAD_CHUNK_SIZE).min(bytes.len());
            let chunk = bytes.slice(offset..end);
            offset = end;
            if let Some(ref progress) = progress {
                let sent = u64::try_from(offset).unwrap_or(total);
                progress(TransferProgress { sent, total });
            }
            yield Ok::<Bytes, std::io::Error>(chunk);
        }
    };
    reqwest::Body::wrap_stream(stream)
}
