use std::path::PathBuf;

use thiserror::Error;

use crate::models::UploadedAiModel;

/// All errors that can occur when talking to the Konfuzio API.
#[derive(Error, Debug)]
pub enum KonfuzioError {
    /// The credentials were rejected or no token is available.
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// The server kept answering 429 or 5xx until the retry budget ran out.
    #[error("server error {status} from {url} after {attempts} attempts")]
    TransientServer {
        status: u16,
        url: String,
        attempts: u32,
    },

    /// A create/update/list call got an unexpected status or payload shape.
    #[error("{resource}: unexpected response (status {status}): {message}")]
    Validation {
        resource: String,
        status: u16,
        message: String,
    },

    /// A document download returned something other than a PDF or image.
    #[error("content type of document {document_id} is {content_type:?}, expected a PDF or image")]
    Download {
        document_id: i64,
        content_type: Option<String>,
    },

    /// A paged listing did not terminate.
    #[error("pagination of {url} aborted after {pages} pages: {reason}")]
    Pagination {
        url: String,
        pages: usize,
        reason: String,
    },

    /// The AI model was uploaded but linking it to categories failed.
    ///
    /// The upload itself is committed; `model` identifies the stored artifact.
    #[error("AI model {} uploaded but linking categories failed: {source}", model.id)]
    ModelCategoryLink {
        model: UploadedAiModel,
        #[source]
        source: Box<KonfuzioError>,
    },

    /// Any other non-success status.
    #[error("API error {status} from {url}: {message}")]
    Api {
        status: u16,
        url: String,
        message: String,
        body: Option<serde_json::Value>,
    },

    /// The path handed to an upload does not point at a regular file.
    #[error("{} is not a file", path.display())]
    MissingFile { path: PathBuf },

    /// A dataset status code outside 0..=4.
    #[error("unknown dataset status {0}")]
    UnknownDatasetStatus(u8),

    /// The session could not be configured.
    #[error("configuration error: {0}")]
    Config(String),

    /// A host or `next` link that is not a valid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A transport-level HTTP error from reqwest.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// An I/O error, typically from reading a local file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A response body that does not decode into the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenience alias for `Result<T, KonfuzioError>`.
pub type Result<T> = std::result::Result<T, KonfuzioError>;
