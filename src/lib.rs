//! # Konfuzio client for Rust
//!
//! Async client for the [Konfuzio](https://konfuzio.com) document processing
//! API. Log in, manage projects, labels and annotations, upload and download
//! documents, and publish trained AI models.
//!
//! Every operation is a method on a [`Session`], which carries the API token,
//! a retry policy for idempotent requests and a default timeout. Create one
//! session and pass it wherever the API is needed.
//!
//! ## Quick start
//!
//! ```no_run
//! use konfuzio::{Credentials, DocumentUpload, FileVersion, Session};
//!
//! #[tokio::main]
//! async fn main() -> konfuzio::Result<()> {
//!     let session = Session::login(
//!         "https://app.konfuzio.com",
//!         Credentials::new("me@example.com", "secret"),
//!     )
//!     .await?;
//!
//!     let project_id = 46;
//!     for doc in session.get_meta_of_files(project_id).await? {
//!         println!("{} {:?}", doc.id, doc.data_file_name);
//!     }
//!
//!     let opts = DocumentUpload { project_id, ..Default::default() };
//!     let doc = session.upload_file("invoice.pdf", &opts).await?;
//!     let pdf = session.download_file(doc.id, FileVersion::Original).await?;
//!     println!("{} bytes", pdf.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Builder pattern
//!
//! ```no_run
//! use konfuzio::SessionBuilder;
//! use std::time::Duration;
//!
//! # fn example() -> konfuzio::Result<()> {
//! let session = SessionBuilder::new()
//!     .token("0123456789abcdef")
//!     .host("https://konfuzio.example.com")
//!     .max_attempts(3)
//!     .timeout(Duration::from_secs(300))
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Retries
//!
//! GET, HEAD, PUT, DELETE, OPTIONS and TRACE requests answered with 429,
//! 500, 502, 503 or 504 are repeated with exponential backoff, up to five
//! attempts in total. POST and PATCH requests are never repeated after they
//! reached the server.

mod ai_models;
mod annotations;
mod auth;
mod documents;
mod errors;
mod labels;
mod models;
mod pagination;
mod projects;
mod retry;
mod session;
pub mod urls;

pub use auth::{authenticate, Credentials};
pub use documents::DOWNLOAD_CONTENT_TYPES;
pub use errors::{KonfuzioError, Result};
pub use models::{
    AnnotationDeletion, BoundingBox, DatasetStatus, DocumentDetails, DocumentMeta,
    DocumentUpdate, DocumentUpload, FileVersion, NewAnnotation, NewLabel, Project,
    UploadedAiModel,
};
pub use retry::{parse_retry_after, RetryPolicy, RETRY_STATUSES};
pub use session::{Session, SessionBuilder};
