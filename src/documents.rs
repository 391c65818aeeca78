//! Document upload, download and metadata operations.

use std::path::Path;

use log::info;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::{json, Value};

use crate::errors::{KonfuzioError, Result};
use crate::models::{DocumentDetails, DocumentMeta, DocumentUpdate, DocumentUpload, FileVersion};
use crate::session::{error_for_status, expect_status, Session};
use crate::urls;

/// Content types accepted from the file download endpoints.
pub const DOWNLOAD_CONTENT_TYPES: [&str; 4] =
    ["application/pdf", "image/jpeg", "image/png", "image/jpg"];

impl Session {
    /// Fetch the extracted text, bounding boxes and hOCR of a document.
    pub async fn get_document_details(
        &self,
        document_id: i64,
        project_id: i64,
    ) -> Result<DocumentDetails> {
        self.get_document_details_with_fields(document_id, project_id, urls::DEFAULT_EXTRA_FIELDS)
            .await
    }

    /// Like [`get_document_details`](Self::get_document_details) with a custom
    /// comma-separated `extra_fields` selection (empty for none).
    pub async fn get_document_details_with_fields(
        &self,
        document_id: i64,
        project_id: i64,
        extra_fields: &str,
    ) -> Result<DocumentDetails> {
        let url = urls::document_details(self.host(), project_id, document_id, extra_fields);
        self.get_json(&url).await
    }

    /// List the metadata of every document in a project, sorted by ID.
    pub async fn get_meta_of_files(&self, project_id: i64) -> Result<Vec<DocumentMeta>> {
        let items = self
            .fetch_all_pages(&urls::documents_meta(self.host(), project_id))
            .await?;

        let mut documents = items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<DocumentMeta>, _>>()?;
        documents.sort_by_key(|d| d.id);
        Ok(documents)
    }

    /// Upload a local file as a new document.
    ///
    /// The file is read into memory and sent as the `data_file` part of a
    /// multipart form.
    ///
    /// # Errors
    ///
    /// - [`KonfuzioError::MissingFile`] if `path` is not a regular file.
    /// - [`KonfuzioError::Validation`] unless the server answers 200 or 201.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        opts: &DocumentUpload,
    ) -> Result<DocumentMeta> {
        let path = path.as_ref();
        let (file_name, bytes) = read_upload(path).await?;

        let url = urls::upload_document(self.host());
        let response = self
            .execute(Method::POST, &url, |req| {
                let part = Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str("application/octet-stream")?;
                let mut form = Form::new()
                    .part("data_file", part)
                    .text("project", opts.project_id.to_string())
                    .text("dataset_status", u8::from(opts.dataset_status).to_string());
                if let Some(category) = opts.category_id {
                    form = form.text("category_template", category.to_string());
                }

                let req = req.multipart(form);
                Ok(match opts.timeout {
                    Some(t) => req.timeout(t),
                    None => req,
                })
            })
            .await?;

        let response = expect_status(response, &[200, 201], format!("upload of {file_name}")).await?;
        let document: DocumentMeta = response.json().await?;
        info!("uploaded {} as document {}", path.display(), document.id);
        Ok(document)
    }

    /// Delete a document.
    pub async fn delete_file(&self, document_id: i64) -> Result<()> {
        let body = json!({ "id": document_id });
        let response = self
            .execute(Method::DELETE, &urls::document(self.host(), document_id), |req| {
                Ok(req.json(&body))
            })
            .await?;
        expect_status(response, &[204], format!("document {document_id}")).await?;

        info!("deleted document {document_id}");
        Ok(())
    }

    /// Rename a document and set its dataset status and category.
    pub async fn update_file(
        &self,
        document_id: i64,
        update: &DocumentUpdate,
    ) -> Result<DocumentMeta> {
        let response = self
            .execute(Method::PATCH, &urls::document(self.host(), document_id), |req| {
                Ok(req.json(update))
            })
            .await?;
        let response = expect_status(response, &[200], format!("document {document_id}")).await?;
        Ok(response.json().await?)
    }

    /// Download the PDF or image behind a document.
    ///
    /// # Errors
    ///
    /// [`KonfuzioError::Download`] if the server answers with anything but a
    /// PDF or image, e.g. an HTML login page.
    pub async fn download_file(&self, document_id: i64, version: FileVersion) -> Result<Vec<u8>> {
        let url = match version {
            FileVersion::Ocr => urls::document_ocr_file(self.host(), document_id),
            FileVersion::Original => urls::document_original_file(self.host(), document_id),
        };

        let response = self.execute(Method::GET, &url, Ok).await?;
        let response = error_for_status(response).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if !is_document_content_type(content_type.as_deref()) {
            return Err(KonfuzioError::Download {
                document_id,
                content_type,
            });
        }

        let bytes = response.bytes().await?;
        info!("downloaded file {document_id} from {}", self.host());
        Ok(bytes.to_vec())
    }

    /// Fetch the page segmentation boxes of a document, one list per page.
    pub async fn get_segmentation_results(
        &self,
        document_id: i64,
        project_id: i64,
    ) -> Result<Vec<Vec<Value>>> {
        let url = urls::document_segmentation(self.host(), project_id, document_id);
        self.get_json(&url).await
    }
}

/// Read an upload into memory, returning its file name and contents.
pub(crate) async fn read_upload(path: &Path) -> Result<(String, Vec<u8>)> {
    let is_file = tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(KonfuzioError::MissingFile {
            path: path.to_path_buf(),
        });
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let bytes = tokio::fs::read(path).await?;
    Ok((file_name, bytes))
}

/// Compare the media type, ignoring parameters and case.
fn is_document_content_type(content_type: Option<&str>) -> bool {
    let Some(value) = content_type else {
        return false;
    };
    let essence = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    DOWNLOAD_CONTENT_TYPES.contains(&essence.as_str())
}
