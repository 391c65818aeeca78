//! Endpoint URL templates.
//!
//! Every function takes the host (scheme + authority, optionally with a path
//! prefix) and returns an absolute URL. Paths end with a slash, as the
//! server's router expects.

/// Public Konfuzio server used when no host is configured.
pub const DEFAULT_HOST: &str = "https://app.konfuzio.com";

/// Extra document fields requested by default: bounding boxes and hOCR.
pub const DEFAULT_EXTRA_FIELDS: &str = "bbox,hocr";

fn base(host: &str) -> &str {
    host.trim_end_matches('/')
}

/// Exchanges a username and password for an API token.
pub fn auth_token(host: &str) -> String {
    format!("{}/api/token-auth/", base(host))
}

/// Projects visible to the token; POST here creates one.
pub fn projects(host: &str) -> String {
    format!("{}/api/projects/", base(host))
}

/// A single project with its labels and categories.
pub fn project(host: &str, project_id: i64) -> String {
    format!("{}/api/projects/{project_id}/", base(host))
}

/// Paged listing of document metadata within a project.
pub fn documents_meta(host: &str, project_id: i64) -> String {
    format!("{}/api/projects/{project_id}/docs/", base(host))
}

/// One document, with `extra_fields` appended as a query when not empty.
pub fn document_details(host: &str, project_id: i64, document_id: i64, extra_fields: &str) -> String {
    let url = format!(
        "{}/api/projects/{project_id}/docs/{document_id}/",
        base(host)
    );
    if extra_fields.is_empty() {
        url
    } else {
        format!("{url}?extra_fields={extra_fields}")
    }
}

/// Annotations of a document; POST here adds one.
pub fn document_annotations(host: &str, project_id: i64, document_id: i64) -> String {
    format!(
        "{}/api/projects/{project_id}/docs/{document_id}/annotations/",
        base(host)
    )
}

/// A single annotation.
pub fn annotation(host: &str, project_id: i64, document_id: i64, annotation_id: i64) -> String {
    format!(
        "{}/api/projects/{project_id}/docs/{document_id}/annotations/{annotation_id}/",
        base(host)
    )
}

/// Detected page segments of a document.
pub fn document_segmentation(host: &str, project_id: i64, document_id: i64) -> String {
    format!(
        "{}/api/projects/{project_id}/docs/{document_id}/segmentation/",
        base(host)
    )
}

/// Multipart document upload.
pub fn upload_document(host: &str) -> String {
    format!("{}/api/v2/docs/", base(host))
}

/// A document for update or deletion.
pub fn document(host: &str, document_id: i64) -> String {
    format!("{}/api/v2/docs/{document_id}/", base(host))
}

/// The OCR-processed PDF of a document.
pub fn document_ocr_file(host: &str, document_id: i64) -> String {
    format!("{}/doc/show/{document_id}/", base(host))
}

/// The file exactly as it was uploaded.
pub fn document_original_file(host: &str, document_id: i64) -> String {
    format!("{}/doc/show-original/{document_id}/", base(host))
}

/// Label creation.
pub fn labels(host: &str) -> String {
    format!("{}/api/v2/labels/", base(host))
}

/// AI model artifact upload.
pub fn create_ai_model(host: &str) -> String {
    format!("{}/api/aimodels/", base(host))
}

/// A stored AI model, patched to link categories.
pub fn ai_model(host: &str, ai_model_id: i64) -> String {
    format!("{}/api/aimodels/{ai_model_id}/", base(host))
}
