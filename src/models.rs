use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::KonfuzioError;

/// Lifecycle stage of a document within the training pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DatasetStatus {
    #[default]
    None = 0,
    Preparation = 1,
    Training = 2,
    Test = 3,
    LowOcrQuality = 4,
}

impl From<DatasetStatus> for u8 {
    fn from(status: DatasetStatus) -> Self {
        status as u8
    }
}

impl TryFrom<u8> for DatasetStatus {
    type Error = KonfuzioError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Preparation),
            2 => Ok(Self::Training),
            3 => Ok(Self::Test),
            4 => Ok(Self::LowOcrQuality),
            other => Err(KonfuzioError::UnknownDatasetStatus(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Project {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    /// Remaining fields, e.g. the label sets on the details endpoint.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of a project's document listing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DocumentMeta {
    pub id: i64,
    #[serde(default)]
    pub data_file_name: Option<String>,
    #[serde(default)]
    pub dataset_status: DatasetStatus,
    /// Category the document belongs to.
    #[serde(default)]
    pub category_template: Option<i64>,
    #[serde(default)]
    pub number_of_pages: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Extracted text and layout of a single document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentDetails {
    pub id: i64,
    #[serde(default)]
    pub text: Option<String>,
    /// Character bounding boxes, keyed by character offset.
    #[serde(default)]
    pub bbox: Option<Value>,
    #[serde(default)]
    pub hocr: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A rectangle on a document page, in PDF points.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BoundingBox {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub page_index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
}

/// Payload for creating an annotation.
///
/// Optional fields left as `None` are not transmitted. `annotation_set` is
/// always sent: `None` asks the server to create a new annotation set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewAnnotation {
    #[serde(rename = "label")]
    pub label_id: i64,
    #[serde(rename = "section_label_id")]
    pub label_set_id: i64,
    #[serde(rename = "section")]
    pub annotation_set: Option<i64>,
    pub revised: bool,
    pub is_correct: bool,
    #[serde(rename = "accuracy", skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_bboxes: Option<Vec<BoundingBox>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection_bbox: Option<BoundingBox>,
}

impl NewAnnotation {
    pub fn new(label_id: i64, label_set_id: i64) -> Self {
        Self {
            label_id,
            label_set_id,
            ..Self::default()
        }
    }

    /// Span the annotation over `start..end` of the document text.
    pub fn with_offsets(mut self, start: u64, end: u64) -> Self {
        self.start_offset = Some(start);
        self.end_offset = Some(end);
        self
    }

    /// Attach to an existing annotation set instead of creating a new one.
    pub fn in_annotation_set(mut self, annotation_set_id: i64) -> Self {
        self.annotation_set = Some(annotation_set_id);
        self
    }
}

/// Outcome of deleting an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationDeletion {
    Deleted,
    /// The server recorded negative feedback by copying the annotation.
    Replaced { new_annotation_id: i64 },
}

/// Payload for creating a label.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLabel {
    pub name: String,
    /// Label sets that use the label.
    pub label_set_ids: Vec<i64>,
    pub description: Option<String>,
    pub has_multiple_top_candidates: bool,
    /// Default: "Text".
    pub data_type: String,
}

impl NewLabel {
    pub fn new(name: impl Into<String>, label_set_ids: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            label_set_ids,
            description: None,
            has_multiple_top_candidates: false,
            data_type: "Text".to_string(),
        }
    }
}

/// Options for `upload_file`.
#[derive(Debug, Clone, Default)]
pub struct DocumentUpload {
    pub project_id: i64,
    pub dataset_status: DatasetStatus,
    pub category_id: Option<i64>,
    /// Overrides the session's default request timeout.
    pub timeout: Option<Duration>,
}

/// Changes applied by `update_file`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentUpdate {
    #[serde(rename = "data_file_name")]
    pub file_name: String,
    /// Read the document first to keep its current status.
    pub dataset_status: DatasetStatus,
    #[serde(rename = "category_template", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

/// Which rendition of a document to download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileVersion {
    /// The OCR-processed PDF.
    #[default]
    Ocr,
    Original,
}

/// An AI model artifact stored by the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadedAiModel {
    pub id: i64,
    /// Name or location of the stored artifact.
    pub ai_model: String,
}

// ---------------------------------------------------------------------------
// Internal request/response shapes
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub(crate) struct NewLabelPayload<'a> {
    pub project: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub has_multiple_top_candidates: bool,
    pub get_data_type_display: &'a str,
    pub templates: &'a [i64],
}

#[derive(Deserialize)]
pub(crate) struct CreatedResponse {
    #[serde(alias = "id_")]
    pub id: i64,
}

#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dataset_status_is_an_integer_on_the_wire() {
        assert_eq!(serde_json::to_value(DatasetStatus::Training).unwrap(), json!(2));
        let status: DatasetStatus = serde_json::from_value(json!(4)).unwrap();
        assert_eq!(status, DatasetStatus::LowOcrQuality);
        assert!(serde_json::from_value::<DatasetStatus>(json!(9)).is_err());
    }

    #[test]
    fn test_minimal_annotation_omits_absent_fields() {
        let payload = serde_json::to_value(NewAnnotation::new(7, 3)).unwrap();
        assert_eq!(
            payload,
            json!({
                "label": 7,
                "section_label_id": 3,
                "section": null,
                "revised": false,
                "is_correct": false,
            })
        );
    }

    #[test]
    fn test_full_annotation_payload() {
        let bbox = BoundingBox {
            x0: 1.0,
            x1: 2.0,
            y0: 3.0,
            y1: 4.0,
            page_index: 0,
            top: None,
            bottom: None,
        };
        let annotation = NewAnnotation {
            confidence: Some(0.9),
            is_correct: true,
            page_number: Some(1),
            offset_string: Some("Musterstraße".into()),
            bbox: Some(bbox.clone()),
            custom_bboxes: Some(vec![bbox]),
            ..NewAnnotation::new(7, 3).with_offsets(10, 22).in_annotation_set(55)
        };
        let payload = serde_json::to_value(annotation).unwrap();

        assert_eq!(payload["section"], json!(55));
        assert_eq!(payload["accuracy"], json!(0.9));
        assert_eq!(payload["start_offset"], json!(10));
        assert_eq!(payload["end_offset"], json!(22));
        assert_eq!(payload["offset_string"], json!("Musterstraße"));
        assert_eq!(payload["bbox"]["page_index"], json!(0));
        assert!(payload["bbox"].get("top").is_none());
        assert_eq!(payload["custom_bboxes"].as_array().unwrap().len(), 1);
        assert!(payload.get("selection_bbox").is_none());
    }

    #[test]
    fn test_document_meta_keeps_unknown_fields() {
        let meta: DocumentMeta = serde_json::from_value(json!({
            "id": 12,
            "data_file_name": "invoice.pdf",
            "dataset_status": 2,
            "status": [2, "Done"],
        }))
        .unwrap();
        assert_eq!(meta.id, 12);
        assert_eq!(meta.dataset_status, DatasetStatus::Training);
        assert_eq!(meta.category_template, None);
        assert!(meta.extra.contains_key("status"));
    }

    #[test]
    fn test_document_update_omits_missing_category() {
        let update = DocumentUpdate {
            file_name: "a.pdf".into(),
            dataset_status: DatasetStatus::Test,
            category_id: None,
        };
        assert_eq!(
            serde_json::to_value(update).unwrap(),
            json!({"data_file_name": "a.pdf", "dataset_status": 3})
        );
    }

    #[test]
    fn test_created_response_accepts_either_id_key() {
        let a: CreatedResponse = serde_json::from_value(json!({"id_": 4})).unwrap();
        let b: CreatedResponse = serde_json::from_value(json!({"id": 5})).unwrap();
        assert_eq!((a.id, b.id), (4, 5));
    }
}
