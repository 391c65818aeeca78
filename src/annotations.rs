//! Annotation operations.

use log::info;
use reqwest::Method;
use serde_json::Value;

use crate::errors::{KonfuzioError, Result};
use crate::models::{AnnotationDeletion, CreatedResponse, NewAnnotation};
use crate::session::{error_for_status, expect_status, Session};
use crate::urls;

impl Session {
    /// Add an annotation to a document and return the server's record of it.
    ///
    /// # Errors
    ///
    /// [`KonfuzioError::Validation`] unless the server answers 201.
    pub async fn post_annotation(
        &self,
        document_id: i64,
        project_id: i64,
        annotation: &NewAnnotation,
    ) -> Result<Value> {
        let url = urls::document_annotations(self.host(), project_id, document_id);
        let response = self
            .execute(Method::POST, &url, |req| Ok(req.json(annotation)))
            .await?;
        let response = expect_status(
            response,
            &[201],
            format!("annotation on document {document_id}"),
        )
        .await?;

        Ok(response.json().await?)
    }

    /// Add several annotations to a document in one request.
    pub async fn post_bulk_annotations(
        &self,
        document_id: i64,
        project_id: i64,
        annotations: &[NewAnnotation],
    ) -> Result<()> {
        let url = urls::document_annotations(self.host(), project_id, document_id);
        let response = self
            .execute(Method::POST, &url, |req| Ok(req.json(annotations)))
            .await?;
        error_for_status(response).await?;

        info!(
            "added {} annotations to document {document_id}",
            annotations.len()
        );
        Ok(())
    }

    /// Delete an annotation.
    ///
    /// The server may instead keep a copy carrying the negative feedback, in
    /// which case the copy's ID is returned as [`AnnotationDeletion::Replaced`].
    pub async fn delete_annotation(
        &self,
        document_id: i64,
        annotation_id: i64,
        project_id: i64,
    ) -> Result<AnnotationDeletion> {
        let url = urls::annotation(self.host(), project_id, document_id, annotation_id);
        let response = self.execute(Method::DELETE, &url, Ok).await?;

        match response.status().as_u16() {
            204 => Ok(AnnotationDeletion::Deleted),
            200 => {
                let created: CreatedResponse = response.json().await?;
                Ok(AnnotationDeletion::Replaced {
                    new_annotation_id: created.id,
                })
            }
            status => {
                let err = error_for_status(response).await.err();
                Err(err.unwrap_or(KonfuzioError::Validation {
                    resource: format!("annotation {annotation_id}"),
                    status,
                    message: "unexpected success status".into(),
                }))
            }
        }
    }
}
