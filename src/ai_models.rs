//! AI model artifact upload.

use std::path::Path;
use std::time::Duration;

use log::info;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::json;

use crate::documents::read_upload;
use crate::errors::{KonfuzioError, Result};
use crate::models::UploadedAiModel;
use crate::session::{error_for_status, Session};
use crate::urls;

impl Session {
    /// Upload a trained model file and make it available to categories.
    ///
    /// This performs up to two HTTP calls:
    /// 1. `POST` the artifact as multipart form data, asking the server to
    ///    process it asynchronously (`Prefer: respond-async`).
    /// 2. If `category_ids` is not empty, `PATCH` the stored model to link it
    ///    to those categories.
    ///
    /// # Errors
    ///
    /// - [`KonfuzioError::MissingFile`] if `path` is not a regular file.
    /// - [`KonfuzioError::ModelCategoryLink`] if step 2 fails. The upload from
    ///   step 1 stays on the server and is carried in the error.
    pub async fn upload_ai_model(
        &self,
        path: impl AsRef<Path>,
        category_ids: &[i64],
    ) -> Result<UploadedAiModel> {
        self.upload_ai_model_with_timeout(path, category_ids, None).await
    }

    /// Like [`Session::upload_ai_model`], but `timeout` replaces the session's
    /// default for the artifact upload in step 1.
    pub async fn upload_ai_model_with_timeout(
        &self,
        path: impl AsRef<Path>,
        category_ids: &[i64],
        timeout: Option<Duration>,
    ) -> Result<UploadedAiModel> {
        let path = path.as_ref();
        let (model_name, bytes) = read_upload(path).await?;

        let response = self
            .execute(Method::POST, &urls::create_ai_model(self.host()), |req| {
                let part = Part::bytes(bytes.clone()).file_name(model_name.clone());
                let req = req
                    .header("Prefer", "respond-async")
                    .multipart(Form::new().part("ai_model", part));
                Ok(match timeout {
                    Some(t) => req.timeout(t),
                    None => req,
                })
            })
            .await?;
        let response = error_for_status(response).await?;
        let model: UploadedAiModel = response.json().await?;
        info!("uploaded AI model {} as {}", model.id, model.ai_model);

        if category_ids.is_empty() {
            return Ok(model);
        }

        if let Err(source) = self.link_ai_model(model.id, category_ids).await {
            return Err(KonfuzioError::ModelCategoryLink {
                model,
                source: Box::new(source),
            });
        }

        info!("linked AI model {} to categories {category_ids:?}", model.id);
        Ok(model)
    }

    async fn link_ai_model(&self, ai_model_id: i64, category_ids: &[i64]) -> Result<()> {
        let body = json!({ "templates": category_ids });
        let response = self
            .execute(Method::PATCH, &urls::ai_model(self.host(), ai_model_id), |req| {
                Ok(req.json(&body))
            })
            .await?;
        error_for_status(response).await?;
        Ok(())
    }
}
