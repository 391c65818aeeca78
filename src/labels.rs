//! Label operations.

use log::info;
use reqwest::Method;

use crate::errors::Result;
use crate::models::{CreatedResponse, NewLabel, NewLabelPayload};
use crate::session::{expect_status, Session};
use crate::urls;

impl Session {
    /// Create a label in a project and attach it to label sets.
    ///
    /// Returns the new label's ID.
    pub async fn create_label(&self, project_id: i64, label: &NewLabel) -> Result<i64> {
        let payload = NewLabelPayload {
            project: project_id,
            text: &label.name,
            description: label.description.as_deref(),
            has_multiple_top_candidates: label.has_multiple_top_candidates,
            get_data_type_display: &label.data_type,
            templates: &label.label_set_ids,
        };

        let response = self
            .execute(Method::POST, &urls::labels(self.host()), |req| {
                Ok(req.json(&payload))
            })
            .await?;
        let response = expect_status(response, &[201], format!("label {:?}", label.name)).await?;

        let created: CreatedResponse = response.json().await?;
        info!("label {} (ID {}) was created", label.name, created.id);
        Ok(created.id)
    }
}
