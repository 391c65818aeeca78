//! Project operations.

use log::info;
use reqwest::Method;
use serde_json::json;

use crate::errors::Result;
use crate::models::{CreatedResponse, Project};
use crate::session::{expect_status, Session};
use crate::urls;

impl Session {
    /// List every project the token has access to.
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let items = self.fetch_all_pages(&urls::projects(self.host())).await?;
        let projects = items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Project>, _>>()?;
        Ok(projects)
    }

    /// Fetch one project, including the label sets available in it.
    pub async fn get_project_details(&self, project_id: i64) -> Result<Project> {
        self.get_json(&urls::project(self.host(), project_id)).await
    }

    /// Create a project and return its ID.
    ///
    /// # Errors
    ///
    /// [`KonfuzioError::Validation`](crate::KonfuzioError::Validation) unless
    /// the server answers 201, e.g. when the token lacks permission.
    pub async fn create_project(&self, name: &str) -> Result<i64> {
        let body = json!({ "name": name });
        let response = self
            .execute(Method::POST, &urls::projects(self.host()), |req| {
                Ok(req.json(&body))
            })
            .await?;
        let response = expect_status(response, &[201], format!("project {name:?}")).await?;

        let created: CreatedResponse = response.json().await?;
        info!("project {name} (ID {}) was created", created.id);
        Ok(created.id)
    }
}
