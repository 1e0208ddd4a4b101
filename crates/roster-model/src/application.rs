//! The registered application entity.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::status::StatusInfo;

/// An immutable description of one registered client application.
///
/// The `id` is absent on the registration payload a client sends and is
/// assigned by the registry store on first insert. The `health_url` is
/// the store's de-duplication key and must be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    #[serde(default)]
    management_url: String,
    health_url: String,
    #[serde(default)]
    service_url: String,
    #[serde(default = "StatusInfo::unknown")]
    status_info: StatusInfo,
}

impl Application {
    /// Start a builder for a fresh application with the given name.
    ///
    /// The initial status is UNKNOWN.
    pub fn create(name: impl Into<String>) -> ApplicationBuilder {
        ApplicationBuilder {
            id: None,
            name: name.into(),
            management_url: String::new(),
            health_url: String::new(),
            service_url: String::new(),
            status_info: StatusInfo::unknown(),
        }
    }

    /// Start a builder seeded from an existing value (copy-on-write).
    pub fn rebuild(app: &Application) -> ApplicationBuilder {
        ApplicationBuilder {
            id: app.id.clone(),
            name: app.name.clone(),
            management_url: app.management_url.clone(),
            health_url: app.health_url.clone(),
            service_url: app.service_url.clone(),
            status_info: app.status_info.clone(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn management_url(&self) -> &str {
        &self.management_url
    }

    pub fn health_url(&self) -> &str {
        &self.health_url
    }

    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    pub fn status_info(&self) -> &StatusInfo {
        &self.status_info
    }
}

/// Builder for [`Application`] values.
#[derive(Debug)]
pub struct ApplicationBuilder {
    id: Option<String>,
    name: String,
    management_url: String,
    health_url: String,
    service_url: String,
    status_info: StatusInfo,
}

impl ApplicationBuilder {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_management_url(mut self, url: impl Into<String>) -> Self {
        self.management_url = url.into();
        self
    }

    pub fn with_health_url(mut self, url: impl Into<String>) -> Self {
        self.health_url = url.into();
        self
    }

    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = url.into();
        self
    }

    pub fn with_status_info(mut self, status_info: StatusInfo) -> Self {
        self.status_info = status_info;
        self
    }

    /// Validate and produce the application value.
    pub fn build(self) -> Result<Application, ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::MissingName);
        }
        if self.health_url.trim().is_empty() {
            return Err(ModelError::MissingHealthUrl);
        }
        Ok(Application {
            id: self.id,
            name: self.name,
            management_url: self.management_url,
            health_url: self.health_url,
            service_url: self.service_url,
            status_info: self.status_info,
        })
    }
}
