//! HTTP registration client
//!
//! Posts each event as JSON to the configured endpoint:
//!
//! ```json
//! { "event": { "eventName": "...", "eventContent": "...", "eventTime": "2017-08-01",
//!              "links": ["..."], "extraFields": { ... } },
//!   "isTest": false }
//! ```

use crate::config::RegistrationConfig;
use crate::model::StockCalendarEvent;
use crate::registration::traits::{EventRegistrar, RegistrationResult};
use crate::RegistrationError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationRequest<'a> {
    event: &'a StockCalendarEvent,
    is_test: bool,
}

/// Registrar backed by a JSON HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpRegistrar {
    client: Client,
    endpoint: String,
    test_mode: bool,
}

impl HttpRegistrar {
    pub fn new(client: Client, config: &RegistrationConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            test_mode: config.test_mode,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EventRegistrar for HttpRegistrar {
    async fn register(&self, event: &StockCalendarEvent) -> RegistrationResult<()> {
        let request = RegistrationRequest {
            event,
            is_test: self.test_mode,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistrationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
