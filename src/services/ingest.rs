use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use std::time::Duration;

/// Contacts requested per page from the CRM.
pub const PAGE_LIMIT: u32 = 100;

/// Upper bound on a single CRM request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Deserialize)]
pub struct CrmContact {
    pub id: String,
    #[serde(default)]
    pub properties: ContactProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactProperties {
    pub email: Option<String>,
    #[serde(rename = "lifecyclestage")]
    pub lifecycle_stage: Option<String>,
    #[serde(rename = "hs_lead_status")]
    pub lead_status: Option<String>,
    /// RFC 3339 timestamp of the last logged contact.
    #[serde(rename = "notes_last_contacted")]
    pub last_contacted: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactPage {
    #[serde(default)]
    pub results: Vec<CrmContact>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paging {
    pub next: Option<PagingNext>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PagingNext {
    pub after: String,
}

impl ContactPage {
    pub fn next_cursor(&self) -> Option<&str> {
        self.paging
            .as_ref()
            .and_then(|p| p.next.as_ref())
            .map(|n| n.after.as_str())
            .filter(|after| !after.is_empty())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Ingest API is not configured")]
    NotConfigured,
}

/// Paged contact feed from the marketing platform.
#[async_trait]
pub trait ContactSource: Send + Sync {
    async fn fetch_page(&self, after: Option<&str>) -> Result<ContactPage, IngestError>;
}

/// Marketing/CRM API client
pub struct IngestClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// Falls back to a default client, loudly, when the configured one can't
/// be built.
fn build_client(builder: ClientBuilder) -> Client {
    builder.build().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ingest client setup failed, using defaults without a timeout");
        Client::new()
    })
}

impl IngestClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = build_client(Client::builder().timeout(REQUEST_TIMEOUT));

        Self {
            client,
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl ContactSource for IngestClient {
    async fn fetch_page(&self, after: Option<&str>) -> Result<ContactPage, IngestError> {
        let url = format!("{}/contacts", self.base_url);

        let mut query = vec![("limit", PAGE_LIMIT.to_string())];
        if let Some(after) = after {
            query.push(("after", after.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(&query)
            .send()
            .await
            .map_err(|e| IngestError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IngestError::Api(format!(
                "API returned status: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| IngestError::Parse(e.to_string()))
    }
}
