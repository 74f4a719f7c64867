use async_trait::async_trait;
use tracing::debug;

use crate::error::FetchError;
use crate::models::alert::{Alert, WireAlert};

/// Remote alert collection. One-shot reads only; the sync loop decides when
/// to call again.
#[async_trait]
pub trait AlertSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Alert>, FetchError>;
}

/// REST client for the SISCOM travel-alert collection endpoint.
pub struct HttpAlertSource {
    client: reqwest::Client,
    url: String,
}

impl HttpAlertSource {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}/alertviajetrips", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl AlertSource for HttpAlertSource {
    async fn fetch(&self) -> Result<Vec<Alert>, FetchError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }

        let body = response.bytes().await?;
        let records: Vec<WireAlert> = serde_json::from_slice(&body)?;
        debug!("Fetched {} alert records from {}", records.len(), self.url);

        Ok(records.into_iter().map(WireAlert::into_alert).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_building() {
        let client = reqwest::Client::new();
        let source = HttpAlertSource::new(client.clone(), "https://api.siscom.mx/");
        assert_eq!(source.url, "https://api.siscom.mx/alertviajetrips");

        let source = HttpAlertSource::new(client, "https://api.siscom.mx");
        assert_eq!(source.url, "https://api.siscom.mx/alertviajetrips");
    }

    #[test]
    fn test_collection_payload_mixes_naming_conventions() {
        // One response can contain migrated and new records side by side.
        let body = r#"
        [
            { "id": 1, "type": "medica", "reportedAt": "2025-11-29T10:00:00Z",
              "location": { "lat": 19.4, "lng": -99.1 } },
            { "id": 2, "alert_type": "combustible", "reported_at": "2025-11-29 09:00:00",
              "location": { "lat": "19.5", "lng": "-99.2" } }
        ]
        "#;
        let records: Vec<WireAlert> = serde_json::from_slice(body.as_bytes()).unwrap();
        let alerts: Vec<Alert> = records.into_iter().map(WireAlert::into_alert).collect();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].kind, "medica");
        assert_eq!(alerts[1].kind, "combustible");
        assert!(alerts[1].location.lat_lng().is_some());
    }
}
