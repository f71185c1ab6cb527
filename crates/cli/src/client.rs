//! API client for communicating with the car pricer service

use anyhow::{Context, Result};
use pricer_lib::{predictor::SchemaRef, HealthResponse};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

/// API client for the car pricer service
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        parse(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        parse(response).await
    }

    /// Fetch service health; an unhealthy service still reports its components
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = self.base_url.join("healthz").context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        if response.status() == StatusCode::SERVICE_UNAVAILABLE {
            return response.json().await.context("Failed to parse response");
        }
        parse(response).await
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        anyhow::bail!("API error ({}): {}", status, message);
    }

    response.json().await.context("Failed to parse response")
}

// API response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub price: f64,
    pub display: String,
    pub model_version: String,
    pub generated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaResponse {
    pub schema: SchemaRef,
    pub controls: Vec<ControlInfo>,
}

/// One form control as served by `/api/schema`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlInfo {
    pub field: String,
    pub label: String,
    pub section: String,
    pub control: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_lib::{ComponentStatus, FeatureRecord};

    #[tokio::test]
    async fn test_post_predict() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/predict")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"price":27578.18,"display":"Estimated Car Price: $27,578.18","model_version":"demo","generated_at":1718000000}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let response: PredictResponse = client
            .post("api/predict", &FeatureRecord::default())
            .await
            .unwrap();

        assert_eq!(response.display, "Estimated Car Price: $27,578.18");
        assert_eq!(response.model_version, "demo");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_message_is_extracted() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/predict")
            .with_status(503)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"model artifact unavailable: not found"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client
            .post::<PredictResponse, _>("api/predict", &FeatureRecord::default())
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("503"));
        assert!(message.contains("model artifact unavailable: not found"));
    }

    #[tokio::test]
    async fn test_schema_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/schema")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"schema":{"name":"car-features","version":1},"controls":[
                    {"field":"Brand","label":"Brand","section":"car_specifications","control":"choice","options":["Toyota","Honda"]},
                    {"field":"CarAge","label":"Car Age (years)","section":"numeric_details","control":"slider","min":0.0,"max":30.0,"step":1.0},
                    {"field":"Mileage(km)","label":"Mileage (km)","section":"numeric_details","control":"number","min":0.0,"step":1.0}
                ]}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let schema: SchemaResponse = client.get("api/schema").await.unwrap();

        assert_eq!(schema.schema, SchemaRef::current());
        assert_eq!(schema.controls.len(), 3);
        assert_eq!(schema.controls[0].options.as_ref().unwrap().len(), 2);
        assert_eq!(schema.controls[1].max, Some(30.0));
        assert_eq!(schema.controls[2].max, None);
    }

    #[tokio::test]
    async fn test_unhealthy_service_still_reports_components() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/healthz")
            .with_status(503)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status":"unhealthy","components":{"model":{"status":"unhealthy","message":"artifact missing","last_check_timestamp":0}}}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let health = client.health().await.unwrap();

        assert_eq!(health.status, ComponentStatus::Unhealthy);
        assert_eq!(
            health.components["model"].message.as_deref(),
            Some("artifact missing")
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(ApiClient::new("not a url").is_err());
    }
}
