//! Analysis service client
//!
//! Two endpoints: a multipart upload taking the six role-keyed files, and a
//! prediction query taking the six original file names. Any transport error,
//! non-success status or undecodable body is a `NetworkFailure`.

use crate::error::{IntakeError, IntakeResult};
use crate::models::{NamedBlob, Prediction, RoleNames, UploadAck, UploadForm};
use async_trait::async_trait;
use eegi_common::config::ServiceConfig;
use reqwest::multipart::{Form, Part};

const USER_AGENT: &str = concat!("eegi-intake/", env!("CARGO_PKG_VERSION"));

/// Remote analysis service
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Send the six role-assigned files in one request
    async fn upload(&self, form: &UploadForm) -> IntakeResult<UploadAck>;

    /// Request a prediction for previously uploaded files, by name
    async fn predict(&self, names: &RoleNames) -> IntakeResult<Prediction>;
}

/// HTTP implementation of `AnalysisService`
pub struct HttpAnalysisClient {
    http_client: reqwest::Client,
    upload_url: String,
    predict_url: String,
}

impl HttpAnalysisClient {
    pub fn new(config: &ServiceConfig) -> IntakeResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| IntakeError::NetworkFailure(e.to_string()))?;

        Ok(Self {
            http_client,
            upload_url: config.upload_url(),
            predict_url: config.predict_url(),
        })
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisClient {
    async fn upload(&self, form: &UploadForm) -> IntakeResult<UploadAck> {
        let mut multipart = Form::new();
        for (role, file) in form.parts() {
            let part = Part::bytes(file.content().to_vec()).file_name(file.name().to_string());
            multipart = multipart.part(role.key(), part);
        }

        tracing::debug!(
            url = %self.upload_url,
            bytes = form.total_bytes(),
            "Uploading recording files"
        );

        let response = self
            .http_client
            .post(&self.upload_url)
            .multipart(multipart)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IntakeError::NetworkFailure(format!(
                "upload returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let ack: UploadAck = response
            .json()
            .await
            .map_err(|e| IntakeError::NetworkFailure(format!("unexpected upload response: {}", e)))?;

        tracing::info!(file_paths = ?ack.file_paths, "Files uploaded successfully");
        Ok(ack)
    }

    async fn predict(&self, names: &RoleNames) -> IntakeResult<Prediction> {
        tracing::debug!(url = %self.predict_url, "Requesting prediction");

        let response = self
            .http_client
            .get(&self.predict_url)
            .query(&names.query_pairs())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IntakeError::NetworkFailure(format!(
                "predict returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let payload: serde_json::Value = response.json().await.map_err(|e| {
            IntakeError::NetworkFailure(format!("unexpected prediction response: {}", e))
        })?;

        let prediction = Prediction(payload);
        tracing::info!(prediction = ?prediction.label(), "Prediction received");
        Ok(prediction)
    }
}
