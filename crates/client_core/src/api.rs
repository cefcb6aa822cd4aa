//! The two public survey endpoints.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    error::ApiErrorBody,
    protocol::{ApiEnvelope, SaveResponseRequest, SaveResponseResult, SurveyPayload},
};
use tracing::debug;

use crate::{
    config::{normalize_base_url, Settings},
    error::ClientError,
    link::SurveyLink,
};

const SURVEY_PATH: &str = "/v1/public/survey";
const RESPONSES_PATH: &str = "/v1/public/responses";

#[async_trait]
pub trait SurveyApi: Send + Sync {
    async fn fetch_survey(&self, link: &SurveyLink) -> Result<SurveyPayload, ClientError>;
    async fn save_response(
        &self,
        request: &SaveResponseRequest,
    ) -> Result<SaveResponseResult, ClientError>;
}

#[derive(Debug, Clone)]
pub struct HttpSurveyApi {
    http: Client,
    base_url: String,
}

impl HttpSurveyApi {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: Client::new(),
            base_url: normalize_base_url(base_url)?,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ClientError> {
        Self::new(&settings.api_base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl SurveyApi for HttpSurveyApi {
    async fn fetch_survey(&self, link: &SurveyLink) -> Result<SurveyPayload, ClientError> {
        debug!(survey_code = link.code(), "GET {SURVEY_PATH}");
        let res = self
            .http
            .get(format!("{}{SURVEY_PATH}", self.base_url))
            .query(&[("code", link.code()), ("token", link.token())])
            .send()
            .await?;
        read_envelope(res).await
    }

    async fn save_response(
        &self,
        request: &SaveResponseRequest,
    ) -> Result<SaveResponseResult, ClientError> {
        debug!(
            survey_code = %request.survey_code,
            answers = request.answers.len(),
            submit = request.is_submit(),
            "POST {RESPONSES_PATH}"
        );
        let res = self
            .http
            .post(format!("{}{RESPONSES_PATH}", self.base_url))
            .json(request)
            .send()
            .await?;
        read_envelope(res).await
    }
}

/// Non-2xx responses become [`ClientError::Api`] carrying the body's `error`
/// field when there is one. Success bodies are unwrapped from `{ data }`.
async fn read_envelope<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let status = res.status();
    let body = res.bytes().await?;
    if !status.is_success() {
        let message = serde_json::from_slice::<ApiErrorBody>(&body)
            .ok()
            .and_then(|err| err.message().map(str::to_string));
        debug!(status = status.as_u16(), ?message, "request rejected");
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }
    let envelope: ApiEnvelope<T> = serde_json::from_slice(&body)?;
    Ok(envelope.data)
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
