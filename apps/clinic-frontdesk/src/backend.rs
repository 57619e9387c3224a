//! Cliente HTTP do backend de registros
//!
//! Usado pelo painel da equipe e pela visualização da receita. Cada chamada
//! é uma única requisição, sem novas tentativas.

use std::time::Duration;

use clinic_core::models::ConsultationRecord;
use reqwest::{StatusCode, Url};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("URL base do backend inválida: {0}")]
    InvalidBaseUrl(String),
    #[error("Falha na requisição ao backend: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Backend respondeu com status {0}")]
    Status(StatusCode),
}

impl BackendError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::Status(StatusCode::NOT_FOUND))
    }
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url).map_err(|_| BackendError::InvalidBaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidBaseUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, BackendError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }
        Ok(response.json::<T>().await?)
    }

    /// `GET /api/consultations`
    pub async fn list_consultations(&self) -> Result<Vec<ConsultationRecord>, BackendError> {
        let url = self.endpoint(&["api", "consultations"])?;
        self.get_json(url).await
    }

    /// `GET /api/prescription/{token}`
    pub async fn fetch_prescription(&self, token: &str) -> Result<ConsultationRecord, BackendError> {
        let url = self.endpoint(&["api", "prescription", token])?;
        self.get_json(url).await
    }
}
