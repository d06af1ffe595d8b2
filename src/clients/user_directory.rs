//! Client for the user directory service.
//!
//! The order workflow only needs to know whether a user exists and what its
//! current display attributes are. Transport failures are reported as
//! [`DirectoryError`] and are never folded into "unknown user".

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{dto::users::ValidateUserResponse, models::UserSnapshot, response::ApiResponse};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("user directory request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("user directory answered with status {0}")]
    Status(StatusCode),

    #[error("malformed user directory response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `Ok(None)` means the directory explicitly reported the user as unknown.
    async fn validate_user(&self, user_id: i32) -> Result<Option<UserSnapshot>, DirectoryError>;

    async fn get_user(&self, user_id: i32) -> Result<Option<UserSnapshot>, DirectoryError>;
}

/// HTTP adapter over the directory's JSON API.
///
/// The underlying `reqwest::Client` keeps its connections alive and is shared
/// by every request; dropping the adapter releases them. Only connection
/// establishment is bounded here: the per-call deadline belongs to the caller,
/// whose future is dropped when the inbound request times out or goes away.
#[derive(Debug, Clone)]
pub struct HttpUserDirectory {
    client: Client,
    base_url: String,
}

impl HttpUserDirectory {
    pub fn new(base_url: &str, connect_timeout: Duration) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(1)
            .build()?;
        tracing::info!(%base_url, ?connect_timeout, "user directory client ready");
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<(StatusCode, Option<ApiResponse<T>>), DirectoryError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok((status, None));
        }
        if !status.is_success() {
            return Err(DirectoryError::Status(status));
        }
        let body = response
            .json::<ApiResponse<T>>()
            .await
            .map_err(|err| DirectoryError::Malformed(err.to_string()))?;
        Ok((status, Some(body)))
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn validate_user(&self, user_id: i32) -> Result<Option<UserSnapshot>, DirectoryError> {
        tracing::debug!(user_id, "validating user");
        let (status, body) = self
            .get_json::<ValidateUserResponse>(&format!("api/users/{user_id}/validate"))
            .await?;
        // The validate endpoint answers unknown users with a body, so a bare
        // 404 means the route itself is missing.
        let body = body.ok_or(DirectoryError::Status(status))?;
        let data = body
            .data
            .ok_or_else(|| DirectoryError::Malformed("validate response without data".into()))?;

        match (data.is_valid, data.user) {
            (true, Some(user)) => Ok(Some(user)),
            (true, None) => Err(DirectoryError::Malformed(
                "valid user reported without attributes".into(),
            )),
            (false, _) => Ok(None),
        }
    }

    async fn get_user(&self, user_id: i32) -> Result<Option<UserSnapshot>, DirectoryError> {
        tracing::debug!(user_id, "fetching user");
        let (_, body) = self
            .get_json::<UserSnapshot>(&format!("api/users/{user_id}"))
            .await?;
        match body {
            None => Ok(None),
            Some(body) => body
                .data
                .map(Some)
                .ok_or_else(|| DirectoryError::Malformed("user response without data".into())),
        }
    }
}
