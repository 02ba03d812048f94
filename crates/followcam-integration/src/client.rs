use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use followcam_core::{CameraIndex, MatchState, UiFlag};

use crate::error::ApiError;
use crate::types::{ui_flag_route, CameraModeRequest, SessionResponse, VisibilityRequest};

/// Echo VR serves its control API on this port when the API is enabled
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:6721";

/// Per-request timeout. No retries happen at this layer.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Operations followcam needs from the game
#[async_trait]
pub trait GameApi: Send + Sync {
    /// Read the current roster
    async fn get_match_state(&self) -> Result<MatchState, ApiError>;

    /// Switch the spectator to a player's POV camera
    async fn set_camera(&self, camera: CameraIndex) -> Result<(), ApiError>;

    /// Set one overlay toggle
    async fn set_ui_flag(&self, flag: UiFlag, enabled: bool) -> Result<(), ApiError>;
}

/// HTTP client for the game's local control API
pub struct GameApiClient {
    client: Client,
    base_url: String,
}

impl GameApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, route: &str) -> String {
        format!("{}/{}", self.base_url, route)
    }
}

#[async_trait]
impl GameApi for GameApiClient {
    async fn get_match_state(&self) -> Result<MatchState, ApiError> {
        let response = self.client.get(self.url("session")).send().await?;
        let response = check_status(response).await?;
        let session: SessionResponse = response.json().await?;
        Ok(session.into())
    }

    async fn set_camera(&self, camera: CameraIndex) -> Result<(), ApiError> {
        debug!("POST camera_mode pov {}", camera);
        let response = self
            .client
            .post(self.url("camera_mode"))
            .json(&CameraModeRequest::pov(camera))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn set_ui_flag(&self, flag: UiFlag, enabled: bool) -> Result<(), ApiError> {
        let body = VisibilityRequest::for_flag(flag, enabled);
        debug!("POST {} visible={}", ui_flag_route(flag), body.visible);
        let response = self
            .client
            .post(self.url(ui_flag_route(flag)))
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(ApiError::ServerError {
            status: status.as_u16(),
            message: text,
        });
    }
    Ok(response)
}
