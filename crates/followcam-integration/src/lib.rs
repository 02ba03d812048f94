//! followcam Integration - Echo VR control API client
//!
//! Reads the match session and drives the spectator camera and overlay
//! toggles through the game's local HTTP API.

pub mod client;
pub mod error;
pub mod types;

pub use client::{GameApi, GameApiClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::ApiError;
pub use types::*;
