//! Application facade
//!
//! Owns the tokio runtime, the game API client, the settings document, and
//! the follower. Every operation the interactive surface exposes goes
//! through here.

use std::fmt;
use std::sync::mpsc;
use std::sync::Arc;

use anyhow::Context;
use parking_lot::RwLock;
use tracing::{info, warn};

use followcam_core::{
    camera_map, resolve, CameraAssignment, CameraIndex, FollowSession, UiFlag, UiSettings,
};
use followcam_director::{
    DirectorError, FollowEvent, FollowState, Follower, FollowerConfig, SharedCorrections,
};
use followcam_integration::{ApiError, GameApi};

use crate::settings::Settings;

/// Result of pointing the camera at a new target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetStatus {
    pub player: String,
    /// Camera actually applied
    pub camera: CameraIndex,
    /// Camera the resolver suggested before correction
    pub suggested: CameraIndex,
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.camera != self.suggested {
            write!(
                f,
                "Switched to {} on camera {} (corrected from {})",
                self.player, self.camera, self.suggested
            )
        } else {
            write!(f, "Switched to {} on camera {}", self.player, self.camera)
        }
    }
}

/// Snapshot for the status display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowStatus {
    pub target: Option<String>,
    pub camera: Option<CameraIndex>,
    pub state: FollowState,
}

impl fmt::Display for FollowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let camera = self
            .camera
            .map(|c| c.to_string())
            .unwrap_or_else(|| "--".to_string());
        match (&self.target, self.state) {
            (None, _) => write!(f, "No target set (camera {})", camera),
            (Some(target), FollowState::Running) => {
                write!(f, "Following {} on camera {}", target, camera)
            }
            (Some(target), FollowState::Stopped) => {
                write!(f, "Stopped, target {} on camera {}", target, camera)
            }
        }
    }
}

pub struct SpectatorApp<A: GameApi + 'static> {
    runtime: tokio::runtime::Runtime,
    api: Arc<A>,
    settings: Settings,
    corrections: SharedCorrections,
    follower: Follower<A>,
    /// Last known session. While a follow run is active the follower holds
    /// the authoritative copy.
    target: Option<FollowSession>,
    follower_active: bool,
}

impl<A: GameApi + 'static> SpectatorApp<A> {
    pub fn new(api: A, settings: Settings, follower_config: FollowerConfig) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("followcam-worker")
            .enable_all()
            .build()
            .context("Failed to create runtime")?;

        let api = Arc::new(api);
        let corrections = Arc::new(RwLock::new(settings.config.corrections.clone()));
        let follower = Follower::new(
            Arc::clone(&api),
            Arc::clone(&corrections),
            follower_config,
            runtime.handle().clone(),
        );

        Ok(Self {
            runtime,
            api,
            settings,
            corrections,
            follower,
            target: None,
            follower_active: false,
        })
    }

    /// Receive follower events (status lines for the display)
    pub fn subscribe(&mut self) -> mpsc::Receiver<FollowEvent> {
        self.follower.subscribe()
    }

    pub fn last_username(&self) -> &str {
        &self.settings.config.last_username
    }

    pub fn ui_settings(&self) -> UiSettings {
        self.settings.config.ui
    }

    /// Stored corrections, sorted by player
    pub fn corrections(&self) -> Vec<(String, i32)> {
        self.corrections
            .read()
            .iter()
            .map(|(name, offset)| (name.to_string(), offset))
            .collect()
    }

    /// Resolve a player, switch to their camera, and start following
    pub fn set_target(&mut self, player: &str) -> Result<TargetStatus, DirectorError> {
        let player = player.trim();
        if player.is_empty() {
            return Err(DirectorError::EmptyName);
        }

        self.stop_following();
        self.target = None;

        self.settings.config.last_username = player.to_string();
        self.persist();

        let state = self.runtime.block_on(self.api.get_match_state())?;
        let resolution = resolve(&state, player)?;
        let camera = self.corrections.read().apply(player, resolution.camera);
        let range = resolution.range();
        if !range.contains(camera) {
            return Err(DirectorError::OutOfRange { camera, range });
        }

        self.target = Some(FollowSession::new(player, camera, range));
        self.runtime
            .block_on(self.api.set_camera(camera))
            .map_err(|source| DirectorError::SwitchFailed { camera, source })?;

        let status = TargetStatus {
            player: player.to_string(),
            camera,
            suggested: resolution.camera,
        };
        info!("{}", status);

        self.start_following()?;
        Ok(status)
    }

    /// Nudge the camera by `delta` and remember the nudge as the player's
    /// correction
    pub fn adjust_camera(&mut self, delta: i32) -> Result<CameraIndex, DirectorError> {
        self.sync_target();
        let session = self.target.clone().ok_or(DirectorError::NoTarget)?;
        let desired = session.camera.offset(delta);

        let state = self.runtime.block_on(self.api.get_match_state())?;
        let resolution = resolve(&state, &session.target)?;
        let range = resolution.range();
        if !range.contains(desired) {
            return Err(DirectorError::OutOfRange {
                camera: desired,
                range,
            });
        }

        self.runtime
            .block_on(self.api.set_camera(desired))
            .map_err(|source| DirectorError::SwitchFailed {
                camera: desired,
                source,
            })?;

        // The game is now on `desired`; adopt it before anything else
        let updated = FollowSession::new(session.target, desired, range);
        self.target = Some(updated.clone());
        self.learn_correction(&updated.target, desired, resolution.camera);

        if self.follower.is_running() && self.follower.retarget(desired).is_err() {
            // Player changed sides since the run started
            self.follower.stop();
            self.follower.start(updated)?;
        }

        info!("Camera adjusted to {} (saved)", desired);
        Ok(desired)
    }

    /// Learn `desired` as the right camera for `player` against the live
    /// suggestion, persist it, and return the effective camera
    pub fn record_correction(
        &mut self,
        player: &str,
        desired: CameraIndex,
    ) -> Result<CameraIndex, DirectorError> {
        let state = self.runtime.block_on(self.api.get_match_state())?;
        let resolution = resolve(&state, player)?;
        self.learn_correction(player, desired, resolution.camera);
        Ok(self.corrections.read().apply(player, resolution.camera))
    }

    fn learn_correction(&mut self, player: &str, desired: CameraIndex, suggested: CameraIndex) {
        let offset = self.corrections.write().record(player, desired, suggested);
        info!("Saved correction {:+} for {}", offset, player);
        self.persist();
    }

    /// Start following the current target
    pub fn start_following(&mut self) -> Result<(), DirectorError> {
        self.sync_target();
        let session = self.target.clone().ok_or(DirectorError::NoTarget)?;
        self.follower.start(session)?;
        self.follower_active = true;
        Ok(())
    }

    pub fn stop_following(&mut self) {
        self.follower.stop();
        self.sync_target();
    }

    pub fn status(&mut self) -> FollowStatus {
        self.sync_target();
        FollowStatus {
            target: self.target.as_ref().map(|s| s.target.clone()),
            camera: self.target.as_ref().map(|s| s.camera),
            state: self.follower.state(),
        }
    }

    /// Pull the follower's copy of the session, which may have been
    /// re-resolved in the background
    fn sync_target(&mut self) {
        if !self.follower_active {
            return;
        }
        if let Some(session) = self.follower.session() {
            self.target = Some(session);
        }
        if !self.follower.is_running() {
            self.follower_active = false;
        }
    }

    /// Send one overlay toggle; the setting is saved only if the game
    /// accepted it
    pub fn set_ui_flag(&mut self, flag: UiFlag, enabled: bool) -> Result<(), DirectorError> {
        self.runtime
            .block_on(self.api.set_ui_flag(flag, enabled))?;
        self.settings.config.ui.set(flag, enabled);
        self.persist();
        Ok(())
    }

    /// Push every saved overlay toggle to the game. Returns the ones that
    /// failed.
    pub fn apply_ui_settings(&self) -> Vec<(UiFlag, ApiError)> {
        let ui = self.settings.config.ui;
        UiFlag::ALL
            .into_iter()
            .filter_map(|flag| {
                self.runtime
                    .block_on(self.api.set_ui_flag(flag, ui.get(flag)))
                    .err()
                    .map(|e| (flag, e))
            })
            .collect()
    }

    /// Current camera → player mapping from the live match
    pub fn camera_map(&self) -> Result<Vec<CameraAssignment>, DirectorError> {
        let state = self.runtime.block_on(self.api.get_match_state())?;
        Ok(camera_map(&state))
    }

    /// Stop following and save
    pub fn shutdown(&mut self) {
        self.stop_following();
        self.persist();
    }

    fn persist(&mut self) {
        self.settings.config.corrections = self.corrections.read().clone();
        if let Err(e) = self.settings.save() {
            warn!("Failed to save config: {:#}", e);
        }
    }
}
