use serde::{Deserialize, Serialize};

use followcam_core::{CameraIndex, MatchState, Player, Team, UiFlag};

/// Response from `GET /session`. Only the roster is read; the game sends
/// far more (disc, scores, clock) which is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionResponse {
    #[serde(default)]
    pub teams: Vec<SessionTeam>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTeam {
    #[serde(default = "unknown")]
    pub team: String,
    /// Absent when the team is empty
    #[serde(default)]
    pub players: Vec<SessionPlayer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPlayer {
    #[serde(default = "unknown")]
    pub name: String,
}

fn unknown() -> String {
    "Unknown".to_string()
}

impl From<SessionResponse> for MatchState {
    fn from(session: SessionResponse) -> Self {
        MatchState::new(
            session
                .teams
                .into_iter()
                .map(|t| Team {
                    name: t.team,
                    players: t.players.into_iter().map(|p| Player::new(p.name)).collect(),
                })
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    Pov,
}

/// Request body for `POST /camera_mode`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraModeRequest {
    pub mode: CameraMode,
    pub num: CameraIndex,
}

impl CameraModeRequest {
    pub fn pov(camera: CameraIndex) -> Self {
        Self {
            mode: CameraMode::Pov,
            num: camera,
        }
    }
}

/// Request body for the overlay toggle routes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityRequest {
    pub visible: bool,
}

impl VisibilityRequest {
    /// Body for a flag whose "enabled" state is `enabled`.
    /// Visibility routes take the inverse; the mute route takes it as-is.
    pub fn for_flag(flag: UiFlag, enabled: bool) -> Self {
        let visible = match flag {
            UiFlag::EnemyTeamMute => enabled,
            _ => !enabled,
        };
        Self { visible }
    }
}

/// Route for an overlay toggle
pub fn ui_flag_route(flag: UiFlag) -> &'static str {
    match flag {
        UiFlag::Interface => "ui_visibility",
        UiFlag::Nameplates => "nameplates_visibility",
        UiFlag::Minimap => "minimap_visibility",
        UiFlag::EnemyTeamMute => "enemy_team_muted",
    }
}
