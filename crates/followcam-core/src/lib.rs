//! followcam Core - Match model and camera resolution
//!
//! This crate provides the foundational types shared by the other crates:
//! - Match state (teams and players) as read from the game
//! - Camera indices, team sides, and the valid camera range per side
//! - The camera resolver and the per-player correction map
//! - The persisted configuration record

pub mod config;
pub mod corrections;
pub mod error;
pub mod resolver;
pub mod types;

pub use config::{SpectatorConfig, UiFlag, UiSettings};
pub use corrections::CorrectionMap;
pub use error::ResolveError;
pub use resolver::{
    apply_correction, camera_map, resolve, resolve_corrected, CameraAssignment, Resolution,
};
pub use types::{CameraIndex, CameraRange, FollowSession, MatchState, Player, Team, TeamSide};
