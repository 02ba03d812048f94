//! Camera resolver
//!
//! POV cameras are assigned positionally per side: the n-th player listed on
//! the Orange team sits on camera `1 + n`, the n-th Blue player on `6 + n`.
//! Teams without a side (spectators) have no cameras.

use crate::corrections::CorrectionMap;
use crate::error::ResolveError;
use crate::types::{CameraIndex, CameraRange, MatchState, TeamSide};

/// Where a player's suggested camera sits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Camera suggested by team position, before any correction
    pub camera: CameraIndex,
    pub side: TeamSide,
}

impl Resolution {
    pub fn range(&self) -> CameraRange {
        self.side.camera_range()
    }
}

/// One entry of the full camera mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraAssignment {
    pub camera: CameraIndex,
    pub side: TeamSide,
    pub player: String,
}

/// Every camera the match state implies, in team order
pub fn camera_map(state: &MatchState) -> Vec<CameraAssignment> {
    let mut assignments = Vec::with_capacity(state.player_count());
    for team in &state.teams {
        let Some(side) = team.side() else {
            continue;
        };
        for (position, player) in team.players.iter().enumerate() {
            assignments.push(CameraAssignment {
                camera: CameraIndex(side.camera_base() + position as i32),
                side,
                player: player.name.clone(),
            });
        }
    }
    assignments
}

/// Find the suggested camera for a player (case-insensitive exact match)
pub fn resolve(state: &MatchState, player: &str) -> Result<Resolution, ResolveError> {
    for team in &state.teams {
        let Some(side) = team.side() else {
            continue;
        };
        if let Some(position) = team.players.iter().position(|p| p.is_named(player)) {
            return Ok(Resolution {
                camera: CameraIndex(side.camera_base() + position as i32),
                side,
            });
        }
    }
    Err(ResolveError::NotFound(player.to_string()))
}

/// Suggested camera shifted by the player's stored correction
pub fn apply_correction(
    corrections: &CorrectionMap,
    player: &str,
    suggested: CameraIndex,
) -> CameraIndex {
    corrections.apply(player, suggested)
}

/// Resolve, correct, and check the result against the player's side
pub fn resolve_corrected(
    state: &MatchState,
    corrections: &CorrectionMap,
    player: &str,
) -> Result<(Resolution, CameraIndex), ResolveError> {
    let resolution = resolve(state, player)?;
    let corrected = apply_correction(corrections, player, resolution.camera);
    let range = resolution.range();
    if !range.contains(corrected) {
        return Err(ResolveError::OutOfRange {
            camera: corrected,
            range,
        });
    }
    Ok((resolution, corrected))
}
