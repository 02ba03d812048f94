//! Core types for match state and spectator cameras

use std::fmt;

use serde::{Deserialize, Serialize};

/// A player in the current match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub name: String,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Case-insensitive name comparison
    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// A team and its players, in the order the game reports them
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Team {
    /// Team identifier as reported by the game (e.g. "ORANGE TEAM")
    pub name: String,
    pub players: Vec<Player>,
}

impl Team {
    pub fn new<I, S>(name: impl Into<String>, players: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            players: players.into_iter().map(Player::new).collect(),
        }
    }

    /// The side this team plays on, if it has one
    pub fn side(&self) -> Option<TeamSide> {
        TeamSide::from_team_name(&self.name)
    }
}

/// Snapshot of the match, refreshed on every read
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchState {
    pub teams: Vec<Team>,
}

impl MatchState {
    pub fn new(teams: Vec<Team>) -> Self {
        Self { teams }
    }

    /// Total number of players across all teams
    pub fn player_count(&self) -> usize {
        self.teams.iter().map(|t| t.players.len()).sum()
    }
}

/// One of the two playing sides. Each side owns a block of POV cameras.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeamSide {
    Orange,
    Blue,
}

impl TeamSide {
    /// Number of POV cameras per side
    pub const CAMERAS_PER_SIDE: i32 = 4;

    /// Match a team identifier against the side tokens.
    /// Spectators and unknown teams have no side.
    pub fn from_team_name(name: &str) -> Option<Self> {
        let upper = name.to_uppercase();
        if upper.contains("ORANGE") {
            Some(TeamSide::Orange)
        } else if upper.contains("BLUE") {
            Some(TeamSide::Blue)
        } else {
            None
        }
    }

    /// Camera index of the first player on this side
    pub fn camera_base(&self) -> i32 {
        match self {
            TeamSide::Orange => 1,
            TeamSide::Blue => 6,
        }
    }

    /// The contiguous range of cameras that belong to this side
    pub fn camera_range(&self) -> CameraRange {
        let start = self.camera_base();
        CameraRange::new(
            CameraIndex(start),
            CameraIndex(start + Self::CAMERAS_PER_SIDE - 1),
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            TeamSide::Orange => "Orange",
            TeamSide::Blue => "Blue",
        }
    }
}

impl fmt::Display for TeamSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Handle the game's control API uses to select a POV feed.
///
/// Signed so that a correction can push it out of range; range checks
/// happen against [`CameraRange`] before the index is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CameraIndex(pub i32);

impl CameraIndex {
    pub fn get(&self) -> i32 {
        self.0
    }

    /// Shift by a signed offset. Saturates at the `i32` limits, which lie
    /// outside every camera range.
    pub fn offset(&self, delta: i32) -> Self {
        CameraIndex(self.0.saturating_add(delta))
    }
}

impl fmt::Display for CameraIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Inclusive range of valid camera indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraRange {
    pub start: CameraIndex,
    pub end: CameraIndex,
}

impl CameraRange {
    pub fn new(start: CameraIndex, end: CameraIndex) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, camera: CameraIndex) -> bool {
        camera >= self.start && camera <= self.end
    }
}

impl fmt::Display for CameraRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// The player being followed and the corrected camera currently applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowSession {
    pub target: String,
    pub camera: CameraIndex,
    /// Valid cameras for the target's side at the time of resolution
    pub range: CameraRange,
}

impl FollowSession {
    pub fn new(target: impl Into<String>, camera: CameraIndex, range: CameraRange) -> Self {
        Self {
            target: target.into(),
            camera,
            range,
        }
    }

    /// Whether the applied camera is within the target's side
    pub fn is_in_range(&self) -> bool {
        self.range.contains(self.camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_from_team_name() {
        assert_eq!(TeamSide::from_team_name("ORANGE TEAM"), Some(TeamSide::Orange));
        assert_eq!(TeamSide::from_team_name("orange"), Some(TeamSide::Orange));
        assert_eq!(TeamSide::from_team_name("BLUE TEAM"), Some(TeamSide::Blue));
        assert_eq!(TeamSide::from_team_name("SPECTATORS"), None);
        assert_eq!(TeamSide::from_team_name(""), None);
    }

    #[test]
    fn test_camera_ranges() {
        let orange = TeamSide::Orange.camera_range();
        assert_eq!(orange.start, CameraIndex(1));
        assert_eq!(orange.end, CameraIndex(4));
        assert!(orange.contains(CameraIndex(1)));
        assert!(orange.contains(CameraIndex(4)));
        assert!(!orange.contains(CameraIndex(0)));
        assert!(!orange.contains(CameraIndex(5)));

        let blue = TeamSide::Blue.camera_range();
        assert!(blue.contains(CameraIndex(6)));
        assert!(blue.contains(CameraIndex(9)));
        assert!(!blue.contains(CameraIndex(5)));
        assert!(!blue.contains(CameraIndex(10)));
    }

    #[test]
    fn test_player_name_matching() {
        let player = Player::new("NovaStar");
        assert!(player.is_named("novastar"));
        assert!(player.is_named("NOVASTAR"));
        assert!(!player.is_named("nova"));
    }

    #[test]
    fn test_follow_session_range() {
        let range = TeamSide::Blue.camera_range();
        assert!(FollowSession::new("C", CameraIndex(7), range).is_in_range());
        assert!(!FollowSession::new("C", CameraIndex(3), range).is_in_range());
    }

    #[test]
    fn test_camera_offset_saturates() {
        assert_eq!(CameraIndex(7).offset(-2), CameraIndex(5));
        assert_eq!(CameraIndex(1).offset(i32::MAX), CameraIndex(i32::MAX));
        assert_eq!(CameraIndex(-1).offset(i32::MIN), CameraIndex(i32::MIN));
        assert!(!TeamSide::Orange.camera_range().contains(CameraIndex(1).offset(i32::MAX)));
    }

    #[test]
    fn test_match_state_player_count() {
        let state = MatchState::new(vec![
            Team::new("ORANGE", ["A", "B"]),
            Team::new("BLUE", ["C"]),
            Team::new("SPECTATORS", Vec::<String>::new()),
        ]);
        assert_eq!(state.player_count(), 3);
    }
}
