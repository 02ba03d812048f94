//! Persisted spectator configuration
//!
//! Pure data: reading and writing the document lives with the binary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::corrections::CorrectionMap;

/// Everything that survives between sessions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectatorConfig {
    /// Learned per-player camera offsets
    pub corrections: CorrectionMap,
    /// Last player name the user followed
    pub last_username: String,
    #[serde(flatten)]
    pub ui: UiSettings,
}

/// Spectator overlay toggles, as the user last set them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    #[serde(alias = "ui_visibility")]
    pub hide_ui: bool,
    #[serde(alias = "nameplates_visibility")]
    pub hide_nameplates: bool,
    #[serde(alias = "minimap_visibility")]
    pub hide_minimap: bool,
    #[serde(alias = "enemy_team_muted")]
    pub mute_enemy_team: bool,
}

impl UiSettings {
    pub fn get(&self, flag: UiFlag) -> bool {
        match flag {
            UiFlag::Interface => self.hide_ui,
            UiFlag::Nameplates => self.hide_nameplates,
            UiFlag::Minimap => self.hide_minimap,
            UiFlag::EnemyTeamMute => self.mute_enemy_team,
        }
    }

    pub fn set(&mut self, flag: UiFlag, enabled: bool) {
        match flag {
            UiFlag::Interface => self.hide_ui = enabled,
            UiFlag::Nameplates => self.hide_nameplates = enabled,
            UiFlag::Minimap => self.hide_minimap = enabled,
            UiFlag::EnemyTeamMute => self.mute_enemy_team = enabled,
        }
    }
}

/// The four independent overlay toggles the game exposes.
///
/// "Enabled" means hidden for the three visibility flags and muted for
/// [`UiFlag::EnemyTeamMute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiFlag {
    Interface,
    Nameplates,
    Minimap,
    EnemyTeamMute,
}

impl UiFlag {
    pub const ALL: [UiFlag; 4] = [
        UiFlag::Interface,
        UiFlag::Nameplates,
        UiFlag::Minimap,
        UiFlag::EnemyTeamMute,
    ];

    /// Short name used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            UiFlag::Interface => "ui",
            UiFlag::Nameplates => "nameplates",
            UiFlag::Minimap => "minimap",
            UiFlag::EnemyTeamMute => "mute",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            UiFlag::Interface => "Hide UI",
            UiFlag::Nameplates => "Hide nameplates",
            UiFlag::Minimap => "Hide minimap",
            UiFlag::EnemyTeamMute => "Mute enemy team",
        }
    }
}

impl fmt::Display for UiFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UiFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ui" | "interface" => Ok(UiFlag::Interface),
            "nameplates" | "names" => Ok(UiFlag::Nameplates),
            "minimap" | "map" => Ok(UiFlag::Minimap),
            "mute" | "enemy-mute" | "enemy_team_muted" => Ok(UiFlag::EnemyTeamMute),
            other => Err(format!(
                "unknown UI flag '{}' (expected ui, nameplates, minimap or mute)",
                other
            )),
        }
    }
}
