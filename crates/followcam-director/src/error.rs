use thiserror::Error;

use followcam_core::{CameraIndex, CameraRange, ResolveError};
use followcam_integration::ApiError;

#[derive(Debug, Error)]
pub enum DirectorError {
    /// Target is not in the current match
    #[error("Player '{0}' not found in match")]
    NotFound(String),

    /// The game could not be reached or returned garbage
    #[error("Game unavailable: {0}")]
    Unavailable(#[from] ApiError),

    #[error("Camera {camera} out of valid range {range}")]
    OutOfRange { camera: CameraIndex, range: CameraRange },

    #[error("Already following {0}")]
    AlreadyRunning(String),

    #[error("Set a player first")]
    NoTarget,

    #[error("Please enter a player name")]
    EmptyName,

    #[error("Failed to switch to camera {camera}: {source}")]
    SwitchFailed { camera: CameraIndex, source: ApiError },
}

impl From<ResolveError> for DirectorError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound(name) => DirectorError::NotFound(name),
            ResolveError::OutOfRange { camera, range } => DirectorError::OutOfRange { camera, range },
        }
    }
}

impl DirectorError {
    /// Whether the failure was the game being unreachable, as opposed to
    /// something about the target or the request
    pub fn is_unavailable(&self) -> bool {
        match self {
            DirectorError::Unavailable(e) | DirectorError::SwitchFailed { source: e, .. } => {
                e.is_unavailable()
            }
            _ => false,
        }
    }
}
