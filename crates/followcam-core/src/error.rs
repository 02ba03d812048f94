use thiserror::Error;

use crate::types::{CameraIndex, CameraRange};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Player '{0}' not found in match")]
    NotFound(String),

    #[error("Camera {camera} out of valid range {range}")]
    OutOfRange { camera: CameraIndex, range: CameraRange },
}
