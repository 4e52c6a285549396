//! Playback Context - Errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    #[error("音量必须在 0.0 到 1.0 之间: {0}")]
    InvalidVolume(f64),
}
