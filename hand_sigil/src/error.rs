//! Errors that stop the application before or during the frame loop.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The window could not be created or updated.
    #[error("window error: {0}")]
    Window(#[from] minifb::Error),

    /// The LeapMotion service could not be reached.
    #[error("LeapMotion unavailable: {0}")]
    LeapUnavailable(String),

    /// The hand source thread stopped delivering frames.
    #[error("hand tracker stopped")]
    TrackerLost,

    /// Command-line values that cannot produce a usable scene.
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
