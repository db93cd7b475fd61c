// crates/clipsqueeze-core/src/error.rs

use thiserror::Error;

use crate::state::{MSG_FAILED, MSG_READ_ERROR, MSG_WRITE_ERROR};

#[derive(Debug, Error)]
pub enum CompressError {
    /// Copying the picked file into the staging directory failed.
    #[error("could not write staged copy: {0}")]
    WriteFailure(String),

    /// Reading size or stream info of the original or compressed file failed.
    #[error("could not read media: {0}")]
    ReadFailure(String),

    /// The export session finished with a failed status.
    #[error("export failed: {0}")]
    ExportFailure(String),

    /// An export is already in flight on this controller.
    #[error("an export is already running")]
    Busy,

    #[error("invalid export profile: {0}")]
    InvalidProfile(String),

    #[error("config: {0}")]
    Config(String),
}

impl CompressError {
    /// The fixed, user-facing label text for errors that end a request.
    /// `None` for errors that never reach the presentation state.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            CompressError::WriteFailure(_)  => Some(MSG_WRITE_ERROR),
            CompressError::ReadFailure(_)   => Some(MSG_READ_ERROR),
            CompressError::ExportFailure(_) => Some(MSG_FAILED),
            CompressError::Busy
            | CompressError::InvalidProfile(_)
            | CompressError::Config(_)      => None,
        }
    }
}
