use std::io;
use std::process::ExitStatus;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures that end a run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("input is not valid base64")]
    Decode(#[from] base64::DecodeError),

    #[error("decoded data is not a readable zip archive")]
    Archive(#[from] zip::result::ZipError),

    #[error("failed to read archive entry {name:?}")]
    Entry { name: String, source: io::Error },

    #[error("{context}")]
    Io {
        context: String,
        source: io::Error,
    },

    #[error("failed to serialize json")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }
}

/// Failures to hand the json file to a viewer. These never end a run.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("failed to start `{program}`")]
    Spawn { program: String, source: io::Error },

    #[error("`{program}` exited with {status}")]
    Status { program: String, status: ExitStatus },
}
