use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvoError {
    #[error("{name} environment variable is required")]
    MissingEnv { name: &'static str },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start query program {program}: {source}")]
    QuerySpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("query program failed ({status}): {stderr}")]
    QueryFailed { status: String, stderr: String },

    #[error("query program {program} produced non-UTF-8 output")]
    NonUtf8Output { program: String },
}

pub type Result<T> = std::result::Result<T, ConvoError>;
