use std::io;

/// Errors raised while manipulating a reactor
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Resolution error: {0}")]
    Resolution(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Problem running script {script}: {source}")]
    Script {
        script: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Manipulation(String),

    #[error("Caught runtime exception: {0}")]
    Internal(String),
}

/// Result type alias for manipulation operations
pub type Result<T> = std::result::Result<T, Error>;
