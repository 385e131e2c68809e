pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Trace graph JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config: {message}")]
    InvalidConfig { message: String },

    #[error("Unknown layout mode: {mode}")]
    UnknownLayoutMode { mode: String },
}
