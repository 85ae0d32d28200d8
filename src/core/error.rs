use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorldlineError {
    #[error("Duplicate phase id: {0}")]
    DuplicatePhaseId(String),

    #[error("Phase '{id}' has a non-finite order value: {order}")]
    InvalidPhaseOrder { id: String, order: f64 },

    #[error("Structural error: {0}")]
    Structural(String),

    #[error("Phase execution failed: {0}")]
    PhaseExecution(String),

    #[error("Invalid scenario: {0}")]
    Scenario(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Scenario parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, WorldlineError>;
