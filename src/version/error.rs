use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Repository database not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to store repository database: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("No mirror URL found")]
    NoUrlFound,

    #[error("Failed to read mirror list: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Package query command not found: {0}")]
    SourceMissing(String),

    #[error("Package query failed with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
