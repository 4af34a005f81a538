use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrewlineError {
    /// Rejected at construction time, before any thread is started.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("queue closed: {0}")]
    QueueClosed(String),

    #[error("failed to spawn thread: {0}")]
    Spawn(std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),
}

impl BrewlineError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        BrewlineError::InvalidConfiguration(msg.into())
    }

    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, BrewlineError::InvalidConfiguration(_))
    }
}

pub type Result<T> = std::result::Result<T, BrewlineError>;
