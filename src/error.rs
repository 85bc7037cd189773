#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    MissingVar(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("permission store request failed: {0}")]
    Request(String),
}

#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
