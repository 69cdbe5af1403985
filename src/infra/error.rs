use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("credential store error at `{path}`: {source}")]
    TokenStore {
        path: String,
        source: std::io::Error,
    },
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

impl InfraError {
    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}
