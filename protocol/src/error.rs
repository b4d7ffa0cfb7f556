use seqmaster_core::RequestFailure;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The service answered with an `error` field.
    #[error("{0}")]
    Server(String),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<ProtocolError> for RequestFailure {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Server(message) => Self::Validation(message),
            ProtocolError::Status(code) => Self::Network(format!("HTTP status {code}")),
            ProtocolError::Malformed(_) => Self::Network("malformed response".into()),
        }
    }
}
