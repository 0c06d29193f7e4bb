use thiserror::Error;

/// Failure taxonomy for the analysis backend contract.
///
/// `Validation` failures are resolved locally and never reach the network.
/// `Transport` and `Rejected` propagate to the UI boundary as user-visible
/// messages; neither is retried automatically.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The request was malformed and was never sent.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Network unreachable or response unparsable.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The backend returned a structured error payload; the message is
    /// surfaced verbatim.
    #[error("request rejected: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for ContractError {
    fn from(err: reqwest::Error) -> Self {
        ContractError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ContractError>;
