use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoachError {
    #[error("decision is locked")]
    Locked,

    #[error("choose a direction before locking in")]
    NoDirection,

    #[error("outcome can only be changed in demo mode")]
    NotDemoMode,

    #[error("nothing to submit: outcome not revealed yet")]
    NoCommitment,

    #[error("commitment already submitted")]
    AlreadySubmitted,

    #[error("submission already in flight")]
    SubmissionInFlight,

    #[error("connect a wallet before submitting in live mode")]
    WalletNotConnected,

    #[error("invalid direction '{0}': expected 'up' or 'down'")]
    InvalidDirection(String),

    #[error("invalid commitment input: {0}")]
    Encoding(String),

    #[error("contract write failed: {0}")]
    Wallet(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoachError>;
