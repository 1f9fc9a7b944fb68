use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum MonitorError {
    #[error("Platform rejected subscription for sensor type {0}")]
    SubscriptionRejected(i32),

    #[error("Subscription not found: {0}")]
    UnknownSubscription(u64),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
