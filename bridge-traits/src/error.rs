use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Network operation failed: {0}")]
    Network(String),

    #[error("Bytes are not decodable audio: {0}")]
    Undecodable(String),

    #[error("Audio device rejected the request: {0}")]
    Device(String),

    #[error("Unknown playback session: {0}")]
    UnknownSession(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
