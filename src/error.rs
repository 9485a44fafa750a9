use thiserror::Error;

/// Failures of the terminal front end. The simulation itself has no error paths.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not start logging: {0}")]
    Logger(String),
}

pub type Result<T> = std::result::Result<T, GameError>;
