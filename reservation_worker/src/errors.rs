use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Could not initialize the worker. {0}")]
    InitializeError(String),
    #[error("An I/O error happened in the worker. {0}")]
    IOError(#[from] std::io::Error),
}
