use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("Connection has been disposed.")]
    Disposed,
    #[error("Reactor owning the connection has been dropped.")]
    ReactorDropped,
}
