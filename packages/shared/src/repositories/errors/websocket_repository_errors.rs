#[derive(Debug)]
pub enum WebSocketRepositoryError {
    NotConnected(String),
    SendFailed(String),
}

impl std::fmt::Display for WebSocketRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebSocketRepositoryError::NotConnected(id) => {
                write!(f, "Connection {} is not registered", id)
            }
            WebSocketRepositoryError::SendFailed(id) => {
                write!(f, "Failed to send to connection {}", id)
            }
        }
    }
}

impl std::error::Error for WebSocketRepositoryError {}
