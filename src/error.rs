use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuditError>;

/// Failures that end an audit request, plus the client-side rejections that
/// keep a request from being issued at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    /// Empty or missing URL; never reaches the analysis service
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A submission arrived while a request is still in flight
    #[error("An audit is already in progress")]
    Busy,

    /// The request could not be completed or the response was unusable
    #[error("Request failed: {0}")]
    Transport(String),

    /// The service answered with a structured `{ "error": ... }` payload
    #[error("{0}")]
    Service(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl AuditError {
    /// Text shown to the user when a request ends in `Failed`.
    ///
    /// Service messages are surfaced verbatim; everything else falls back to
    /// the generic description carried by the variant.
    pub fn user_message(&self) -> String {
        match self {
            AuditError::Service(message) => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, AuditError::Transport(_))
    }
}

impl From<reqwest::Error> for AuditError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AuditError::Transport(format!("timed out: {}", err))
        } else if err.is_decode() {
            AuditError::Transport(format!("malformed response: {}", err))
        } else {
            AuditError::Transport(err.to_string())
        }
    }
}

impl From<std::io::Error> for AuditError {
    fn from(err: std::io::Error) -> Self {
        AuditError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_message_is_verbatim() {
        let err = AuditError::Service("Invalid URL".to_string());
        assert_eq!(err.user_message(), "Invalid URL");
    }

    #[test]
    fn transport_message_is_generic() {
        let err = AuditError::Transport("connection refused".to_string());
        assert_eq!(err.user_message(), "Request failed: connection refused");
        assert!(err.is_transport());
    }
}
