use connect4::SuggestionFailure;

/// Error type for one exchange with a [`MoveSource`](crate::MoveSource).
#[derive(Debug)]
pub enum SourceError {
    /// Reading from or writing to the source failed.
    Io(std::io::Error),
    Http(reqwest::Error),
    /// The suggestion service answered with an error status.
    Status { status: u16, body: String },
    /// The answer was not the expected JSON.
    Json(serde_json::Error),
    /// The bot process closed its output.
    ProcessExited,
    /// The human's input stream ended.
    InputClosed,
}

impl SourceError {
    /// How the controller should see this error when it ends an automated
    /// attempt.
    pub fn to_failure(&self) -> SuggestionFailure {
        match self {
            SourceError::Json(err) => SuggestionFailure::Malformed(err.to_string()),
            SourceError::Http(err) if err.is_decode() => {
                SuggestionFailure::Malformed(err.to_string())
            }
            SourceError::Http(err) if err.is_timeout() => SuggestionFailure::Timeout,
            _ => SuggestionFailure::Transport(self.to_string()),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Io(err) => Some(err),
            SourceError::Http(err) => Some(err),
            SourceError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Io(err) => write!(f, "I/O error: {}", err),
            SourceError::Http(err) => write!(f, "HTTP error: {}", err),
            SourceError::Status { status, body } => {
                write!(f, "The service answered with status {}: {}", status, body)
            }
            SourceError::Json(err) => write!(f, "Invalid JSON: {}", err),
            SourceError::ProcessExited => write!(f, "The bot process closed its output"),
            SourceError::InputClosed => write!(f, "The input was closed"),
        }
    }
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::Io(err)
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Http(err)
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Json(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_errors_are_malformed_answers() {
        let err = serde_json::from_str::<connect4::SuggestionResponse>("{").unwrap_err();
        assert!(matches!(
            SourceError::from(err).to_failure(),
            SuggestionFailure::Malformed(_)
        ));
    }

    #[test]
    fn everything_else_is_a_transport_failure() {
        assert_eq!(
            SourceError::ProcessExited.to_failure(),
            SuggestionFailure::Transport(String::from("The bot process closed its output"))
        );
        let status = SourceError::Status {
            status: 400,
            body: String::from("nope"),
        };
        assert!(matches!(status.to_failure(), SuggestionFailure::Transport(_)));
    }
}
