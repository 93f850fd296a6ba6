use std::time::Duration;

/// Coarse classification shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    Precondition,
    Timeout,
    Transport,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Unsupported file type: {0}")]
    Validation(String),
    #[error("A file is already active: {0}")]
    Conflict(String),
    #[error("No processed file to chat about")]
    Precondition,
    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
    #[error("HTTP {status}: {message}")]
    Transport { status: u16, message: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Invalid gateway URL: {0}")]
    InvalidUrl(String),
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Validation(_) => ErrorKind::Validation,
            GatewayError::Conflict(_) => ErrorKind::Conflict,
            GatewayError::Precondition => ErrorKind::Precondition,
            GatewayError::Timeout { .. } => ErrorKind::Timeout,
            GatewayError::Http(e) if e.is_timeout() => ErrorKind::Timeout,
            GatewayError::Transport { .. }
            | GatewayError::Http(_)
            | GatewayError::InvalidResponse(_)
            | GatewayError::InvalidUrl(_)
            | GatewayError::Io(_) => ErrorKind::Transport,
        }
    }

    /// The assistant-authored sentence appended to the transcript.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Validation(_) => {
                "Please upload an Excel file (.xlsx or .xls).".to_string()
            }
            GatewayError::Conflict(name) => format!(
                "\"{}\" is already loaded. Please delete the current file before uploading a new one.",
                name
            ),
            GatewayError::Precondition => {
                "Please upload an Excel file first so I have data to analyze.".to_string()
            }
            GatewayError::Timeout { .. } => "Request timed out. Please try again.".to_string(),
            GatewayError::Http(e) if e.is_timeout() => {
                "Request timed out. Please try again.".to_string()
            }
            GatewayError::Transport { status, message } if message.is_empty() => {
                format!("Unable to connect to Pulse: HTTP {}", status)
            }
            GatewayError::Transport { status, message } => {
                format!("Unable to connect to Pulse: HTTP {}: {}", status, message)
            }
            GatewayError::Http(e) => format!("Unable to connect to Pulse: {}", e),
            GatewayError::InvalidResponse(detail) => {
                format!("Unable to connect to Pulse: {}", detail)
            }
            GatewayError::InvalidUrl(url) => {
                format!("Unable to connect to Pulse: invalid gateway URL {}", url)
            }
            GatewayError::Io(e) => format!("Could not read the file: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(
            GatewayError::Validation("a.csv".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(GatewayError::Precondition.kind(), ErrorKind::Precondition);
        assert_eq!(
            GatewayError::InvalidResponse("no id".into()).kind(),
            ErrorKind::Transport
        );
        let timeout = GatewayError::Timeout {
            operation: "chat",
            after: Duration::from_secs(45),
        };
        assert_eq!(timeout.kind(), ErrorKind::Timeout);
        assert_eq!(timeout.to_string(), "chat timed out after 45s");
    }

    #[test]
    fn test_user_messages() {
        assert!(GatewayError::Validation("a.csv".into())
            .user_message()
            .contains(".xlsx or .xls"));
        assert!(GatewayError::Conflict("report.xlsx".into())
            .user_message()
            .contains("delete the current file"));
        assert!(GatewayError::Precondition
            .user_message()
            .contains("upload an Excel file first"));
        let transport = GatewayError::Transport {
            status: 502,
            message: "Bad Gateway".into(),
        };
        assert_eq!(
            transport.user_message(),
            "Unable to connect to Pulse: HTTP 502: Bad Gateway"
        );
    }
}
