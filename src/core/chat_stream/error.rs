use std::error::Error;
use std::fmt;

/// Every way a chat exchange can end other than normal completion.
///
/// `MissingCredential` is returned before any request is issued.
/// `MalformedFrame` classifies a single undecodable stream frame; such frames
/// are skipped and never end a stream. The remaining variants arrive as the
/// terminal event of a [`ChatStream`](super::ChatStream).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    MissingCredential,
    Transport(String),
    Provider {
        status: Option<u16>,
        message: String,
    },
    MalformedFrame(String),
    Cancelled {
        partial: String,
    },
}

impl ChatError {
    pub fn provider(status: Option<u16>, message: impl Into<String>) -> Self {
        ChatError::Provider {
            status,
            message: message.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ChatError::Cancelled { .. })
    }

    /// Text produced before a cancellation, if this is one.
    pub fn partial_text(&self) -> Option<&str> {
        match self {
            ChatError::Cancelled { partial } => Some(partial),
            _ => None,
        }
    }
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::MissingCredential => write!(f, "API key is required"),
            ChatError::Transport(detail) => write!(f, "Connection failed: {detail}"),
            ChatError::Provider { message, .. } => write!(f, "{message}"),
            ChatError::MalformedFrame(detail) => write!(f, "Malformed stream frame: {detail}"),
            ChatError::Cancelled { .. } => write!(f, "Generation cancelled"),
        }
    }
}

impl Error for ChatError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_display_the_provider_message() {
        let err = ChatError::provider(Some(401), "invalid key");
        assert_eq!(err.to_string(), "invalid key");
        assert!(!err.is_cancelled());
        assert_eq!(err.partial_text(), None);
    }

    #[test]
    fn cancelled_exposes_partial_text() {
        let err = ChatError::Cancelled {
            partial: "Hel".to_string(),
        };
        assert!(err.is_cancelled());
        assert_eq!(err.partial_text(), Some("Hel"));
    }
}
