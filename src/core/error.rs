use thiserror::Error;

#[derive(Error, Debug)]
pub enum FiresError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Failures at the model-call boundary.
///
/// These are the only errors a user ever sees during a chat turn; they never
/// touch session state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    #[error("{0}")]
    Configuration(String),

    #[error("provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("empty response")]
    EmptyResponse,
}

impl LlmError {
    /// Short label shown in front of the message
    pub fn label(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "Configuration Error",
            Self::Provider { .. } | Self::Transport(_) => "API Error",
            Self::MalformedResponse(_) | Self::EmptyResponse => "Unexpected Error",
        }
    }

    /// Labeled text suitable for display in place of an assistant reply
    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration(_) => format!(
                "{}: {}\n\nSet LLM_API_KEY (or ANTHROPIC_API_KEY) and try again.",
                self.label(),
                self
            ),
            _ => format!("{}: {}\n\nPlease try again.", self.label(), self),
        }
    }
}

/// Failures while importing an uploaded document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImportError {
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("document is empty")]
    EmptyContent,

    #[error("model returned invalid JSON: {0}")]
    InvalidJson(String),

    #[error("malformed CSV: {0}")]
    InvalidCsv(String),

    #[error("required field missing: {0}")]
    MissingField(String),

    #[error("model call failed: {0}")]
    Llm(LlmError),
}

impl From<LlmError> for ImportError {
    fn from(err: LlmError) -> Self {
        Self::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, FiresError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_labels() {
        assert_eq!(
            LlmError::Configuration("missing key".into()).label(),
            "Configuration Error"
        );
        assert_eq!(
            LlmError::Provider {
                status: 529,
                message: "overloaded".into()
            }
            .label(),
            "API Error"
        );
        assert_eq!(LlmError::Transport("reset".into()).label(), "API Error");
        assert_eq!(LlmError::EmptyResponse.label(), "Unexpected Error");
    }

    #[test]
    fn test_user_message_is_labeled() {
        let msg = LlmError::Provider {
            status: 500,
            message: "boom".into(),
        }
        .user_message();
        assert!(msg.starts_with("API Error:"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_import_error_wraps_llm_error() {
        let err: ImportError = LlmError::EmptyResponse.into();
        assert_eq!(err, ImportError::Llm(LlmError::EmptyResponse));

        let top: FiresError = err.into();
        assert!(top.to_string().starts_with("Import error"));
    }
}
