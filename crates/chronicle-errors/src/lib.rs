//! User-friendly error messages and recovery suggestions for the Chronicle
//! CLI, layered purely over `anyhow::Result`. It never changes the
//! engine's no-panic contract, only how the CLI presents a failure.

use anyhow::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Enhanced error with a user-friendly message and recovery suggestions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedError {
    pub title: String,
    pub message: String,
    pub suggestions: Vec<String>,
    pub error_type: ErrorType,
    pub context: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorType {
    /// No active chat/session wired up at `push_snapshot` time.
    Configuration,
    /// Filesystem permission problems during `DiskWriter::execute`.
    Permission,
    /// Malformed CLI arguments or scenario input.
    Validation,
    /// Anything else.
    Unknown,
}

impl EnhancedError {
    pub fn new(title: impl Into<String>, message: impl Into<String>, error_type: ErrorType) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            suggestions: Vec::new(),
            error_type,
            context: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions.extend(suggestions);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn into_error(self) -> Error {
        Error::new(self)
    }

    pub fn format(&self, verbose: bool) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}: {}\n", self.error_type.label(), self.title));
        output.push_str(&format!("  {}\n", self.message));

        if verbose {
            if let Some(context) = &self.context {
                output.push_str(&format!("\n  Context: {context}\n"));
            }
        }

        if !self.suggestions.is_empty() {
            output.push_str("\n  Suggestions:\n");
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("    {}. {}\n", i + 1, suggestion));
            }
        }
        output
    }
}

impl ErrorType {
    fn label(&self) -> &'static str {
        match self {
            ErrorType::Configuration => "config",
            ErrorType::Permission => "permission",
            ErrorType::Validation => "validation",
            ErrorType::Unknown => "error",
        }
    }
}

/// Closed set of typed conditions callers can throw directly instead of
/// building an `EnhancedError` by hand, mirroring `deepseek-policy::PolicyError`.
/// `ErrorHandler::handle` downcasts for these before falling back to string
/// classification.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ChronicleError {
    #[error("no active chat or last user message id")]
    MissingChatContext,
    #[error("no history node is associated with message id {0}")]
    UnknownMessageId(String),
}

impl fmt::Display for EnhancedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

impl std::error::Error for EnhancedError {}

/// Classifies a generic error and prints a user-friendly message.
pub struct ErrorHandler {
    verbose: bool,
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorHandler {
    pub fn new() -> Self {
        Self { verbose: false }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn handle(&self, error: &Error) -> String {
        if let Some(enhanced) = error.downcast_ref::<EnhancedError>() {
            return enhanced.format(self.verbose);
        }
        if let Some(typed) = error.downcast_ref::<ChronicleError>() {
            return self.classify_typed(typed).format(self.verbose);
        }
        self.classify_error(&error.to_string()).format(self.verbose)
    }

    fn classify_typed(&self, err: &ChronicleError) -> EnhancedError {
        match err {
            ChronicleError::MissingChatContext => errors::missing_chat_context(),
            ChronicleError::UnknownMessageId(id) => errors::unknown_message_id(id),
        }
    }

    fn classify_error(&self, error_message: &str) -> EnhancedError {
        let lower = error_message.to_lowercase();

        if lower.contains("no active chat") || lower.contains("no last user message") {
            return errors::missing_chat_context();
        }

        if lower.contains("permission") || lower.contains("denied") {
            return EnhancedError::new("Permission Error", error_message, ErrorType::Permission)
                .with_suggestions(vec![
                    "Check file and directory permissions under the workspace root".to_string(),
                    "Confirm the process has write access to the tracked paths".to_string(),
                ]);
        }

        EnhancedError::new("Error", error_message, ErrorType::Unknown)
            .with_suggestion("Re-run with --verbose for more context".to_string())
    }
}

/// Common error constructors for frequently hit conditions.
pub mod errors {
    use super::*;

    pub fn missing_chat_context() -> EnhancedError {
        EnhancedError::new(
            "No Active Conversation",
            "An edit or accept/reject was requested before a chat turn began.",
            ErrorType::Configuration,
        )
        .with_suggestions(vec![
            "Pass --chat-id and --message-id when driving the engine standalone".to_string(),
            "Wire a real ChatStateBridge implementation before calling push_snapshot".to_string(),
        ])
    }

    pub fn unknown_message_id(id: &str) -> EnhancedError {
        EnhancedError::new(
            "Unknown User Message",
            format!("No history node is associated with message id {id}."),
            ErrorType::Validation,
        )
        .with_suggestion("Check the id against `chronicle diff --json` output".to_string())
    }
}
