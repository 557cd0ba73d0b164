use thiserror::Error;

/// Errors from conversation store operations (used by trait definitions in parley-core).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Errors surfaced by the chat session service.
///
/// Every failure in a chat exchange maps to one of these; the HTTP layer
/// renders them as structured `{"error": ...}` payloads and never lets an
/// internal error type cross the wire.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Empty or malformed request input.
    #[error("{0}")]
    Validation(String),

    /// The remote completion call failed; carries the underlying message.
    #[error("{0}")]
    Model(String),

    /// A store write failed. Read failures never surface here -- they
    /// degrade to an empty history at the service boundary.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_chat_error_from_store_error() {
        let err: ChatError = StoreError::Connection.into();
        assert!(matches!(err, ChatError::Storage(_)));
        assert_eq!(err.to_string(), "storage error: database connection error");
    }

    #[test]
    fn test_chat_error_validation_display_is_bare_message() {
        let err = ChatError::Validation("Message is required".to_string());
        assert_eq!(err.to_string(), "Message is required");
    }
}
