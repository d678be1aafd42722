//! Error reporting shared by the command line host
//!
//! Errors a user can fix (bad configuration, bad input line, bad date) are
//! reported with their own message. System errors get a generic context line,
//! with the full error only at debug level.

/// Errors that know whether their message is meant for the user
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    /// True if the error carries a message the user can act on
    fn is_user_actionable(&self) -> bool;

    /// The user-facing message, for user-actionable errors only
    fn user_message(&self) -> Option<&str>;
}

/// Log `error` with a level of detail that depends on who can fix it
///
/// # Examples
/// ```rust,no_run
/// # use tweetbucket::core::error_handling::log_error_with_context;
/// # use tweetbucket::feed::FeedError;
/// let err = FeedError::configuration("bucket-minutes must be greater than 0");
/// log_error_with_context(&err, "Loading configuration");
/// // Logs: "FATAL: bucket-minutes must be greater than 0"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {} failed", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// Message to show on stderr when logging may not be configured yet
pub fn user_facing_message<E: ContextualError>(error: &E, operation_context: &str) -> String {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => user_msg.to_string(),
        _ => format!("{} failed: {}", operation_context, error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct TestUserError {
        message: String,
    }

    impl fmt::Display for TestUserError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.message)
        }
    }

    impl std::error::Error for TestUserError {}

    impl ContextualError for TestUserError {
        fn is_user_actionable(&self) -> bool {
            true
        }

        fn user_message(&self) -> Option<&str> {
            Some(&self.message)
        }
    }

    #[derive(Debug)]
    struct TestSystemError;

    impl fmt::Display for TestSystemError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "disk on fire")
        }
    }

    impl std::error::Error for TestSystemError {}

    impl ContextualError for TestSystemError {
        fn is_user_actionable(&self) -> bool {
            false
        }

        fn user_message(&self) -> Option<&str> {
            None
        }
    }

    #[test]
    fn test_user_actionable_message() {
        let error = TestUserError {
            message: "Invalid date 'tomorrowish'".to_string(),
        };
        assert_eq!(
            user_facing_message(&error, "Parsing arguments"),
            "Invalid date 'tomorrowish'"
        );
        log_error_with_context(&error, "Parsing arguments");
    }

    #[test]
    fn test_system_error_gets_context() {
        assert_eq!(
            user_facing_message(&TestSystemError, "Loading tweets"),
            "Loading tweets failed: disk on fire"
        );
        log_error_with_context(&TestSystemError, "Loading tweets");
    }
}
