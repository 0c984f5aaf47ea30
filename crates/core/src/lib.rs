//! Shared primitives for all Rust crates in Aula.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

mod error;

use serde::{Deserialize, Serialize};

pub use auth::UserIdentity;
pub use error::{AppError, ErrorKind};

/// Result type used across Aula crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Creates a validated non-empty string, naming the field in the error.
    pub fn for_field(field: &str, value: impl Into<String>) -> AppResult<Self> {
        Self::new(value)
            .map_err(|_| AppError::Validation(format!("{field} must not be empty or whitespace")))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn non_empty_string_keeps_original_value() {
        let value = NonEmptyString::new(" docente ").map(String::from);
        assert_eq!(value.ok().as_deref(), Some(" docente "));
    }

    #[test]
    fn field_error_names_the_field() {
        let result = NonEmptyString::for_field("role name", "");
        assert!(matches!(
            result,
            Err(AppError::Validation(message)) if message.starts_with("role name")
        ));
    }
}
