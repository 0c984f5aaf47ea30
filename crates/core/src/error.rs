use serde::Serialize;
use thiserror::Error;

/// Stable error categories exposed to callers.
///
/// Callers branch on the kind; the `Display` text of [`AppError`] is for humans
/// and logs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Invalid input.
    Validation,
    /// Caller identity is missing.
    Unauthorized,
    /// Caller is known but blocked by authorization policy.
    Forbidden,
    /// Referenced resource does not exist.
    NotFound,
    /// Write conflicts with a uniqueness invariant.
    Conflict,
    /// Unexpected persistence failure inside a transactional write.
    TransactionFailed,
    /// Any other unexpected failure.
    Internal,
}

/// Common application errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Caller did not present an identity.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller lacks a required role.
    #[error("access denied: role '{role}' is required")]
    MissingRole {
        /// Name of the required role.
        role: String,
    },

    /// Caller lacks a required permission.
    #[error("access denied: permission '{action}' on '{resource}' is required")]
    MissingPermission {
        /// Required action.
        action: String,
        /// Resource the action applies to.
        resource: String,
    },

    /// Role id does not resolve to a stored role.
    #[error("role '{role_id}' was not found")]
    RoleNotFound {
        /// Requested role id.
        role_id: String,
    },

    /// Permission id does not resolve to a stored permission.
    #[error("permission '{permission_id}' was not found")]
    PermissionNotFound {
        /// Requested permission id.
        permission_id: String,
    },

    /// One or more permission ids in a bulk request do not exist.
    #[error("permissions not found: {}", .permission_ids.join(", "))]
    PermissionsNotFound {
        /// Missing ids in request order.
        permission_ids: Vec<String>,
    },

    /// A role with the same name already exists.
    #[error("role '{name}' already exists")]
    RoleAlreadyExists {
        /// Conflicting role name.
        name: String,
    },

    /// A permission with the same action and resource already exists.
    #[error("permission '{action}' on '{resource}' already exists")]
    PermissionAlreadyExists {
        /// Conflicting action.
        action: String,
        /// Conflicting resource.
        resource: String,
    },

    /// Unexpected failure while persisting a role mutation.
    #[error("role transaction failed: {message}")]
    TransactionFailed {
        /// Underlying failure message.
        message: String,
    },

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the stable category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::MissingRole { .. } | Self::MissingPermission { .. } => ErrorKind::Forbidden,
            Self::RoleNotFound { .. }
            | Self::PermissionNotFound { .. }
            | Self::PermissionsNotFound { .. } => ErrorKind::NotFound,
            Self::RoleAlreadyExists { .. } | Self::PermissionAlreadyExists { .. } => {
                ErrorKind::Conflict
            }
            Self::TransactionFailed { .. } => ErrorKind::TransactionFailed,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Rewraps unexpected failures as [`AppError::TransactionFailed`].
    ///
    /// Domain errors pass through unchanged.
    #[must_use]
    pub fn into_transaction_failure(self) -> Self {
        match self {
            Self::Internal(message) => Self::TransactionFailed { message },
            other => other,
        }
    }
}
