use aula_core::{AppError, ErrorKind};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

/// API error payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    kind: ErrorKind,
    message: String,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::TransactionFailed | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = status_for(kind);
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }

        let payload = Json(ErrorResponse {
            kind,
            message: self.0.to_string(),
        });

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use aula_core::AppError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use super::ApiError;

    fn status(error: AppError) -> StatusCode {
        ApiError(error).into_response().status()
    }

    #[test]
    fn error_kinds_map_to_status_codes() {
        assert_eq!(
            status(AppError::Validation("role name must not be empty".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(AppError::Unauthorized("actor required".to_owned())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status(AppError::MissingRole {
                role: "admin".to_owned(),
            }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status(AppError::PermissionsNotFound {
                permission_ids: vec!["p-missing".to_owned()],
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(AppError::RoleAlreadyExists {
                name: "docente".to_owned(),
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(AppError::TransactionFailed {
                message: "connection reset".to_owned(),
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
