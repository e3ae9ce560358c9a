use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shelfsync_core::errors::{DatabaseError, Error as CoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) => match e {
                CoreError::Database(DatabaseError::NotFound(_)) => StatusCode::NOT_FOUND,
                CoreError::Database(DatabaseError::UniqueViolation(_)) => StatusCode::CONFLICT,
                CoreError::SyncInProgress => StatusCode::CONFLICT,
                CoreError::ContentSource(source) if source.is_configuration() => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                CoreError::ContentSource(_) => StatusCode::BAD_GATEWAY,
                CoreError::Validation(_) => StatusCode::BAD_REQUEST,
                CoreError::Database(_) | CoreError::Unexpected(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shelfsync_content_source::ContentSourceError;

    #[test]
    fn test_status_mapping() {
        let not_found = ApiError::from(CoreError::Database(DatabaseError::NotFound("x".into())));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        assert_eq!(
            ApiError::from(CoreError::SyncInProgress).status(),
            StatusCode::CONFLICT
        );

        let upstream = ApiError::from(CoreError::ContentSource(ContentSourceError::HttpStatus {
            status: 503,
            message: String::new(),
        }));
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);

        let misconfigured = ApiError::from(CoreError::ContentSource(
            ContentSourceError::MissingConfig {
                keys: vec!["CONTENTFUL_URL"],
            },
        ));
        assert_eq!(misconfigured.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
