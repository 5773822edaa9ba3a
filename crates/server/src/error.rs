use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use career_core::model::UserError;
use serde::Serialize;
use services::{
    ActivityServiceError, AuthError, FavoriteServiceError, ProfileServiceError, QuizServiceError,
    RoadmapServiceError, SessionServiceError,
};
use tracing::error;

/// Error returned by every handler, rendered as `{ message, error? }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    detail: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            detail: None,
        }
    }

    #[must_use]
    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Unauthorized".into(),
            detail: None,
        }
    }

    pub fn server(detail: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Server error".into(),
            detail: Some(detail.to_string()),
        }
    }

    fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            detail: None,
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(
                status = self.status.as_u16(),
                error = self.detail.as_deref().unwrap_or(""),
                "request failed"
            );
        }
        let body = ErrorBody {
            message: &self.message,
            error: self.detail.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<UserError> for ApiError {
    fn from(e: UserError) -> Self {
        Self::bad_request(e.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingFields
            | AuthError::MissingCredentials
            | AuthError::InvalidUser(_)
            | AuthError::AlreadyRegistered => Self::bad_request(e.to_string()),
            AuthError::NotRegistered => Self::with_status(StatusCode::NOT_FOUND, e.to_string()),
            AuthError::InvalidCredentials => {
                Self::with_status(StatusCode::UNAUTHORIZED, e.to_string())
            }
            other => Self::server(other),
        }
    }
}

impl From<SessionServiceError> for ApiError {
    fn from(e: SessionServiceError) -> Self {
        Self::server(e)
    }
}

impl From<QuizServiceError> for ApiError {
    fn from(e: QuizServiceError) -> Self {
        Self::server(e)
    }
}

impl From<RoadmapServiceError> for ApiError {
    fn from(e: RoadmapServiceError) -> Self {
        match e {
            RoadmapServiceError::MissingFields | RoadmapServiceError::Step(_) => {
                Self::bad_request(e.to_string())
            }
            other => Self::server(other),
        }
    }
}

impl From<ProfileServiceError> for ApiError {
    fn from(e: ProfileServiceError) -> Self {
        match e {
            ProfileServiceError::NoFields | ProfileServiceError::InvalidUser(_) => {
                Self::bad_request(e.to_string())
            }
            other => Self::server(other),
        }
    }
}

impl From<FavoriteServiceError> for ApiError {
    fn from(e: FavoriteServiceError) -> Self {
        match e {
            FavoriteServiceError::MissingTitle | FavoriteServiceError::Favorite(_) => {
                Self::bad_request(e.to_string())
            }
            other => Self::server(other),
        }
    }
}

impl From<ActivityServiceError> for ApiError {
    fn from(e: ActivityServiceError) -> Self {
        match e {
            ActivityServiceError::MissingCareer
            | ActivityServiceError::MissingQuery
            | ActivityServiceError::Career(_)
            | ActivityServiceError::Query(_) => Self::bad_request(e.to_string()),
            other => Self::server(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::StorageError;

    #[test]
    fn auth_errors_map_to_documented_statuses() {
        assert_eq!(
            ApiError::from(AuthError::AlreadyRegistered).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(AuthError::NotRegistered).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::Storage(StorageError::Query("boom".into()))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn blank_activity_input_is_a_bad_request() {
        let err = ApiError::from(ActivityServiceError::MissingQuery);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "query is required");
        assert_eq!(
            ApiError::from(ActivityServiceError::Storage(StorageError::Timeout("pool".into())))
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn server_errors_carry_detail() {
        let err = ApiError::from(QuizServiceError::Storage(StorageError::Query("bad".into())));
        assert_eq!(err.message, "Server error");
        assert_eq!(err.detail.as_deref(), Some("query error: bad"));
    }
}
