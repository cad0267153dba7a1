// region:    --- Imports
use crate::goods::RepositoryError;
use crate::upload::UploadError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

// endregion: --- Imports

pub type ApiResult<T> = Result<T, ApiError>;

// region:    --- Api Error
/// 요청 처리 중 발생하는 모든 에러
/// 핸들러는 이 타입으로 에러를 돌려주고, 응답 변환은 한 곳에서 한다.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("failed to read update marker: {0}")]
    Tracker(std::io::Error),

    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("file not found: {0}")]
    NotFound(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Repository(_) | ApiError::Tracker(_) | ApiError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Upload(UploadError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Upload(UploadError::UnexpectedFile) => StatusCode::BAD_REQUEST,
            ApiError::Upload(UploadError::Multipart(e)) => e.status(),
            ApiError::Upload(UploadError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!("{:<12} --> 요청 처리 실패: {}", "Error", message);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
// endregion: --- Api Error
