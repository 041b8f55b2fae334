use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::api::error::InnerApiError;

/// 统一的成功响应包装
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    status_code: u16,
    data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status_code: 200,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// 统一的错误响应包装
///
/// 内部携带 anyhow 错误；若能向下转型为 [`InnerApiError`] 则按其映射
/// HTTP 状态码，否则一律 500 并隐藏细节（细节只进日志）。
pub struct ApiError(anyhow::Error);

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(error: E) -> Self {
        Self(error.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0.downcast_ref::<InnerApiError>() {
            Some(inner) => (inner.status_code(), inner.to_string()),
            None => {
                error!("未分类的内部错误: {:#}", self.0);
                (StatusCode::INTERNAL_SERVER_ERROR, "服务内部错误".to_string())
            }
        };
        let body = serde_json::json!({
            "status_code": status.as_u16(),
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}
