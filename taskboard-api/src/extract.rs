//! Request extractors that reject with [`ApiError`] bodies

use axum::extract::{rejection::QueryRejection, FromRequest, FromRequestParts};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// JSON body extractor whose rejections render as `bad_request`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query-string extractor whose rejections render as `bad_request`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Parses a path identifier; a malformed ID is a 400, never a 404
pub fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid id: {}", raw)))
}
