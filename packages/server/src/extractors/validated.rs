use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON body extractor whose rejections become `VALIDATION_ERROR` responses.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Query-string extractor; a malformed `?page=abc` is a `VALIDATION_ERROR`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
