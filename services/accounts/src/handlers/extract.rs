//! Extractors whose rejections render as `AccountsServiceError`.
//!
//! axum's own `Json`, `Path` and `Multipart` reject with plain-text bodies;
//! these wrappers route the rejection through the service's `{kind, message}`
//! shape instead.

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::AccountsServiceError;

/// JSON request body. Also usable as a response.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AccountsServiceError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// URL path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AccountsServiceError))]
pub struct Path<T>(pub T);

/// Multipart form body.
pub struct Multipart(pub axum::extract::Multipart);

impl<S> FromRequest<S> for Multipart
where
    S: Send + Sync,
{
    type Rejection = AccountsServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = axum::extract::Multipart::from_request(req, state).await?;
        Ok(Self(multipart))
    }
}
