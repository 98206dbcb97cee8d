use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{error::AppError, models::UserId};

/// Header carrying the id of the authenticated caller
///
/// Authentication happens in front of this service; by the time a request
/// arrives here the gateway has replaced any client-supplied value.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user a request is made on behalf of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized(format!("missing {} header", USER_ID_HEADER)))?;

        raw.to_str()
            .ok()
            .and_then(|s| s.trim().parse::<UserId>().ok())
            .map(Caller)
            .ok_or_else(|| AppError::Unauthorized(format!("invalid {} header", USER_ID_HEADER)))
    }
}
