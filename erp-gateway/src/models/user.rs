use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use service_core::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Caller identity forwarded by the frontend edge.
///
/// The gateway sits behind the platform's auth layer, which has already
/// verified the session and stamps the user id on the request.
#[derive(Debug, Clone)]
pub struct GatewayUser {
    pub user_id: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for GatewayUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Missing user identity")))?;

        if !is_valid_user_id(user_id) {
            return Err(AppError::BadRequest(anyhow::anyhow!("Malformed user identity")));
        }

        Ok(GatewayUser {
            user_id: user_id.to_string(),
        })
    }
}

/// User ids end up as a backend path segment and a cache key suffix.
fn is_valid_user_id(user_id: &str) -> bool {
    user_id != "."
        && user_id != ".."
        && !user_id
            .chars()
            .any(|c| c.is_control() || matches!(c, '/' | '\\' | '?' | '#' | '%'))
}
