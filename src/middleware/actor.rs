use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

pub const ACTING_USER_HEADER: &str = "x-user-id";

/// The user on whose behalf a request runs.
///
/// Resolved per request from the `x-user-id` header set by the upstream
/// auth gateway, then passed explicitly to every service call that needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser(String);

impl ActingUser {
    pub fn new(id: impl Into<String>) -> Result<Self, AppError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(AppError::Unauthorized("Missing user identity".to_string()));
        }
        Ok(Self(id))
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActingUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(ACTING_USER_HEADER)
            .ok_or_else(|| AppError::Unauthorized("Missing x-user-id header".to_string()))?;

        let id = header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Malformed x-user-id header".to_string()))?;

        ActingUser::new(id)
    }
}
