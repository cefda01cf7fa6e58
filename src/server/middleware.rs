//! Bearer token check for the mock server.
//!
//! When `FOOD_NOTES_SERVER_TOKEN` is set, the GraphQL endpoint and the
//! storage write/sign routes only accept `Authorization: Bearer <token>`.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

#[derive(Clone, Debug, Default)]
pub struct SecurityConfig {
    pub token: Option<String>,
}

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingToken,
    WrongToken,
}

impl SecurityConfig {
    pub fn from_env() -> Self {
        let token = std::env::var("FOOD_NOTES_SERVER_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());
        if token.is_none() {
            tracing::warn!("FOOD_NOTES_SERVER_TOKEN not set, accepting every request");
        }
        Self { token }
    }

    /// Accept every request.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn authorize(&self, headers: &HeaderMap) -> Result<(), Rejection> {
        let Some(expected) = self.token.as_deref() else {
            return Ok(());
        };
        match bearer(headers) {
            None => Err(Rejection::MissingToken),
            Some(token) if token == expected => Ok(()),
            Some(_) => Err(Rejection::WrongToken),
        }
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

pub async fn auth_middleware(
    State(security): State<SecurityConfig>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    match security.authorize(request.headers()) {
        Ok(()) => Ok(next.run(request).await),
        Err(rejection) => {
            tracing::warn!(?rejection, path = %request.uri().path(), "rejected request");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
