//! Collector authentication middleware.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};

/// Header collectors put their API key in.
pub const API_KEY_HEADER: &str = "Api-Key";

/// API keys accepted by the manager.
#[derive(Debug, Clone, Default)]
pub struct AuthorizedKeys {
    keys: Arc<HashSet<String>>,
}

impl AuthorizedKeys {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = keys
            .into_iter()
            .map(Into::into)
            .filter(|k: &String| !k.is_empty())
            .collect();
        Self {
            keys: Arc::new(keys),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

pub async fn api_key_middleware(
    State(keys): State<AuthorizedKeys>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let authorized = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|key| keys.contains(key));

    if authorized {
        Ok(next.run(request).await)
    } else {
        tracing::warn!(path = %request.uri().path(), "Rejected request with unknown API key");
        Err(StatusCode::UNAUTHORIZED)
    }
}
