//! Upgrade request extractors

use crate::handlers::TokenSources;
use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::Deserialize;
use std::convert::Infallible;

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Collects the query and header tokens of the upgrade request
///
/// Malformed or missing values are treated as absent; the handshake decides
/// whether a usable token exists.
#[async_trait]
impl<S> FromRequestParts<S> for TokenSources
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let query = Query::<TokenQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.token);

        let header = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|TypedHeader(Authorization(bearer))| bearer.token().to_string());

        Ok(Self { query, header })
    }
}
