use crate::{AppState, Error};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use events::UserId;
use log::*;

pub(crate) struct AuthenticatedUser(pub UserId);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = Error;

    // Resolves the caller's identity once per request: pull the session token
    // off the request and validate it against the session store. Runs before
    // a streaming connection registers with the hub, so an unauthenticated
    // caller never reaches the registry.
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Error> {
        let token = session_token(parts).ok_or(Error::Unauthorized)?;
        let user_id = state.sessions.validate(&token).await?;
        trace!("Resolved session to user {user_id}");
        Ok(AuthenticatedUser(user_id))
    }
}

/// Token lookup order: `token` cookie, `token` query parameter, then the
/// Authorization header with an optional `Bearer` prefix. The query parameter
/// exists because the browser EventSource API cannot set request headers.
fn session_token(parts: &Parts) -> Option<String> {
    if let Some(token) = cookie_token(parts) {
        return Some(token);
    }
    if let Some(token) = query_token(parts) {
        return Some(token);
    }
    let header = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = match header.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest,
        _ => header,
    };
    (!token.is_empty()).then(|| token.to_string())
}

fn cookie_token(parts: &Parts) -> Option<String> {
    let cookies = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == "token" && !value.is_empty()).then(|| value.to_string())
    })
}

fn query_token(parts: &Parts) -> Option<String> {
    let query = parts.uri.query()?;
    query.split('&').find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        (name == "token" && !value.is_empty()).then(|| value.to_string())
    })
}
