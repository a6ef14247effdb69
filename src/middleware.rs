use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::consts::auth_const::TOKEN_COOKIE;
use crate::errors::{Error, Result as RResult};
use crate::state::AppState;
use crate::utils::jwt::decode_jwt;

/// The authenticated identity of the caller, taken from a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub email: String,
}

pub async fn auth_jwt_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, Response> {
    let request = buffer_request_and_authenticate(&state, request)?;

    Ok(next.run(request).await)
}

fn buffer_request_and_authenticate<B>(
    state: &AppState,
    request: axum::http::Request<B>,
) -> Result<axum::http::Request<B>, Response> {
    let (mut parts, body) = request.into_parts();
    let caller = check_auth_parts(state, &parts).map_err(IntoResponse::into_response)?;

    parts.extensions.insert(caller);

    Ok(axum::http::Request::from_parts(parts, body))
}

fn check_auth_parts(state: &AppState, parts: &Parts) -> RResult<Caller> {
    let token = match CookieJar::from_headers(&parts.headers).get(TOKEN_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => bearer_token(parts)?,
    };

    decode_jwt(&token, &state.config).map(|data| Caller {
        email: data.claims.email,
    })
}

fn bearer_token(parts: &Parts) -> RResult<String> {
    let header_value = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(Error::MissingToken)?
        .to_str()
        .map_err(|_| Error::InvalidToken)?;

    let mut parts = header_value.trim().splitn(2, ' ');

    let scheme = parts.next().ok_or(Error::MissingToken)?;
    let token = parts.next().ok_or(Error::MissingToken)?;

    if scheme != "Bearer" {
        tracing::warn!("Invalid auth scheme: {scheme}");
        return Err(Error::InvalidToken);
    }

    Ok(token.trim().to_string())
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> RResult<Self> {
        parts
            .extensions
            .get::<Caller>()
            .cloned()
            .ok_or(Error::MissingToken)
    }
}
