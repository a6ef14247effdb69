use axum::{Json, extract::State};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use validator::Validate;

use crate::{
    config::Config,
    consts::auth_const::TOKEN_COOKIE,
    errors::Result,
    models::results::SuccessResponse,
    state::AppState,
    utils::{
        jwt::{Claims, encode_jwt},
        validated_form::ValidatedJson,
    },
};

#[derive(Debug, Clone, serde::Deserialize, Validate)]
pub struct SessionRequest {
    #[validate(email)]
    pub email: String,
}

/// Cross-site deployments need `SameSite=None; Secure`, local ones stay strict.
fn session_cookie(value: String, config: &Config) -> Cookie<'static> {
    let same_site = if config.is_production() {
        SameSite::None
    } else {
        SameSite::Strict
    };
    Cookie::build((TOKEN_COOKIE, value))
        .http_only(true)
        .secure(config.is_production())
        .same_site(same_site)
        .path("/")
        .build()
}

pub async fn issue_token(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(input): ValidatedJson<SessionRequest>,
) -> Result<(CookieJar, Json<SuccessResponse>)> {
    let claims = Claims::new(input.email, &state.config);
    let token = encode_jwt(&claims, &state.config)?;
    tracing::debug!(email = %claims.email, "session token issued");

    Ok((
        jar.add(session_cookie(token, &state.config)),
        Json(SuccessResponse { success: true }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<SuccessResponse>) {
    // always send the removal, even when the request carried no cookie
    let mut cookie = session_cookie(String::new(), &state.config);
    cookie.make_removal();

    (jar.add(cookie), Json(SuccessResponse { success: true }))
}
