use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    Form,
};
use url::form_urlencoded;

use crate::{
    dto::auth_dto::{GoogleCallbackQuery, TokenExchangeForm, TokenResponse},
    error::Result,
    AppState,
};

fn found(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

#[utoipa::path(
    get,
    path = "/auth/google",
    responses(
        (status = 302, description = "Redirect to the Google consent screen")
    )
)]
#[axum::debug_handler]
pub async fn google_login(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let url = state.auth_service.build_authorization_url()?;
    Ok(found(url))
}

#[utoipa::path(
    get,
    path = "/auth/google/callback",
    params(
        ("code" = String, Query, description = "Authorization code from Google")
    ),
    responses(
        (status = 302, description = "Redirect to the frontend with the session token in the fragment"),
        (status = 403, description = "Account outside the allowed domain"),
        (status = 502, description = "Google token exchange failed")
    )
)]
#[axum::debug_handler]
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<GoogleCallbackQuery>,
) -> Result<impl IntoResponse> {
    let outcome = state.auth_service.complete_login(&query.code, None).await?;
    let email: String = form_urlencoded::byte_serialize(outcome.email.as_bytes()).collect();
    let target = format!(
        "{}/auth/callback#token={}&email={}&expiresIn={}",
        state.frontend_url.trim_end_matches('/'),
        outcome.token,
        email,
        outcome.expires_in
    );
    Ok(found(target))
}

#[utoipa::path(
    post,
    path = "/auth/token",
    request_body(content = TokenExchangeForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Session token issued", body = Json<TokenResponse>),
        (status = 403, description = "Account outside the allowed domain"),
        (status = 502, description = "Google token exchange failed")
    )
)]
#[axum::debug_handler]
pub async fn exchange_token(
    State(state): State<AppState>,
    Form(form): Form<TokenExchangeForm>,
) -> Result<impl IntoResponse> {
    let outcome = state
        .auth_service
        .complete_login(&form.code, form.redirect_uri.as_deref())
        .await?;
    Ok(Json(TokenResponse::bearer(outcome.token, outcome.expires_in)))
}
