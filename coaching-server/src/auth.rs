use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State as AxumState},
    http::{
        header::{COOKIE, LOCATION, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::IntoResponse,
    Json,
};
use coaching_core::session::SessionPayload;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{error::AppError, state::State};

pub const SESSION_COOKIE: &str = "coaching.session-token";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEntry {
    pub id: String,
    pub name: String,
    pub signin_url: String,
    pub callback_url: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

pub async fn providers_handler(
    AxumState(state): AxumState<Arc<State>>,
) -> Json<BTreeMap<String, ProviderEntry>> {
    let config = &state.config;
    Json(
        config
            .providers
            .iter()
            .map(|p| {
                (
                    p.id.clone(),
                    ProviderEntry {
                        id: p.id.clone(),
                        name: p.name.clone(),
                        signin_url: config.signin_url(&p.id),
                        callback_url: config.callback_url(&p.id),
                    },
                )
            })
            .collect(),
    )
}

pub async fn signin_handler(
    AxumState(state): AxumState<Arc<State>>,
    Path(provider_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let provider = state
        .config
        .provider(&provider_id)
        .ok_or_else(|| AppError::UnknownProvider(provider_id.clone()))?;

    let login_state = state.sessions.begin_login(&provider.id).await;
    let url = provider.authorization_url(&login_state, &state.config.callback_url(&provider.id))?;

    Ok((StatusCode::FOUND, [(LOCATION, url.to_string())]))
}

pub async fn callback_handler(
    AxumState(state): AxumState<Arc<State>>,
    Path(provider_id): Path<String>,
    Query(params): Query<CallbackParams>,
) -> Result<impl IntoResponse, AppError> {
    let provider = state
        .config
        .provider(&provider_id)
        .ok_or_else(|| AppError::UnknownProvider(provider_id.clone()))?;

    let login_state = params.state.as_deref().unwrap_or_default();
    if !state.sessions.finish_login(&provider.id, login_state).await {
        warn!(provider = %provider.id, "callback with unknown or expired state");
        return Err(AppError::InvalidState);
    }
    if let Some(error) = params.error {
        return Err(AppError::ProviderDenied(error));
    }
    let code = params
        .code
        .ok_or_else(|| AppError::ProviderDenied("missing authorization code".into()))?;

    let session = provider
        .fetch_session(&state.http, &code, &state.config.callback_url(&provider.id))
        .await?;
    let (token, _) = state.sessions.create(session).await;
    info!(provider = %provider.id, "signed in");

    Ok((
        StatusCode::FOUND,
        [
            (LOCATION, "/".to_string()),
            (SET_COOKIE, session_cookie(&token, &state.config.public_url)),
        ],
    ))
}

pub async fn session_handler(
    AxumState(state): AxumState<Arc<State>>,
    headers: HeaderMap,
) -> Json<SessionPayload> {
    let Some(token) = session_token(&headers) else {
        return Json(SessionPayload::anonymous());
    };
    match state.sessions.get(&token).await {
        Some(stored) => Json(SessionPayload::signed_in(
            &stored.session,
            stored.expires_rfc3339(),
        )),
        None => Json(SessionPayload::anonymous()),
    }
}

pub async fn signout_handler(
    AxumState(state): AxumState<Arc<State>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(token) = session_token(&headers) {
        if state.sessions.remove(&token).await {
            info!("signed out");
        }
    }
    (
        [(SET_COOKIE, expired_cookie(&state.config.public_url))],
        Json(serde_json::json!({ "url": "/" })),
    )
}

pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

fn session_cookie(token: &str, public_url: &str) -> String {
    let max_age = crate::sessions::SESSION_MAX_AGE_DAYS * 24 * 60 * 60;
    format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}{}",
        secure_flag(public_url)
    )
}

fn expired_cookie(public_url: &str) -> String {
    format!(
        "{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
        secure_flag(public_url)
    )
}

fn secure_flag(public_url: &str) -> &'static str {
    if public_url.starts_with("https://") {
        "; Secure"
    } else {
        ""
    }
}
