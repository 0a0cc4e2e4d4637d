//! Request handlers for the sign-in flow.
//!
//! ```text
//! /request-token ──► twitter.com/oauth/authenticate ──► /response ──► /access-token
//!   issue token         visitor approves app            forward      exchange, verify,
//!   remember secret                                                  render profile
//! ```

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{Html, Redirect};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::AppError;
use crate::oauth;
use crate::state::AppState;
use crate::stats::ProfileStats;

/// Query Twitter appends to the callback URL.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub oauth_token: Option<String>,
    pub oauth_verifier: Option<String>,
    /// Set instead of the two above when the visitor declined.
    pub denied: Option<String>,
}

pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    Ok(Html(state.templates.index()?))
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn request_token(State(state): State<Arc<AppState>>) -> Result<Redirect, AppError> {
    let request = state.twitter.request_token().await?;
    let url = state.twitter.authenticate_url(&request.key);

    state.pending.insert(request).await;
    info!("issued request token, redirecting to Twitter");

    Ok(Redirect::to(&url))
}

pub async fn response(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
) -> Result<Html<String>, AppError> {
    if let Some(token) = &query.denied {
        state.pending.take(token).await;
        info!("visitor declined authorization");
        return Ok(Html(state.templates.response(None, true)?));
    }

    let continue_url = match (&query.oauth_token, &query.oauth_verifier) {
        (Some(token), Some(verifier)) => Some(format!(
            "/access-token?oauth_token={}&oauth_verifier={}",
            oauth::encode(token),
            oauth::encode(verifier)
        )),
        _ => None,
    };

    Ok(Html(state.templates.response(continue_url.as_deref(), false)?))
}

pub async fn access_token(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
) -> Result<Html<String>, AppError> {
    let token = query
        .oauth_token
        .ok_or_else(|| AppError::BadRequest("missing oauth_token".to_string()))?;
    let verifier = query
        .oauth_verifier
        .ok_or_else(|| AppError::BadRequest("missing oauth_verifier".to_string()))?;

    let Some(request) = state.pending.take(&token).await else {
        warn!("callback for unknown request token");
        return Err(AppError::UnknownRequestToken);
    };

    let access = state.twitter.access_token(&request, &verifier).await?;
    let user = state.twitter.verify_credentials(&access.credentials).await?;
    let stats = ProfileStats::compute(user.created_at, user.statuses_count, state.now())?;

    info!(
        screen_name = %user.screen_name,
        statuses_count = user.statuses_count,
        "rendering profile"
    );

    Ok(Html(state.templates.profile(&user, &stats)?))
}
