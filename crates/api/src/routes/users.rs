//! User registration, login, listing, and account-status endpoints.

use std::sync::Arc;

use application::use_cases::{
    ActivateUserCommand, CreateUserCommand, CreateUserResponse, DeactivateUserCommand,
    GetUserByEmailQuery, GetUserListQuery, LoginUserCommand, UserStatusResponse,
};
use application::IdentityService;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use common::AggregateId;
use domain::Role;
use outbox::{OutboxStore, Publisher};
use serde::{Deserialize, Serialize};
use store::{UnitOfWork, UserReadStore, UserRepository};
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;
use crate::token::JwtTokenProvider;

/// Shared application state accessible from all handlers.
pub struct AppState<S, O, P>
where
    S: UserRepository + UserReadStore + UnitOfWork,
    O: OutboxStore,
    P: Publisher,
{
    pub service: IdentityService<S, O, P>,
    pub tokens: JwtTokenProvider,
}

impl<S, O, P> AppState<S, O, P>
where
    S: UserRepository + UserReadStore + UnitOfWork,
    O: OutboxStore,
    P: Publisher,
{
    fn actor(&self, headers: &HeaderMap) -> application::ActorContext {
        let header = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        self.tokens.actor_from_header(header)
    }
}

// -- Request/response types --

#[derive(Deserialize)]
pub struct ListParams {
    pub filter: Option<String>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct UserItemResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub username: String,
    pub role: Role,
}

// -- Handlers --

/// POST /users — register a new user.
#[tracing::instrument(skip_all)]
pub async fn create<S, O, P>(
    State(state): State<Arc<AppState<S, O, P>>>,
    headers: HeaderMap,
    Json(command): Json<CreateUserCommand>,
) -> Result<(axum::http::StatusCode, Json<CreateUserResponse>), ApiError>
where
    S: UserRepository + UserReadStore + UnitOfWork + Send + Sync,
    O: OutboxStore,
    P: Publisher,
{
    let actor = state.actor(&headers);
    let response = state
        .service
        .create_user(command, &actor, &CancellationToken::new())
        .await?;
    Ok((axum::http::StatusCode::CREATED, Json(response)))
}

/// POST /login — authenticate and mint an access token.
#[tracing::instrument(skip_all)]
pub async fn login<S, O, P>(
    State(state): State<Arc<AppState<S, O, P>>>,
    Json(command): Json<LoginUserCommand>,
) -> Result<Json<LoginResponse>, ApiError>
where
    S: UserRepository + UserReadStore + UnitOfWork + Send + Sync,
    O: OutboxStore,
    P: Publisher,
{
    let info = state.service.login_user(command).await?;
    let token = state
        .tokens
        .create(&info)
        .map_err(|e| ApiError::Internal(format!("token creation failed: {e}")))?;
    Ok(Json(LoginResponse {
        token,
        email: info.email,
    }))
}

/// GET /users — list active users with filter/sort/paging.
#[tracing::instrument(skip_all)]
pub async fn list<S, O, P>(
    State(state): State<Arc<AppState<S, O, P>>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<UserItemResponse>>, ApiError>
where
    S: UserRepository + UserReadStore + UnitOfWork + Send + Sync,
    O: OutboxStore,
    P: Publisher,
{
    let query = GetUserListQuery {
        filter: params.filter,
        sort_by: params.sort_by,
        sort_direction: params.sort_direction,
        page: params.page,
        page_size: params.page_size,
    };

    let listing = state.service.get_user_list(query).await?;
    let body = listing
        .into_iter()
        .map(|u| UserItemResponse {
            id: u.id.to_string(),
            name: u.name,
            email: u.email,
            username: u.username,
            role: u.role,
        })
        .collect();
    Ok(Json(body))
}

/// GET /users/by-email/{email} — look up a user by email.
#[tracing::instrument(skip_all)]
pub async fn get_by_email<S, O, P>(
    State(state): State<Arc<AppState<S, O, P>>>,
    headers: HeaderMap,
    Path(email): Path<String>,
) -> Result<Json<UserItemResponse>, ApiError>
where
    S: UserRepository + UserReadStore + UnitOfWork + Send + Sync,
    O: OutboxStore,
    P: Publisher,
{
    let actor = state.actor(&headers);
    let details = state
        .service
        .get_user_by_email(GetUserByEmailQuery { email }, &actor)
        .await?;
    Ok(Json(UserItemResponse {
        id: details.id.to_string(),
        name: details.name,
        email: details.email,
        username: details.username,
        role: details.role,
    }))
}

/// POST /users/{id}/deactivate — deactivate an account.
#[tracing::instrument(skip_all)]
pub async fn deactivate<S, O, P>(
    State(state): State<Arc<AppState<S, O, P>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<UserStatusResponse>, ApiError>
where
    S: UserRepository + UserReadStore + UnitOfWork + Send + Sync,
    O: OutboxStore,
    P: Publisher,
{
    let user_id = parse_user_id(&id)?;
    let actor = state.actor(&headers);
    let response = state
        .service
        .deactivate_user(
            DeactivateUserCommand { user_id },
            &actor,
            &CancellationToken::new(),
        )
        .await?;
    Ok(Json(response))
}

/// POST /users/{id}/activate — reactivate an account.
#[tracing::instrument(skip_all)]
pub async fn activate<S, O, P>(
    State(state): State<Arc<AppState<S, O, P>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<UserStatusResponse>, ApiError>
where
    S: UserRepository + UserReadStore + UnitOfWork + Send + Sync,
    O: OutboxStore,
    P: Publisher,
{
    let user_id = parse_user_id(&id)?;
    let actor = state.actor(&headers);
    let response = state
        .service
        .activate_user(
            ActivateUserCommand { user_id },
            &actor,
            &CancellationToken::new(),
        )
        .await?;
    Ok(Json(response))
}

fn parse_user_id(raw: &str) -> Result<AggregateId, ApiError> {
    AggregateId::parse(raw).map_err(|e| ApiError::BadRequest(format!("invalid user id: {e}")))
}
