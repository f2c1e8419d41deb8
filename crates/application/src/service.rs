//! Identity service facade: one orchestration method per use case.

use std::sync::Arc;

use domain::{AggregateRoot, UserAggregate};
use outbox::{OutboxRelay, OutboxStore, Publisher};
use store::{
    TokenInfo, TxScope, UnitOfWork, UserDetails, UserListItem, UserReadStore, UserRepository,
};
use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::use_cases::{
    ActivateUserCommand, CreateUserCommand, CreateUserResponse, DeactivateUserCommand,
    GetUserByEmailQuery, GetUserListQuery, LoginUserCommand, UserStatusResponse,
};
use crate::{ActorContext, EXCHANGE, events};

/// Drives the identity use cases against a storage backend and the
/// transactional outbox.
///
/// Write use cases run as one atomic unit each: everything up to commit
/// either happens together or not at all, and publishing only starts
/// after commit. The cancellation token is honored before any durable
/// write; once commit begins it is ignored.
pub struct IdentityService<S, O, P>
where
    S: UserRepository + UserReadStore + UnitOfWork,
    O: OutboxStore,
    P: Publisher,
{
    store: S,
    relay: Arc<OutboxRelay<O, P>>,
}

impl<S, O, P> IdentityService<S, O, P>
where
    S: UserRepository + UserReadStore + UnitOfWork,
    O: OutboxStore,
    P: Publisher,
{
    /// Creates a new service over the given store and outbox relay.
    pub fn new(store: S, relay: Arc<OutboxRelay<O, P>>) -> Self {
        Self { store, relay }
    }

    /// Returns the outbox relay used by this service.
    pub fn relay(&self) -> &Arc<OutboxRelay<O, P>> {
        &self.relay
    }

    /// Registers a new user.
    #[tracing::instrument(skip(self, command, cancel), fields(username = %command.username))]
    pub async fn create_user(
        &self,
        command: CreateUserCommand,
        actor: &ActorContext,
        cancel: &CancellationToken,
    ) -> Result<CreateUserResponse, AppError> {
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        // Map the command to an aggregate; every field rule is checked
        // and all failures are reported together.
        let mut user = UserAggregate::create(
            &command.name,
            &command.email,
            &command.username,
            &command.password,
            &command.role,
        )?;

        // Cross-aggregate invariant. The unique index closes the race
        // between this check and the write.
        if self.store.email_exists(user.email().as_str()).await? {
            return Err(AppError::EmailAlreadyExists);
        }

        let response = CreateUserResponse::from_aggregate(&user);
        self.commit_and_flush(&mut user, actor, cancel).await?;
        metrics::counter!("users_created_total").increment(1);

        tracing::info!(user_id = %response.id, "user created");
        Ok(response)
    }

    /// Deactivates an active user.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn deactivate_user(
        &self,
        command: DeactivateUserCommand,
        actor: &ActorContext,
        cancel: &CancellationToken,
    ) -> Result<UserStatusResponse, AppError> {
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        let mut user = self
            .store
            .get_by_id(command.user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !actor.can_access(user.email().as_str()) {
            return Err(AppError::NotAuthorized);
        }

        user.deactivate()?;
        self.commit_and_flush(&mut user, actor, cancel).await?;
        metrics::counter!("users_deactivated_total").increment(1);

        Ok(UserStatusResponse::from_aggregate(&user))
    }

    /// Reactivates a deactivated user.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn activate_user(
        &self,
        command: ActivateUserCommand,
        actor: &ActorContext,
        cancel: &CancellationToken,
    ) -> Result<UserStatusResponse, AppError> {
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        let mut user = self
            .store
            .get_by_id(command.user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !actor.can_access(user.email().as_str()) {
            return Err(AppError::NotAuthorized);
        }

        user.activate()?;
        self.commit_and_flush(&mut user, actor, cancel).await?;
        metrics::counter!("users_activated_total").increment(1);

        Ok(UserStatusResponse::from_aggregate(&user))
    }

    /// Authenticates a user, returning the principal data for token
    /// issuance. Token minting itself happens at the API boundary.
    #[tracing::instrument(skip(self, command))]
    pub async fn login_user(&self, command: LoginUserCommand) -> Result<TokenInfo, AppError> {
        command.validate()?;

        self.store
            .get_token_info(&command.email, &command.password)
            .await?
            .ok_or(AppError::InvalidCredentials)
    }

    /// Looks up a user by email, enforcing that non-privileged callers
    /// only see their own record.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_user_by_email(
        &self,
        query: GetUserByEmailQuery,
        actor: &ActorContext,
    ) -> Result<UserDetails, AppError> {
        if !actor.can_access(&query.email) {
            return Err(AppError::NotAuthorized);
        }

        self.store
            .get_by_email(&query.email)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Lists active users per the structured filter/sort/page spec.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_user_list(
        &self,
        query: GetUserListQuery,
    ) -> Result<Vec<UserListItem>, AppError> {
        Ok(self.store.get_user_list(&query.to_spec()).await?)
    }

    /// Persists the aggregate and its integration events as one atomic
    /// unit, then flushes the outbox.
    async fn commit_and_flush(
        &self,
        user: &mut UserAggregate,
        actor: &ActorContext,
        cancel: &CancellationToken,
    ) -> Result<(), AppError> {
        // Last cancellation point: beyond here the transaction commits.
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        let mut scope = self.store.begin().await?;
        scope.persist_user(user).await?;

        for event in user.take_uncommitted_events() {
            if let Some(message) = events::to_outbox_message(&event, actor, EXCHANGE)? {
                scope.enqueue(message).await?;
            }
        }

        scope.commit().await?;

        // Publishing is decoupled from the transaction: a failure here
        // leaves the rows pending for the recovery sweep.
        if let Err(error) = self.relay.flush().await {
            tracing::error!(%error, "outbox flush failed; rows remain pending for recovery");
        }

        Ok(())
    }
}
