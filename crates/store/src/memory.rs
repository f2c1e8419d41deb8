use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::AggregateId;
use domain::{AggregateRoot, Password, Role, StoredUser, UserAggregate};
use outbox::{InMemoryOutboxStore, OutboxMessage, OutboxStore};
use tokio::sync::RwLock;

use crate::{
    Result, StoreError,
    query::{SortDirection, UserListQuery, UserSortField},
    read_store::{TokenInfo, UserDetails, UserListItem, UserReadStore},
    repository::UserRepository,
    uow::{TxScope, UnitOfWork},
};

/// In-memory identity store for testing and single-process use.
///
/// Implements the repository, the read store, and the unit of work over
/// the same shared state, mirroring how the PostgreSQL implementations
/// share one database. The email unique index is simulated at commit
/// time, closing the check-then-write race the same way the real index
/// does.
#[derive(Clone, Default)]
pub struct InMemoryIdentityStore {
    users: Arc<RwLock<HashMap<AggregateId, StoredUser>>>,
    outbox: InMemoryOutboxStore,
}

impl InMemoryIdentityStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the outbox store sharing this store's state.
    pub fn outbox(&self) -> InMemoryOutboxStore {
        self.outbox.clone()
    }

    /// Returns the number of stored users.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    fn rehydrate(stored: StoredUser) -> Result<UserAggregate> {
        UserAggregate::from_stored(stored).map_err(|e| StoreError::InvalidRecord(e.to_string()))
    }

    fn email_taken(users: &HashMap<AggregateId, StoredUser>, email: &str, except: AggregateId) -> bool {
        users
            .values()
            .any(|u| u.email == email && u.id != except)
    }
}

#[async_trait]
impl UserRepository for InMemoryIdentityStore {
    async fn email_exists(&self, email: &str) -> Result<bool> {
        let needle = email.to_lowercase();
        let users = self.users.read().await;
        Ok(users.values().any(|u| u.email == needle))
    }

    async fn get_by_id(&self, id: AggregateId) -> Result<Option<UserAggregate>> {
        let users = self.users.read().await;
        users.get(&id).cloned().map(Self::rehydrate).transpose()
    }

    async fn add(&self, user: &UserAggregate) -> Result<()> {
        let stored = user.to_stored();
        let mut users = self.users.write().await;
        if Self::email_taken(&users, &stored.email, user.id()) {
            return Err(StoreError::DuplicateEmail);
        }
        users.insert(stored.id, stored);
        Ok(())
    }

    async fn delete(&self, id: AggregateId) -> Result<()> {
        let mut users = self.users.write().await;
        users.remove(&id).ok_or(StoreError::UserNotFound(id))?;
        Ok(())
    }
}

#[async_trait]
impl UserReadStore for InMemoryIdentityStore {
    async fn get_by_email(&self, email: &str) -> Result<Option<UserDetails>> {
        let needle = email.to_lowercase();
        let users = self.users.read().await;
        let Some(stored) = users.values().find(|u| u.is_active && u.email == needle) else {
            return Ok(None);
        };

        Ok(Some(UserDetails {
            id: stored.id,
            name: stored.name.clone(),
            email: stored.email.clone(),
            username: stored.username.clone(),
            role: parse_role(&stored.role)?,
        }))
    }

    async fn get_user_list(&self, query: &UserListQuery) -> Result<Vec<UserListItem>> {
        let users = self.users.read().await;
        let mut matching: Vec<&StoredUser> = users
            .values()
            .filter(|u| u.is_active)
            .filter(|u| match &query.filter {
                Some(filter) => {
                    let pattern = filter.to_lowercase();
                    u.name.to_lowercase().contains(&pattern)
                        || u.username.to_lowercase().contains(&pattern)
                        || u.email.contains(&pattern)
                        || u.role.to_lowercase().contains(&pattern)
                }
                None => true,
            })
            .collect();

        if let Some((field, direction)) = query.sort {
            matching.sort_by(|a, b| {
                let ordering = match field {
                    UserSortField::Name => a.name.cmp(&b.name),
                    UserSortField::Username => a.username.cmp(&b.username),
                    UserSortField::Email => a.email.cmp(&b.email),
                    UserSortField::Role => a.role.cmp(&b.role),
                };
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        } else {
            // Deterministic order for unsorted queries.
            matching.sort_by_key(|u| u.created_at);
        }

        matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.page_size as usize)
            .map(|stored| {
                Ok(UserListItem {
                    id: stored.id,
                    name: stored.name.clone(),
                    email: stored.email.clone(),
                    username: stored.username.clone(),
                    role: parse_role(&stored.role)?,
                })
            })
            .collect()
    }

    async fn get_token_info(&self, email: &str, password: &str) -> Result<Option<TokenInfo>> {
        let needle = email.to_lowercase();
        let users = self.users.read().await;
        let Some(stored) = users.values().find(|u| u.email == needle) else {
            return Ok(None);
        };

        let hash = Password::from_hash(&stored.password_hash)
            .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
        if !hash.verify(password) {
            return Ok(None);
        }

        Ok(Some(TokenInfo {
            user_id: stored.id,
            name: stored.name.clone(),
            email: stored.email.clone(),
            username: stored.username.clone(),
            role: parse_role(&stored.role)?,
        }))
    }
}

fn parse_role(value: &str) -> Result<Role> {
    Role::create(value).map_err(|e| StoreError::InvalidRecord(e.to_string()))
}

/// Staged in-memory transaction.
///
/// Writes accumulate locally and become visible only at commit, applied
/// under a single write lock. Dropping the scope discards everything.
pub struct InMemoryTxScope {
    users: Arc<RwLock<HashMap<AggregateId, StoredUser>>>,
    outbox: InMemoryOutboxStore,
    staged_users: Vec<StoredUser>,
    staged_deletes: Vec<AggregateId>,
    staged_messages: Vec<OutboxMessage>,
}

#[async_trait]
impl UnitOfWork for InMemoryIdentityStore {
    type Scope = InMemoryTxScope;

    async fn begin(&self) -> Result<Self::Scope> {
        Ok(InMemoryTxScope {
            users: self.users.clone(),
            outbox: self.outbox.clone(),
            staged_users: Vec::new(),
            staged_deletes: Vec::new(),
            staged_messages: Vec::new(),
        })
    }
}

#[async_trait]
impl TxScope for InMemoryTxScope {
    async fn persist_user(&mut self, user: &UserAggregate) -> Result<()> {
        self.staged_users.push(user.to_stored());
        Ok(())
    }

    async fn delete_user(&mut self, id: AggregateId) -> Result<()> {
        self.staged_deletes.push(id);
        Ok(())
    }

    async fn enqueue(&mut self, message: OutboxMessage) -> Result<()> {
        self.staged_messages.push(message);
        Ok(())
    }

    async fn commit(self) -> Result<u64> {
        let mut users = self.users.write().await;

        // Unique email index, applied before anything becomes visible.
        for staged in &self.staged_users {
            if InMemoryIdentityStore::email_taken(&users, &staged.email, staged.id) {
                return Err(StoreError::DuplicateEmail);
            }
            let duplicate_staged = self
                .staged_users
                .iter()
                .filter(|other| other.email == staged.email)
                .count();
            if duplicate_staged > 1 {
                return Err(StoreError::DuplicateEmail);
            }
        }

        let count =
            (self.staged_users.len() + self.staged_deletes.len() + self.staged_messages.len()) as u64;

        for staged in self.staged_users {
            users.insert(staged.id, staged);
        }
        for id in self.staged_deletes {
            users.remove(&id);
        }
        for message in self.staged_messages {
            self.outbox.insert(message).await?;
        }

        Ok(count)
    }
}
