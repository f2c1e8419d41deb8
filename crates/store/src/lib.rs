//! Persistence ports and storage implementations for the identity service.
//!
//! The ports (`UserRepository`, `UserReadStore`, `UnitOfWork`) are consumed
//! by the application layer; one concrete implementation exists per storage
//! technology (in-memory, PostgreSQL). The unit of work exposes the
//! transactional scope in which aggregate state and outbox rows are
//! co-committed.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod read_store;
pub mod repository;
pub mod uow;

pub use error::{Result, StoreError};
pub use memory::InMemoryIdentityStore;
pub use postgres::PostgresIdentityStore;
pub use query::{SortDirection, UserListQuery, UserSortField};
pub use read_store::{TokenInfo, UserDetails, UserListItem, UserReadStore};
pub use repository::UserRepository;
pub use uow::{TxScope, UnitOfWork};
