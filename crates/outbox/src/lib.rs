//! Transactional outbox for at-least-once integration event delivery.
//!
//! Outbox rows are written in the same database transaction as the aggregate
//! state they originate from, then published to the broker after commit. A
//! crash between commit and publish loses nothing: the row stays `pending`
//! and is picked up by the recovery sweep. Publishing retries transient
//! failures with a bounded cooldown sequence and dead-letters the message
//! once the budget is exhausted.

pub mod error;
pub mod memory;
pub mod message;
pub mod postgres;
pub mod publisher;
pub mod relay;
pub mod retry;
pub mod status;
pub mod store;

pub use error::{OutboxError, Result};
pub use memory::InMemoryOutboxStore;
pub use message::{MessageId, OutboxMessage, OutboxMessageBuilder};
pub use postgres::PostgresOutboxStore;
pub use publisher::{InMemoryPublisher, LoggingPublisher, PublishError, Publisher, exchange_name};
pub use relay::{FlushSummary, OutboxRelay};
pub use retry::RetryPolicy;
pub use status::OutboxStatus;
pub use store::OutboxStore;
