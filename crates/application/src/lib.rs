//! Use-case orchestration for the identity service.
//!
//! Each write use case drives one atomic unit: map the command to an
//! aggregate operation, validate cross-aggregate invariants against the
//! repository, persist through the unit of work, map recorded domain
//! events to integration events, enqueue them into the transactional
//! outbox within the same scope, commit, then flush the outbox. Read use
//! cases bypass this pipeline and only query.

pub mod context;
pub mod error;
pub mod events;
pub mod service;
pub mod use_cases;

pub use context::ActorContext;
pub use error::AppError;
pub use events::{EventContext, IntegrationEvent, map_to_integration};
pub use service::IdentityService;

/// Name of this service as carried in published envelopes.
pub const SERVICE_NAME: &str = "identity-service";

/// Logical exchange this service publishes to.
pub const EXCHANGE: &str = "identity";
