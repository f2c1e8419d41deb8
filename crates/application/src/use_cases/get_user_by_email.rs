//! User-by-email query types.

use serde::Deserialize;

/// Query for a single user's details by email.
///
/// Subject to the request-scoped authorization check: a non-privileged
/// caller may only query their own record.
#[derive(Debug, Clone, Deserialize)]
pub struct GetUserByEmailQuery {
    pub email: String,
}
