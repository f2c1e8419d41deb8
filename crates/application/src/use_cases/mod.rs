//! Command and query types, one module per use case.

pub mod account_status;
pub mod create_user;
pub mod get_user_by_email;
pub mod get_user_list;
pub mod login_user;

pub use account_status::{ActivateUserCommand, DeactivateUserCommand, UserStatusResponse};
pub use create_user::{CreateUserCommand, CreateUserResponse};
pub use get_user_by_email::GetUserByEmailQuery;
pub use get_user_list::GetUserListQuery;
pub use login_user::LoginUserCommand;
