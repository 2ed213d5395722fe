//! Account directory: models, service facade, and HTTP router.

pub mod model;
pub mod router;
pub mod service;

pub use model::{Role, User};
pub use router::user_router;
pub use service::{UserService, UserServiceError, USERS_COLLECTION};
