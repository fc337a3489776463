mod error;
mod memberships_repository;
mod notifications_repository;


pub use error::*;
pub use memberships_repository::*;
pub use notifications_repository::*;
