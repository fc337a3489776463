mod memberships_repository;
mod memberships_repository_impl;

pub use memberships_repository::*;
pub use memberships_repository_impl::*;
