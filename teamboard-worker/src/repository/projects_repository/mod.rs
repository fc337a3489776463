mod dto;
mod entity;
mod projects_repository;
mod projects_repository_impl;

pub use dto::*;
pub use projects_repository::*;
pub use projects_repository_impl::*;
