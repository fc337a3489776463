mod error;
mod projects_repository;


pub use error::*;
pub use projects_repository::*;
