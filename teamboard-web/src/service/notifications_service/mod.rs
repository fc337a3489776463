mod dto;
mod membership_diff;
mod notifications_service;
mod notifications_service_impl;

pub use dto::*;
pub use membership_diff::*;
pub use notifications_service::*;
pub use notifications_service_impl::*;
