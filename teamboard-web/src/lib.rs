//!
//! Real-time notifications for the teamboard admin tool.
//!
//! Business operations call [service::notifications_service::NotificationsService]
//! triggers, connected clients receive pushes over websocket.
//!

pub mod application;
pub mod auth;
pub mod dto;
pub mod error;
pub mod repository;
pub mod routing;
pub mod service;
