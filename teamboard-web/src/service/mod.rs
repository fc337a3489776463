pub mod notifications_service;
pub mod relay;
pub mod websockets_service;
