mod pagination;
mod websocket_token;

pub use pagination::*;
pub use websocket_token::*;
