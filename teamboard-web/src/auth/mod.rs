mod dto;
mod jwt_authorization_validator;
mod jwt_decoder;
mod util;


pub use dto::User;
pub use jwt_authorization_validator::JwtAuthorizationValidator;
pub use jwt_decoder::JwtDecoder;
pub use util::{parse_jwt_algorithms, parse_jwt_key};
