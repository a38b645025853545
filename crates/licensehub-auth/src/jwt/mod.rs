//! Seat session JWTs.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::SeatClaims;
pub use decoder::JwtDecoder;
pub use encoder::{JwtEncoder, SessionToken};
