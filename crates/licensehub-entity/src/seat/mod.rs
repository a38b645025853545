//! Seat entities.

pub mod model;
pub mod role;

pub use model::{NewSeat, SeatRecord};
pub use role::SeatRole;
