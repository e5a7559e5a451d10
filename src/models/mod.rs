pub mod account;
pub mod direction;
pub mod trade;

pub use account::{AccountSnapshot, OpenPosition};
pub use direction::*;
pub use trade::Trade;
