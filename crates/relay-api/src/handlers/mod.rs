//! API request handlers.

pub mod health;
pub mod send;

pub use health::*;
pub use send::*;
