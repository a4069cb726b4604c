//! Core data types for the token band monitor.

pub mod band;
pub mod chain;
pub mod error;
pub mod price;
pub mod token;

pub use band::*;
pub use chain::*;
pub use error::*;
pub use price::*;
pub use token::*;
