//! Crate-wide error handling and small shared constants.

mod constants;
mod error;

pub use constants::*;
pub use error::{Error, Result};
