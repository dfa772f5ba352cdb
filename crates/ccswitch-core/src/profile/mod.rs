//! Profile types and operations

mod types;

pub use types::*;
