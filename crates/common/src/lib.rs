//! Common wire types and errors shared across `aetasaal-api` crates.

pub mod error;
pub mod protocol;

pub use error::ApiError;
