//! Core types shared across the crate

pub mod error;
pub(crate) mod fs;

pub use error::{GeopermsError, GeopermsResult};
