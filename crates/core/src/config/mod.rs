//! Configuration loading and schema definitions
//!
//! Project layout, tool locations, signing and packaging settings.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
