//! Mentora Core — domain models, error types, and the repository and
//! integration contracts shared by all crates.

pub mod error;
pub mod integrations;
pub mod models;
pub mod repository;

pub use error::{MentoraError, MentoraResult};
