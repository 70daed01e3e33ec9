//! Core business logic for coterie.

pub mod services;

pub use services::*;
