//! REST API module.
//!
//! `GET`/`PUT /api/locations` read and replace the stored collection. Success
//! bodies are plain JSON; failures use [`crate::errors::ErrorResponse`].

mod locations;

pub use locations::*;
