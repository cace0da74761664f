//! Service Layer
//!
//! Business logic that spans several storage operations, kept out of the
//! route handlers so it can be exercised directly against any store.

mod calendar_service;

pub use calendar_service::*;
