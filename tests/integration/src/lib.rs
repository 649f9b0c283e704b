//! Integration test utilities for the scout workspace
//!
//! Helpers for building service contexts (in memory, or PostgreSQL when
//! `DATABASE_URL` is set) and for generating competition fixtures.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
