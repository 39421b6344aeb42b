//! Tubely database layer
//!
//! Video records live in Postgres. Everything above this crate talks to the
//! `VideoStore` trait so the HTTP layer and the ingest pipeline can run against
//! an in-memory store in tests.

pub mod db;
pub mod migrate;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;

pub use db::{get_owned_video, VideoRepository, VideoStore};
pub use migrate::run_migrations;
