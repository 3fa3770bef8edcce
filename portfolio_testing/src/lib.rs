//! Fake upstream services for local development and integration tests.

pub mod telegram;
