//! Shared helpers for CLI tests.

mod fake_server;

pub(in crate::tests) use fake_server::{FakeServer, Reply};
