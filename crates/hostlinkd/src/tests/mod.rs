//! Daemon test suites.

mod support;
