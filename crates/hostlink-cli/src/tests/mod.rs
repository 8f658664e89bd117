//! CLI test suites.

mod support;
