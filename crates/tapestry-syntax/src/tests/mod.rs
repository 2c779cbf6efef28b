//! Crate-level tests for tapestry-syntax.
