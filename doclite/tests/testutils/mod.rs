//! Test utilities for DocLite integration tests
//!
//! TestFixture loads a small multilingual page tree into a repository and
//! wires a document manager over it.

pub mod test_fixture;
