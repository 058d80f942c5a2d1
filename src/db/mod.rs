//! Database layer
//!
//! SQLite-backed persistence for the Plumage blog system. The pool module
//! owns connection creation, migrations are embedded in the binary for
//! single-binary deployment, and repositories wrap all SQL behind traits.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};
