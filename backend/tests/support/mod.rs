//! Shared helpers for backend integration tests that need PostgreSQL.
//!
//! Integration tests compile as separate crates, so helpers used by more
//! than one suite live here and are pulled in with `mod support;`.

pub mod cluster_skip;
pub mod embedded_postgres;

pub use cluster_skip::handle_cluster_setup_failure;
pub use embedded_postgres::{drop_students_table, provision_template_database};
