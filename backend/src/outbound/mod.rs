//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory**: process-local student store, used when no database is
//!   configured and by tests.
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM.
//!
//! Adapters are thin translators between domain types and storage
//! representations. The only logic they carry is the atomicity of each
//! repository call.

pub mod memory;
pub mod persistence;
