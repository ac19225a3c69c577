//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Implements the student repository port on PostgreSQL via Diesel, with
//! async access through `diesel-async` and `bb8` connection pooling.
//!
//! - **Thin adapters**: the repository translates between row structs and
//!   domain types; transition rules live in the domain and are mirrored by
//!   conditional SQL.
//! - **Internal models**: row structs (`models.rs`) and the table definition
//!   (`schema.rs`) never leak into the domain layer.
//! - **Strongly typed errors**: pool and Diesel failures map onto
//!   `StudentRepositoryError`.
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, DieselStudentRepository, PoolConfig};
//!
//! run_pending_migrations("postgres://localhost/crm").await?;
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/crm")).await?;
//! let repo = DieselStudentRepository::new(pool);
//! ```

mod diesel_student_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_student_repository::DieselStudentRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{
    DEFAULT_CHECKOUT_TIMEOUT, DEFAULT_POOL_MAX_SIZE, DbPool, PoolConfig, PoolError,
};
