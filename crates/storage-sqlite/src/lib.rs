//! SQLite storage implementation for Stockdice.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the store traits defined in `stockdice-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations for the five fact tables
//! - The record repository (freshness stamps, upserts, sweeps, universe reads)
//! - Replica backups via `VACUUM INTO`
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! `core` is database-agnostic and works with traits.
//!
//! ```text
//!          core (domain)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod records;
pub mod schema;

// Re-export database utilities
pub use db::{
    backup_database, create_pool, get_connection, init, run_migrations, spawn_writer,
    DbConnection, DbPool, WriteHandle,
};

pub use records::RecordRepository;

// Re-export storage errors
pub use errors::{IntoCore, StorageError};

// Re-export core error types for convenience
pub use stockdice_core::errors::{DatabaseError, Error, Result};
