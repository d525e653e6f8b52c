//! Navigation content seeding.
//!
//! This crate holds the navigation dataset (menus, pages, nav items, features,
//! home links, secondary menu items, social icons and footer sections), the
//! table definitions it is stored in, and a [`Seeder`](db::Seeder) that writes
//! it idempotently inside one transaction.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use seed_data::prelude::*;
//!
//! let pool = DatabaseConfig::from_env().connect().await?;
//! let summary = Seeder::new(PgBackend::new(pool))
//!     .run(&Dataset::builtin()?)
//!     .await?;
//! ```

pub mod config;
pub mod db;
pub mod models;
pub mod schema;
pub mod store;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::{DatabaseConfig, SeedConfig};
    pub use crate::db::{KindSummary, SeedError, SeedSummary, Seeder};
    pub use crate::models::Dataset;
    pub use crate::schema::Table;
    pub use crate::store::{MemoryBackend, PgBackend, SeedBackend, SeedStore};
}
