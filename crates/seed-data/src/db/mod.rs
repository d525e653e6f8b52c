//! Database seeding.
//!
//! The [`Seeder`] runs schema initialization and every per-kind seed routine
//! inside one transaction opened on a [`SeedBackend`](crate::store::SeedBackend).

mod seeder;

pub use seeder::{
    KindSummary, SeedError, SeedSummary, Seeder, ensure_schema, seed_menu_items, seed_pages,
    seed_sections,
};
