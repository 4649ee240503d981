//! PostgreSQL content store.
//!
//! Implements [`circle_core::ContentStore`] over the `page_registry`,
//! `localities`, `events` and `deals` tables. Reads select a fixed column list
//! per table and return each row as `jsonb`, which is then decoded through the
//! normalizing deserializers of the core model. Rows that fail to decode are
//! logged and dropped.

pub mod columns;
mod query;
mod store;

pub use store::{PgConfig, PgStore, DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_MAX_CONNECTIONS};
