//! Round persistence for the crash signal pipeline.
//!
//! This crate provides:
//! - A bounded in-memory store
//! - An append-only CSV store for durable history
//! - CSV import for offline replay and analysis

pub mod csv_store;
pub mod memory_store;

pub use csv_store::{read_rounds, CsvRoundStore};
pub use memory_store::{MemoryRoundStore, DEFAULT_RETENTION};
