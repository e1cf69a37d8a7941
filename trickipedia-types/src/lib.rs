//! Shared domain types for the Trickipedia offline core.
//!
//! The local cache stores server rows as denormalized JSON snapshots. This
//! crate names the collections those snapshots live in, the filters used to
//! read them back, and typed views over the catalog records themselves.

mod catalog;
mod collection;
mod entry;

pub use catalog::{Category, CategoryRef, Subcategory, SubcategoryRef, Trick, UserProgressRecord};
pub use collection::{CacheCollection, CacheFilter, ParseCollectionError};
pub use entry::CacheEntry;

/// Metadata key under which the last successful full sync is recorded.
pub const LAST_SYNC_KEY: &str = "lastSync";
