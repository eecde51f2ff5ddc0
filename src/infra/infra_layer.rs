// The infra module contains implementations of core traits.
// Both stores share one SQLite database file.

#[path = "listings/sqlite_listing_store.rs"]
pub mod listings;

#[path = "moderation/sqlite_offender_store.rs"]
pub mod moderation;

pub use listings::SqliteListingStore;
pub use moderation::SqliteOffenderStore;
