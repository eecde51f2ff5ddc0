// Core moderation module - geofence, content classification and the
// escalating-penalty pipeline over the offender ledger.

pub mod classifier;
pub mod geo;
pub mod moderation_models;
pub mod moderation_service;
pub mod penalty;

pub use classifier::*;
pub use geo::*;
pub use moderation_models::*;
pub use moderation_service::*;
