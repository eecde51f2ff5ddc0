// Core listings module - the classified-ad record, its persistent store
// port and the admin approval workflow.

pub mod listing_models;
pub mod listing_service;

pub use listing_models::*;
pub use listing_service::*;
