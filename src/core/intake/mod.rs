// Core intake module - the guided listing-submission conversation.

pub mod intake_fsm;
pub mod intake_service;

pub use intake_fsm::*;
pub use intake_service::*;
