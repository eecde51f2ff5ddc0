// Approval workflow - admin-facing listing lifecycle operations.
//
// Publication and submitter notification go through the `ListingPublisher`
// port so the workflow stays free of Telegram types. Transport failures are
// logged and swallowed; the status transition itself is what must not be
// lost.

use super::listing_models::{Listing, ListingStatus, NewListing, SearchFilter};
use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("listing {0} not found")]
    NotFound(i64),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Delivery toward the publication channel or the submitter failed.
#[derive(Debug, Error)]
#[error("transport failure: {0}")]
pub struct PublishError(pub String);

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Outcome of a status transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Changed,
    /// The record was already in the requested status; nothing written.
    AlreadySet,
}

/// Persistent repository of listing records.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Insert a new pending listing and return its assigned id.
    async fn create(&self, listing: NewListing) -> Result<i64, ListingError>;

    async fn get(&self, id: i64) -> Result<Option<Listing>, ListingError>;

    /// Move a listing to `status`. Redundant transitions are reported, not
    /// errors. `NotFound` if the id does not exist.
    async fn set_status(&self, id: i64, status: ListingStatus)
        -> Result<StatusChange, ListingError>;

    /// A user's own submissions, most recent first.
    async fn list_by_owner(&self, owner_id: i64, limit: u32) -> Result<Vec<Listing>, ListingError>;

    /// Listings awaiting review, most recent first.
    async fn list_pending(&self, limit: u32) -> Result<Vec<Listing>, ListingError>;

    /// Approved listings matching `filter`, most recent first, capped at
    /// `limit`.
    async fn search(&self, filter: &SearchFilter, limit: u32) -> Result<Vec<Listing>, ListingError>;
}

// ============================================================================
// PUBLISHER TRAIT (PORT)
// ============================================================================

/// What a submitter is told about their listing.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitterNote {
    Approved,
    Rejected { reason: String },
}

/// Outbound side of the workflow: pushing an approved listing to the channel
/// and notifying the submitter.
#[async_trait]
pub trait ListingPublisher: Send + Sync {
    /// Publish the rendered caption and attached media.
    async fn publish(&self, listing: &Listing) -> Result<(), PublishError>;

    /// Tell the submitter what happened to their listing.
    async fn notify_submitter(&self, listing: &Listing, note: SubmitterNote)
        -> Result<(), PublishError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Outcome of an approve request, surfaced to the admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApproveOutcome {
    Approved,
    /// Redundant call; no second publication happened.
    AlreadyApproved,
}

pub struct ApprovalWorkflow<S: ListingStore, P: ListingPublisher> {
    store: S,
    publisher: P,
}

impl<S: ListingStore, P: ListingPublisher> ApprovalWorkflow<S, P> {
    pub fn new(store: S, publisher: P) -> Self {
        Self { store, publisher }
    }

    /// Publish the listing and mark it approved. Publishing exactly once is
    /// guarded by the status check: an already-approved listing is reported
    /// and left alone.
    pub async fn approve(&self, id: i64) -> Result<ApproveOutcome, ListingError> {
        let listing = self
            .store
            .get(id)
            .await?
            .ok_or(ListingError::NotFound(id))?;

        if listing.status == ListingStatus::Approved {
            return Ok(ApproveOutcome::AlreadyApproved);
        }

        if let Err(err) = self.publisher.publish(&listing).await {
            tracing::warn!(listing_id = id, "failed to publish listing: {}", err);
        }

        self.store.set_status(id, ListingStatus::Approved).await?;

        if let Err(err) = self
            .publisher
            .notify_submitter(&listing, SubmitterNote::Approved)
            .await
        {
            tracing::warn!(listing_id = id, "failed to notify submitter: {}", err);
        }

        Ok(ApproveOutcome::Approved)
    }

    /// Mark the listing rejected regardless of its current status and notify
    /// the submitter. Safe to call repeatedly.
    pub async fn reject(&self, id: i64, reason: Option<String>) -> Result<(), ListingError> {
        let listing = self
            .store
            .get(id)
            .await?
            .ok_or(ListingError::NotFound(id))?;

        self.store.set_status(id, ListingStatus::Rejected).await?;

        let reason = reason.unwrap_or_else(|| "not specified".to_string());
        if let Err(err) = self
            .publisher
            .notify_submitter(&listing, SubmitterNote::Rejected { reason })
            .await
        {
            tracing::warn!(listing_id = id, "failed to notify submitter: {}", err);
        }

        Ok(())
    }

    /// Listings awaiting review, for the admin queue.
    pub async fn pending(&self, limit: u32) -> Result<Vec<Listing>, ListingError> {
        self.store.list_pending(limit).await
    }
}

// ============================================================================
// TESTS
// ============================================================================
