// Moderation pipeline - core business logic for classifying inbound group
// messages and escalating penalties for repeat offenders.
//
// NO Telegram dependencies here - just pure domain logic over the
// classifier, the geofence and the offender ledger.

use super::classifier::ContentClassifier;
use super::geo::RegionConfig;
use super::moderation_models::{InboundPost, ModerationAction, ViolationKind};
use super::penalty;
use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("storage error: {0}")]
    Storage(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Persistent per-user violation ledger.
///
/// Counts strictly increase and never reset; increments for the same user
/// must be serialized so concurrent violations are never lost.
#[async_trait]
pub trait OffenderStore: Send + Sync {
    /// Atomically bump the violation counter for `user_id`, persisting the
    /// reason and a timestamp, and return the new total.
    async fn record_violation(&self, user_id: i64, reason: &str) -> Result<u32, ModerationError>;

    /// Current violation total for `user_id` (0 if the user has no record).
    async fn violation_count(&self, user_id: i64) -> Result<u32, ModerationError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Classifies one inbound group message and decides what to do with it.
///
/// Rules run in fixed precedence order; the first match wins and everything
/// below it is skipped for that message.
pub struct ModerationPipeline<S: OffenderStore> {
    store: S,
    classifier: ContentClassifier,
    region: RegionConfig,
    admin_id: i64,
}

impl<S: OffenderStore> ModerationPipeline<S> {
    pub fn new(store: S, classifier: ContentClassifier, region: RegionConfig, admin_id: i64) -> Self {
        Self {
            store,
            classifier,
            region,
            admin_id,
        }
    }

    /// Run the precedence chain over one message:
    ///
    /// 1. admin posts are always allowed,
    /// 2. off-topic content is a counted violation,
    /// 3. excluded-city mention or out-of-region coordinate is a counted
    ///    violation,
    /// 4. a missing license token is a soft violation (delete + notice only),
    /// 5. everything else passes.
    pub async fn check_post(&self, post: &InboundPost) -> Result<ModerationAction, ModerationError> {
        if post.sender_id == self.admin_id {
            return Ok(ModerationAction::Allow);
        }

        let content = post.content();

        if self.classifier.is_off_topic(&content) {
            return self.flag(post.sender_id, ViolationKind::OffTopic).await;
        }

        let outside = post
            .coordinate
            .map(|point| !self.region.within_region(point))
            .unwrap_or(false);
        if self.classifier.mentions_excluded_city(&content) || outside {
            return self.flag(post.sender_id, ViolationKind::OutsideRegion).await;
        }

        if !self.classifier.has_license_token(&content) {
            return Ok(ModerationAction::DeleteWithNotice);
        }

        Ok(ModerationAction::Allow)
    }

    async fn flag(
        &self,
        user_id: i64,
        kind: ViolationKind,
    ) -> Result<ModerationAction, ModerationError> {
        let violation_count = self.store.record_violation(user_id, kind.as_str()).await?;
        let restrict_secs = penalty::duration_for(violation_count);

        tracing::info!(
            user_id,
            kind = kind.as_str(),
            violation_count,
            restrict_secs,
            "recorded violation"
        );

        Ok(ModerationAction::DeleteAndRestrict {
            kind,
            violation_count,
            restrict_secs,
        })
    }

    /// Violation total for a user, for admin inspection.
    #[allow(dead_code)]
    pub async fn offender_count(&self, user_id: i64) -> Result<u32, ModerationError> {
        self.store.violation_count(user_id).await
    }
}

// ============================================================================
// TESTS
// ============================================================================
