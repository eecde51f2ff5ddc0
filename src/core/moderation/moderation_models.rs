// Moderation domain models - pure types with no transport dependencies.
// The Telegram layer converts these into actual API calls.

use crate::core::moderation::geo::Coordinate;

/// Why a message was flagged as a counted violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// Content unrelated to real-estate listings.
    OffTopic,
    /// Names an excluded city or carries a coordinate outside the region.
    OutsideRegion,
}

impl ViolationKind {
    /// Stable identifier persisted in the offender ledger.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::OffTopic => "off-topic",
            ViolationKind::OutsideRegion => "outside-region",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the transport layer should do with an inbound group message.
#[derive(Debug, Clone, PartialEq)]
pub enum ModerationAction {
    /// Message passes - nothing to do.
    Allow,
    /// Missing license token: delete the message and privately point the
    /// sender at the posting rules. Not counted against the sender.
    DeleteWithNotice,
    /// Counted violation: delete, restrict the sender for `restrict_secs`
    /// and tell them why in private.
    DeleteAndRestrict {
        kind: ViolationKind,
        violation_count: u32,
        restrict_secs: u64,
    },
}

/// An inbound group message reduced to what moderation needs.
#[derive(Debug, Clone, Default)]
pub struct InboundPost {
    pub sender_id: i64,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub coordinate: Option<Coordinate>,
}

impl InboundPost {
    /// The union of text and caption the classifier runs over.
    pub fn content(&self) -> String {
        match (&self.text, &self.caption) {
            (Some(t), Some(c)) => format!("{t}\n{c}"),
            (Some(t), None) => t.clone(),
            (None, Some(c)) => c.clone(),
            (None, None) => String::new(),
        }
    }
}
