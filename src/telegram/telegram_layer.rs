// Telegram layer - thin adapters between teloxide updates and the core
// services. No business logic lives here.

#[path = "commands.rs"]
pub mod commands;

#[path = "handlers.rs"]
pub mod handlers;

#[path = "publisher.rs"]
pub mod publisher;

#[path = "texts.rs"]
pub mod texts;

use crate::core::intake::IntakeService;
use crate::core::listings::ApprovalWorkflow;
use crate::core::moderation::ModerationPipeline;
use crate::infra::{SqliteListingStore, SqliteOffenderStore};
use publisher::TelegramPublisher;
use teloxide::types::ChatId;

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Chat identities the bot is wired to.
#[derive(Debug, Clone, Copy)]
pub struct BotConfig {
    /// The single designated administrator.
    pub admin_id: i64,
    /// The moderated discussion group.
    pub group_chat: ChatId,
    /// The channel approved listings are published to.
    pub channel_chat: ChatId,
}

/// Shared state handed to every handler by the dispatcher.
pub struct AppContext {
    pub moderation: ModerationPipeline<SqliteOffenderStore>,
    pub intake: IntakeService<SqliteListingStore>,
    pub workflow: ApprovalWorkflow<SqliteListingStore, TelegramPublisher>,
    pub listings: SqliteListingStore,
    pub config: BotConfig,
}

impl AppContext {
    pub fn is_admin(&self, user_id: i64) -> bool {
        user_id == self.config.admin_id
    }
}
