// This is the entry point of the listing-moderation bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (SQLite stores)
// - `telegram/` = Telegram-specific adapters (commands, handlers)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the teloxide dispatcher
// 4. Spawn the recurring policy reminder

// Each layer's module tree is rooted at a descriptively named file instead
// of yet another mod.rs.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;
#[path = "telegram/telegram_layer.rs"]
mod telegram;

use crate::core::intake::IntakeService;
use crate::core::listings::ApprovalWorkflow;
use crate::core::moderation::{
    ClassifierConfig, ContentClassifier, ModerationPipeline, RegionConfig,
};
use crate::infra::{SqliteListingStore, SqliteOffenderStore};
use crate::telegram::commands::{self, Command};
use crate::telegram::publisher::TelegramPublisher;
use crate::telegram::{handlers, texts, AppContext, BotConfig};
use std::sync::Arc;
use teloxide::prelude::*;

/// How often the policy reminder is posted to the group.
const REMINDER_INTERVAL_SECS: u64 = 6 * 60 * 60;
/// Grace period before the first reminder after startup.
const REMINDER_INITIAL_DELAY_SECS: u64 = 60;

fn env_i64(name: &str) -> i64 {
    std::env::var(name)
        .unwrap_or_else(|_| panic!("Missing {} environment variable!", name))
        .parse()
        .unwrap_or_else(|_| panic!("{} must be an integer chat/user id", name))
}

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let admin_id = env_i64("ADMIN_USER_ID");
    let group_chat = ChatId(env_i64("GROUP_CHAT_ID"));
    let channel_chat = ChatId(env_i64("CHANNEL_CHAT_ID"));

    // Keep the runtime database in a dedicated folder so the repo root stays
    // tidy.
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
    std::fs::create_dir_all(&data_dir).expect("Failed to create data directory for SQLite files");
    let db_path = format!("{}/listings.db", data_dir);

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Build the stores, then the services on top of them.

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .connect(&format!("sqlite://{}?mode=rwc", db_path))
        .await
        .expect("Failed to connect to SQLite database");

    let listing_store = SqliteListingStore::new(pool.clone());
    listing_store
        .migrate()
        .await
        .expect("Failed to migrate listings table");

    let offender_store = SqliteOffenderStore::new(pool);
    offender_store
        .migrate()
        .await
        .expect("Failed to migrate offender ledger");

    // Classification vocabularies ship with Saudi defaults; a deployment can
    // override them with a JSON file.
    let classifier_config = if let Ok(path) = std::env::var("MODERATION_VOCAB_FILE") {
        match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Bad vocabulary file at {}: {}; using defaults", path, e);
                ClassifierConfig::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read vocabulary file at {}: {}; using defaults", path, e);
                ClassifierConfig::default()
            }
        }
    } else {
        ClassifierConfig::default()
    };
    let classifier =
        ContentClassifier::new(classifier_config).expect("Failed to compile classifier patterns");

    // Reads TELOXIDE_TOKEN.
    let bot = Bot::from_env();

    let moderation =
        ModerationPipeline::new(offender_store, classifier, RegionConfig::default(), admin_id);
    let intake = IntakeService::new(listing_store.clone());
    let publisher = TelegramPublisher::new(bot.clone(), channel_chat);
    let workflow = ApprovalWorkflow::new(listing_store.clone(), publisher);

    let ctx = Arc::new(AppContext {
        moderation,
        intake,
        workflow,
        listings: listing_store,
        config: BotConfig {
            admin_id,
            group_chat,
            channel_chat,
        },
    });

    // ========================================================================
    // BACKGROUND REMINDER
    // ========================================================================
    // Fire-and-forget: posts the policy reminder to the group every six
    // hours. Never touches handler state.

    let reminder_bot = bot.clone();
    tokio::spawn(async move {
        use std::time::Duration as StdDuration;
        use tokio::time::sleep;

        sleep(StdDuration::from_secs(REMINDER_INITIAL_DELAY_SECS)).await;
        loop {
            if let Err(err) = reminder_bot.send_message(group_chat, texts::REMINDER).await {
                tracing::warn!("Failed to post policy reminder: {}", err);
            }
            sleep(StdDuration::from_secs(REMINDER_INTERVAL_SECS)).await;
        }
    });

    // ========================================================================
    // DISPATCHER SETUP
    // ========================================================================

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(commands::handle_command),
        )
        .branch(Update::filter_message().endpoint(handlers::handle_message))
        .branch(Update::filter_my_chat_member().endpoint(handlers::handle_chat_member_update));

    tracing::info!("🤖 Listing bot is starting up...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![Arc::clone(&ctx)])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
