// Telegram commands - translation between command text and core operations.
//
// Every handler follows the same shape: pull primitive data out of the
// Telegram types, call a core service, format the result. No business
// logic lives on this side.

use super::texts;
use super::{handlers, AppContext, HandlerResult};
use crate::core::intake::strip_to_digits;
use crate::core::listings::{ApproveOutcome, DealKind, ListingError, ListingStore, SearchFilter};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

/// Result rows shown to a user at once.
const LIST_LIMIT: u32 = 10;
/// Pending-queue rows shown to the admin at once.
const PENDING_LIMIT: u32 = 20;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "snake_case", description = "الأوامر المتاحة:")]
pub enum Command {
    #[command(description = "بدء استخدام البوت")]
    Start,
    #[command(description = "عرض معرف المحادثة الحالية")]
    Whereami,
    #[command(description = "تثبيت قوانين المجموعة (للمشرف)")]
    PinPolicy,
    #[command(description = "تقديم إعلان عقاري جديد")]
    New,
    #[command(description = "عرض إعلاناتك")]
    MyListings,
    #[command(description = "البحث في الإعلانات المعتمدة")]
    Search(String),
    #[command(description = "الإعلانات بانتظار المراجعة (للمشرف)")]
    Pending,
    #[command(description = "اعتماد إعلان (للمشرف)")]
    Approve(String),
    #[command(description = "رفض إعلان (للمشرف)")]
    Reject(String),
}

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    ctx: Arc<AppContext>,
) -> HandlerResult {
    let user_id = match msg.from.as_ref() {
        Some(user) => user.id.0 as i64,
        None => return Ok(()),
    };
    let chat_id = msg.chat.id;

    match cmd {
        Command::Start => {
            bot.send_message(chat_id, texts::START).await?;
        }

        Command::Whereami => {
            let chat = &msg.chat;
            let kind = if chat.is_private() {
                "private"
            } else if chat.is_group() {
                "group"
            } else if chat.is_supergroup() {
                "supergroup"
            } else {
                "channel"
            };
            let reply = format!(
                "Chat ID: {}\nType: {}\nTitle: {}",
                chat.id,
                kind,
                chat.title().unwrap_or("")
            );
            bot.send_message(chat_id, reply).await?;
        }

        Command::PinPolicy => {
            if !ctx.is_admin(user_id) {
                bot.send_message(chat_id, texts::ADMIN_ONLY).await?;
                return Ok(());
            }
            handlers::post_and_pin_policy(&bot, chat_id).await;
        }

        Command::New => {
            // The intake conversation runs in private chat only.
            if !msg.chat.is_private() {
                bot.send_message(chat_id, texts::DM_FOR_INTAKE).await?;
                return Ok(());
            }
            let reply = ctx.intake.start(user_id);
            handlers::send_intake_reply(&bot, chat_id, &ctx, reply).await?;
        }

        Command::MyListings => {
            let rows = ctx.listings.list_by_owner(user_id, LIST_LIMIT).await?;
            if rows.is_empty() {
                bot.send_message(chat_id, texts::MY_LISTINGS_EMPTY).await?;
            } else {
                let body = rows
                    .iter()
                    .map(texts::listing_line)
                    .collect::<Vec<_>>()
                    .join("\n");
                bot.send_message(chat_id, body).await?;
            }
        }

        Command::Search(args) => match parse_search(&args) {
            Some(filter) => {
                let rows = ctx.listings.search(&filter, LIST_LIMIT).await?;
                if rows.is_empty() {
                    bot.send_message(chat_id, texts::SEARCH_EMPTY).await?;
                } else {
                    let body = rows
                        .iter()
                        .map(|listing| listing.render_caption())
                        .collect::<Vec<_>>()
                        .join("\n\n——————\n\n");
                    bot.send_message(chat_id, body).await?;
                }
            }
            None => {
                bot.send_message(chat_id, texts::SEARCH_USAGE).await?;
            }
        },

        Command::Pending => {
            if !ctx.is_admin(user_id) {
                bot.send_message(chat_id, texts::ADMIN_ONLY).await?;
                return Ok(());
            }
            let rows = ctx.workflow.pending(PENDING_LIMIT).await?;
            if rows.is_empty() {
                bot.send_message(chat_id, texts::PENDING_EMPTY).await?;
            } else {
                let body = rows
                    .iter()
                    .map(texts::listing_line)
                    .collect::<Vec<_>>()
                    .join("\n");
                bot.send_message(chat_id, body).await?;
            }
        }

        Command::Approve(args) => {
            if !ctx.is_admin(user_id) {
                bot.send_message(chat_id, texts::ADMIN_ONLY).await?;
                return Ok(());
            }
            let id = match args.trim().parse::<i64>() {
                Ok(id) => id,
                Err(_) => {
                    bot.send_message(chat_id, texts::APPROVE_USAGE).await?;
                    return Ok(());
                }
            };
            match ctx.workflow.approve(id).await {
                Ok(ApproveOutcome::Approved) => {
                    bot.send_message(chat_id, texts::approved_ok(id)).await?;
                }
                Ok(ApproveOutcome::AlreadyApproved) => {
                    bot.send_message(chat_id, texts::already_approved(id)).await?;
                }
                Err(ListingError::NotFound(_)) => {
                    bot.send_message(chat_id, texts::not_found(id)).await?;
                }
                Err(err) => return Err(err.into()),
            }
        }

        Command::Reject(args) => {
            if !ctx.is_admin(user_id) {
                bot.send_message(chat_id, texts::ADMIN_ONLY).await?;
                return Ok(());
            }
            let (id, reason) = match parse_reject(&args) {
                Some(parsed) => parsed,
                None => {
                    bot.send_message(chat_id, texts::REJECT_USAGE).await?;
                    return Ok(());
                }
            };
            match ctx.workflow.reject(id, reason).await {
                Ok(()) => {
                    bot.send_message(chat_id, texts::rejected_ok(id)).await?;
                }
                Err(ListingError::NotFound(_)) => {
                    bot.send_message(chat_id, texts::not_found(id)).await?;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    Ok(())
}

/// `/search <sale|rent> <min>-<max> <district words...>`, district optional.
fn parse_search(args: &str) -> Option<SearchFilter> {
    let mut parts = args.split_whitespace();

    let deal = DealKind::parse(parts.next()?)?;

    let range = parts.next()?;
    let (min_raw, max_raw) = range.split_once('-')?;
    let min_price = strip_to_digits(min_raw).parse::<u64>().ok()?;
    let max_price = strip_to_digits(max_raw).parse::<u64>().ok()?;

    let district = parts.collect::<Vec<_>>().join(" ");

    Some(SearchFilter {
        deal: Some(deal),
        min_price: Some(min_price),
        max_price: Some(max_price),
        district_contains: (!district.is_empty()).then_some(district),
    })
}

/// `/reject <id> [reason...]`
fn parse_reject(args: &str) -> Option<(i64, Option<String>)> {
    let args = args.trim();
    let (id_part, rest) = match args.split_once(char::is_whitespace) {
        Some((id_part, rest)) => (id_part, rest.trim()),
        None => (args, ""),
    };
    let id = id_part.parse::<i64>().ok()?;
    let reason = (!rest.is_empty()).then(|| rest.to_string());
    Some((id, reason))
}
