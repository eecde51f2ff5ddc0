// Non-command update handlers: group moderation, the private intake driver
// and the chat-membership hook that (re)posts the policy.
//
// Every outbound call made while enforcing a verdict is best-effort: the bot
// may lack permission to delete or restrict, and that must never take down
// message processing.

use super::texts;
use super::{AppContext, HandlerResult};
use crate::core::intake::{IntakeInput, IntakeReply};
use crate::core::moderation::geo::Coordinate;
use crate::core::moderation::{InboundPost, ModerationAction};
use chrono::Utc;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{ChatMemberUpdated, ChatPermissions, User};

pub async fn handle_message(bot: Bot, msg: Message, ctx: Arc<AppContext>) -> HandlerResult {
    if msg.chat.is_private() {
        return intake_turn(bot, msg, ctx).await;
    }
    if msg.chat.id == ctx.config.group_chat {
        return moderate_group_message(bot, msg, ctx).await;
    }
    Ok(())
}

// ============================================================================
// GROUP MODERATION
// ============================================================================

async fn moderate_group_message(bot: Bot, msg: Message, ctx: Arc<AppContext>) -> HandlerResult {
    let user = match msg.from.as_ref() {
        Some(user) if !user.is_bot => user.clone(),
        _ => return Ok(()),
    };

    let post = InboundPost {
        sender_id: user.id.0 as i64,
        text: msg.text().map(str::to_owned),
        caption: msg.caption().map(str::to_owned),
        coordinate: msg.location().map(|loc| Coordinate {
            lat: loc.latitude,
            lon: loc.longitude,
        }),
    };

    let action = match ctx.moderation.check_post(&post).await {
        Ok(action) => action,
        Err(err) => {
            tracing::error!("moderation check failed: {}", err);
            return Ok(());
        }
    };

    apply_action(&bot, &msg, &user, action).await;
    Ok(())
}

/// Translate a verdict into Telegram calls. Failures are logged and ignored.
async fn apply_action(bot: &Bot, msg: &Message, user: &User, action: ModerationAction) {
    match action {
        ModerationAction::Allow => {}

        ModerationAction::DeleteWithNotice => {
            if let Err(err) = bot.delete_message(msg.chat.id, msg.id).await {
                tracing::warn!("failed to delete unlicensed post: {}", err);
            }
            let private = ChatId(user.id.0 as i64);
            if let Err(err) = bot.send_message(private, texts::missing_license_notice()).await {
                tracing::warn!("failed to send license notice: {}", err);
            }
        }

        ModerationAction::DeleteAndRestrict {
            kind,
            violation_count,
            restrict_secs,
        } => {
            if let Err(err) = bot.delete_message(msg.chat.id, msg.id).await {
                tracing::warn!("failed to delete violating post: {}", err);
            }

            let until = Utc::now() + chrono::Duration::seconds(restrict_secs as i64);
            if let Err(err) = bot
                .restrict_chat_member(msg.chat.id, user.id, ChatPermissions::empty())
                .until_date(until)
                .await
            {
                tracing::warn!("failed to restrict member {}: {}", user.id, err);
            }

            let private = ChatId(user.id.0 as i64);
            let notice = texts::violation_notice(kind, violation_count, restrict_secs);
            if let Err(err) = bot.send_message(private, notice).await {
                tracing::warn!("failed to send violation notice: {}", err);
            }
        }
    }
}

// ============================================================================
// PRIVATE INTAKE DRIVER
// ============================================================================

async fn intake_turn(bot: Bot, msg: Message, ctx: Arc<AppContext>) -> HandlerResult {
    let user_id = match msg.from.as_ref() {
        Some(user) => user.id.0 as i64,
        None => return Ok(()),
    };

    if !ctx.intake.has_session(user_id) {
        if msg.text().is_some() {
            bot.send_message(msg.chat.id, texts::NO_SESSION_HINT).await?;
        }
        return Ok(());
    }

    // Classify the update into the one input class the machine understands.
    let input = if let Some(location) = msg.location() {
        IntakeInput::Location(Coordinate {
            lat: location.latitude,
            lon: location.longitude,
        })
    } else if let Some(sizes) = msg.photo() {
        // The largest rendition is last; its file id is what we republish.
        match sizes.last() {
            Some(photo) => IntakeInput::Photo(photo.file.id.clone()),
            None => return Ok(()),
        }
    } else if let Some(text) = msg.text() {
        IntakeInput::Text(text.to_owned())
    } else {
        return Ok(());
    };

    let reply = ctx.intake.handle(user_id, input).await?;
    send_intake_reply(&bot, msg.chat.id, &ctx, reply).await
}

/// Render one intake reply back to the user (and, on submission, ping the
/// admin about the new pending listing).
pub async fn send_intake_reply(
    bot: &Bot,
    chat_id: ChatId,
    ctx: &AppContext,
    reply: IntakeReply,
) -> HandlerResult {
    match reply {
        IntakeReply::Prompt { step, language } => {
            bot.send_message(chat_id, texts::prompt(step, language)).await?;
        }
        IntakeReply::Invalid {
            step,
            reject,
            language,
        } => {
            bot.send_message(chat_id, texts::invalid(reject, language)).await?;
            bot.send_message(chat_id, texts::prompt(step, language)).await?;
        }
        IntakeReply::PhotoAck { count, language } => {
            bot.send_message(chat_id, texts::photo_ack(count, language)).await?;
        }
        IntakeReply::Submitted {
            listing_id,
            language,
        } => {
            bot.send_message(chat_id, texts::submitted(listing_id, language)).await?;

            let admin = ChatId(ctx.config.admin_id);
            if let Err(err) = bot
                .send_message(admin, texts::admin_new_listing(listing_id))
                .await
            {
                tracing::warn!("failed to notify admin of listing {}: {}", listing_id, err);
            }
        }
        IntakeReply::NoSession => {
            bot.send_message(chat_id, texts::NO_SESSION_HINT).await?;
        }
    }
    Ok(())
}

// ============================================================================
// MEMBERSHIP EVENTS
// ============================================================================

/// When the bot is added to the moderated group, (re)post and pin the policy.
pub async fn handle_chat_member_update(
    bot: Bot,
    update: ChatMemberUpdated,
    ctx: Arc<AppContext>,
) -> HandlerResult {
    if update.chat.id == ctx.config.group_chat && update.new_chat_member.kind.is_present() {
        post_and_pin_policy(&bot, update.chat.id).await;
    }
    Ok(())
}

/// Post the policy text and pin it. Best-effort on both calls.
pub async fn post_and_pin_policy(bot: &Bot, chat_id: ChatId) {
    match bot.send_message(chat_id, texts::POLICY).await {
        Ok(sent) => {
            if let Err(err) = bot.pin_chat_message(chat_id, sent.id).await {
                tracing::warn!("failed to pin policy message: {}", err);
            }
        }
        Err(err) => tracing::warn!("failed to post policy message: {}", err),
    }
}
