// Telegram-backed implementation of the core publication port: pushes an
// approved listing to the channel and delivers status notes to submitters.

use super::texts;
use crate::core::listings::{Listing, ListingPublisher, PublishError, SubmitterNote};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, InputMedia, InputMediaPhoto};

pub struct TelegramPublisher {
    bot: Bot,
    channel: ChatId,
}

impl TelegramPublisher {
    pub fn new(bot: Bot, channel: ChatId) -> Self {
        Self { bot, channel }
    }
}

#[async_trait]
impl ListingPublisher for TelegramPublisher {
    async fn publish(&self, listing: &Listing) -> Result<(), PublishError> {
        let caption = listing.render_caption();

        if listing.photos.is_empty() {
            self.bot
                .send_message(self.channel, caption)
                .await
                .map_err(|e| PublishError(e.to_string()))?;
            return Ok(());
        }

        // Media group with the caption on the first item only.
        let media: Vec<InputMedia> = listing
            .photos
            .iter()
            .enumerate()
            .map(|(index, file_id)| {
                let mut photo = InputMediaPhoto::new(InputFile::file_id(file_id.clone()));
                if index == 0 {
                    photo = photo.caption(caption.clone());
                }
                InputMedia::Photo(photo)
            })
            .collect();

        self.bot
            .send_media_group(self.channel, media)
            .await
            .map_err(|e| PublishError(e.to_string()))?;
        Ok(())
    }

    async fn notify_submitter(
        &self,
        listing: &Listing,
        note: SubmitterNote,
    ) -> Result<(), PublishError> {
        let text = match note {
            SubmitterNote::Approved => texts::approved_note(listing.id, listing.language),
            SubmitterNote::Rejected { reason } => {
                texts::rejected_note(listing.id, &reason, listing.language)
            }
        };

        self.bot
            .send_message(ChatId(listing.owner_id), text)
            .await
            .map_err(|e| PublishError(e.to_string()))?;
        Ok(())
    }
}
