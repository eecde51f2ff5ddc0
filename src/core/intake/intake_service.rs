// Intake service - owns the per-user conversation sessions and commits the
// finished draft to the listing store.
//
// Sessions are in-memory only: a process restart drops in-flight
// conversations, which is accepted. Each user drives exactly one session;
// different users' sessions never share state.

use super::intake_fsm::{IntakeInput, Reject, Session, Step, StepOutcome};
use crate::core::listings::listing_models::Language;
use crate::core::listings::listing_service::{ListingError, ListingStore};
use dashmap::DashMap;

/// What the transport layer should send back after one intake turn.
#[derive(Debug, Clone, PartialEq)]
pub enum IntakeReply {
    /// Ask for this step's input.
    Prompt { step: Step, language: Language },
    /// Input refused; explain and re-ask.
    Invalid {
        step: Step,
        reject: Reject,
        language: Language,
    },
    /// Photo accepted; tell the user how many are attached so far.
    PhotoAck { count: usize, language: Language },
    /// Conversation finished and the listing is stored as pending.
    Submitted { listing_id: i64, language: Language },
    /// The user has no open conversation.
    NoSession,
}

pub struct IntakeService<S: ListingStore> {
    store: S,
    sessions: DashMap<i64, Session>,
}

impl<S: ListingStore> IntakeService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            sessions: DashMap::new(),
        }
    }

    /// Start (or unconditionally restart) a conversation for `user_id`.
    pub fn start(&self, user_id: i64) -> IntakeReply {
        let session = Session::new(user_id);
        let step = session.step();
        let language = session.language();
        self.sessions.insert(user_id, session);

        tracing::debug!(user_id, "intake conversation started");
        IntakeReply::Prompt { step, language }
    }

    /// Whether `user_id` currently has an open conversation.
    pub fn has_session(&self, user_id: i64) -> bool {
        self.sessions.contains_key(&user_id)
    }

    /// Feed one user turn into their session.
    pub async fn handle(
        &self,
        user_id: i64,
        input: IntakeInput,
    ) -> Result<IntakeReply, ListingError> {
        // Take the outcome while holding the entry, then release it before
        // any store I/O.
        let (outcome, language) = {
            let mut entry = match self.sessions.get_mut(&user_id) {
                Some(entry) => entry,
                None => return Ok(IntakeReply::NoSession),
            };
            let outcome = entry.value_mut().apply(input);
            let language = entry.value().language();
            (outcome, language)
        };

        match outcome {
            StepOutcome::Next(step) => Ok(IntakeReply::Prompt { step, language }),
            StepOutcome::Stay(step, reject) => Ok(IntakeReply::Invalid {
                step,
                reject,
                language,
            }),
            StepOutcome::PhotoAdded(count) => Ok(IntakeReply::PhotoAck { count, language }),
            StepOutcome::Completed(listing) => {
                // The session is finished either way; it cannot be resumed.
                self.sessions.remove(&user_id);
                let listing_id = self.store.create(listing).await?;
                tracing::info!(user_id, listing_id, "intake conversation completed");
                Ok(IntakeReply::Submitted {
                    listing_id,
                    language,
                })
            }
        }
    }

    /// Drop a user's session, if any. Returns whether one existed.
    pub fn abandon(&self, user_id: i64) -> bool {
        self.sessions.remove(&user_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::listings::listing_models::{
        DealKind, Listing, ListingStatus, NewListing, SearchFilter,
    };
    use crate::core::listings::listing_service::StatusChange;
    use async_trait::async_trait;
    use chrono::Utc;
    use dashmap::DashMap;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct MockListingStore {
        listings: Arc<DashMap<i64, Listing>>,
        next_id: Arc<AtomicI64>,
    }

    #[async_trait]
    impl ListingStore for MockListingStore {
        async fn create(&self, listing: NewListing) -> Result<i64, ListingError> {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            self.listings.insert(
                id,
                Listing {
                    id,
                    owner_id: listing.owner_id,
                    language: listing.language,
                    deal: listing.deal,
                    property_type: listing.property_type,
                    district: listing.district,
                    price: listing.price,
                    area_sqm: listing.area_sqm,
                    bedrooms: listing.bedrooms,
                    bathrooms: listing.bathrooms,
                    description: listing.description,
                    contact: listing.contact,
                    license_no: listing.license_no,
                    deed_no: listing.deed_no,
                    location: listing.location,
                    photos: listing.photos,
                    status: ListingStatus::Pending,
                    created_at: Utc::now(),
                },
            );
            Ok(id)
        }

        async fn get(&self, id: i64) -> Result<Option<Listing>, ListingError> {
            Ok(self.listings.get(&id).map(|l| l.clone()))
        }

        async fn set_status(
            &self,
            _id: i64,
            _status: ListingStatus,
        ) -> Result<StatusChange, ListingError> {
            unimplemented!("not exercised by intake tests")
        }

        async fn list_by_owner(
            &self,
            _owner_id: i64,
            _limit: u32,
        ) -> Result<Vec<Listing>, ListingError> {
            unimplemented!("not exercised by intake tests")
        }

        async fn list_pending(&self, _limit: u32) -> Result<Vec<Listing>, ListingError> {
            unimplemented!("not exercised by intake tests")
        }

        async fn search(
            &self,
            _filter: &SearchFilter,
            _limit: u32,
        ) -> Result<Vec<Listing>, ListingError> {
            unimplemented!("not exercised by intake tests")
        }
    }

    fn text(s: &str) -> IntakeInput {
        IntakeInput::Text(s.to_string())
    }

    async fn drive_to_completion(service: &IntakeService<MockListingStore>, user: i64) -> i64 {
        service.start(user);
        for answer in [
            "english", "rent", "apartment", "Olaya", "3,000", "140", "3", "2", "renovated",
            "0501234567", "FAL 12345678", "skip", "skip", "done",
        ] {
            match service.handle(user, text(answer)).await.unwrap() {
                IntakeReply::Submitted { listing_id, .. } => return listing_id,
                IntakeReply::Invalid { step, reject, .. } => {
                    panic!("answer {:?} rejected at {:?}: {:?}", answer, step, reject)
                }
                _ => {}
            }
        }
        panic!("conversation did not complete");
    }

    #[tokio::test]
    async fn completed_conversation_commits_a_pending_listing() {
        let store = MockListingStore::default();
        let service = IntakeService::new(store.clone());

        let id = drive_to_completion(&service, 42).await;

        let listing = store.get(id).await.unwrap().unwrap();
        assert_eq!(listing.status, ListingStatus::Pending);
        assert_eq!(listing.deal, DealKind::Rent);
        assert_eq!(listing.price, 3000);
        assert_eq!(listing.license_no, "12345678");

        // The session is gone once committed.
        assert!(!service.has_session(42));
        assert_eq!(
            service.handle(42, text("done")).await.unwrap(),
            IntakeReply::NoSession
        );
    }

    #[tokio::test]
    async fn restart_resets_the_conversation_unconditionally() {
        let store = MockListingStore::default();
        let service = IntakeService::new(store);

        service.start(7);
        service.handle(7, text("english")).await.unwrap();
        service.handle(7, text("sale")).await.unwrap();

        // Restarting mid-way puts the user back at language selection.
        let reply = service.start(7);
        assert_eq!(
            reply,
            IntakeReply::Prompt {
                step: Step::SelectLanguage,
                language: Language::Arabic
            }
        );
    }

    #[tokio::test]
    async fn input_without_a_session_is_reported() {
        let store = MockListingStore::default();
        let service = IntakeService::new(store);
        assert_eq!(
            service.handle(1, text("hello")).await.unwrap(),
            IntakeReply::NoSession
        );
        assert!(!service.abandon(1));
    }

    #[tokio::test]
    async fn sessions_are_isolated_per_user() {
        let store = MockListingStore::default();
        let service = IntakeService::new(store);

        service.start(1);
        service.start(2);
        service.handle(1, text("english")).await.unwrap();

        // User 2 is still picking a language even though user 1 advanced.
        let reply = service.handle(2, text("not-a-language")).await.unwrap();
        assert_eq!(
            reply,
            IntakeReply::Invalid {
                step: Step::SelectLanguage,
                reject: Reject::NotAChoice,
                language: Language::Arabic
            }
        );
    }
}
