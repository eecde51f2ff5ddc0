// Intake conversation state machine - collects listing fields one step at a
// time, validating each input before advancing.
//
// The machine is strictly linear and owns no I/O: it consumes already
// type-classified inputs (text, location, photo) and reports what happened
// so the transport layer can prompt accordingly. Invalid input never
// advances the machine and never mutates the draft.

use crate::core::listings::listing_models::{DealKind, Language, NewListing, MAX_PHOTOS};
use crate::core::moderation::geo::Coordinate;

/// The ordered steps of the intake conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    SelectLanguage,
    SelectDealKind,
    PropertyType,
    District,
    Price,
    Size,
    Bedrooms,
    Bathrooms,
    Description,
    Contact,
    License,
    Deed,
    Location,
    Photos,
}

impl Step {
    fn next(self) -> Option<Step> {
        use Step::*;
        match self {
            SelectLanguage => Some(SelectDealKind),
            SelectDealKind => Some(PropertyType),
            PropertyType => Some(District),
            District => Some(Price),
            Price => Some(Size),
            Size => Some(Bedrooms),
            Bedrooms => Some(Bathrooms),
            Bathrooms => Some(Description),
            Description => Some(Contact),
            Contact => Some(License),
            License => Some(Deed),
            Deed => Some(Location),
            Location => Some(Photos),
            Photos => None,
        }
    }
}

/// One user turn, already classified by the transport layer.
#[derive(Debug, Clone, PartialEq)]
pub enum IntakeInput {
    Text(String),
    Location(Coordinate),
    /// A photo's transport file id.
    Photo(String),
}

/// Why an input was refused for the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reject {
    NotAChoice,
    ExpectedText,
    NotANumber,
    BadLicense,
    BadDeed,
    ExpectedLocationOrSkip,
    ExpectedPhotoOrDone,
}

/// Result of feeding one input to the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Advanced; prompt for the new step.
    Next(Step),
    /// Input refused; re-prompt the same step.
    Stay(Step, Reject),
    /// A photo was accepted (or silently dropped past the cap); `0` is never
    /// reported. The machine stays on the photos step.
    PhotoAdded(usize),
    /// The conversation finished; the draft is complete.
    Completed(NewListing),
}

#[derive(Debug, Default)]
struct Draft {
    language: Option<Language>,
    deal: Option<DealKind>,
    property_type: Option<String>,
    district: Option<String>,
    price: Option<u64>,
    area_sqm: Option<u64>,
    bedrooms: Option<u32>,
    bathrooms: Option<u32>,
    description: Option<String>,
    contact: Option<String>,
    license_no: Option<String>,
    deed_no: Option<String>,
    location: Option<Coordinate>,
    photos: Vec<String>,
}

impl Draft {
    fn finish(self, owner_id: i64) -> Option<NewListing> {
        Some(NewListing {
            owner_id,
            language: self.language?,
            deal: self.deal?,
            property_type: self.property_type?,
            district: self.district?,
            price: self.price?,
            area_sqm: self.area_sqm?,
            bedrooms: self.bedrooms?,
            bathrooms: self.bathrooms?,
            description: self.description?,
            contact: self.contact?,
            license_no: self.license_no?,
            deed_no: self.deed_no,
            location: self.location,
            photos: self.photos,
        })
    }
}

/// A single user's in-flight intake conversation.
#[derive(Debug)]
pub struct Session {
    owner_id: i64,
    step: Step,
    draft: Draft,
}

impl Session {
    pub fn new(owner_id: i64) -> Self {
        Self {
            owner_id,
            step: Step::SelectLanguage,
            draft: Draft::default(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// Language the user picked, defaulting to Arabic until they have.
    pub fn language(&self) -> Language {
        self.draft.language.unwrap_or(Language::Arabic)
    }

    /// Feed one input to the machine.
    pub fn apply(&mut self, input: IntakeInput) -> StepOutcome {
        use Step::*;

        match self.step {
            SelectLanguage => self.text_step(input, Reject::NotAChoice, |draft, text| {
                let language = Language::parse(&text)?;
                draft.language = Some(language);
                Some(())
            }),
            SelectDealKind => self.text_step(input, Reject::NotAChoice, |draft, text| {
                let deal = DealKind::parse(&text)?;
                draft.deal = Some(deal);
                Some(())
            }),
            PropertyType => self.free_text_step(input, |draft, text| {
                draft.property_type = Some(text);
            }),
            District => self.free_text_step(input, |draft, text| {
                draft.district = Some(text);
            }),
            Price => self.numeric_step(input, |draft, n| draft.price = Some(n)),
            Size => self.numeric_step(input, |draft, n| draft.area_sqm = Some(n)),
            Bedrooms => self.numeric_step(input, |draft, n| {
                draft.bedrooms = Some(n.min(u32::MAX as u64) as u32)
            }),
            Bathrooms => self.numeric_step(input, |draft, n| {
                draft.bathrooms = Some(n.min(u32::MAX as u64) as u32)
            }),
            Description => self.free_text_step(input, |draft, text| {
                draft.description = Some(text);
            }),
            Contact => self.free_text_step(input, |draft, text| {
                draft.contact = Some(text);
            }),
            License => self.text_step(input, Reject::BadLicense, |draft, text| {
                let digits = strip_to_digits(&text);
                if (7..=12).contains(&digits.chars().count()) {
                    draft.license_no = Some(digits);
                    Some(())
                } else {
                    None
                }
            }),
            Deed => self.text_step(input, Reject::BadDeed, |draft, text| {
                if is_skip(&text) {
                    draft.deed_no = None;
                    return Some(());
                }
                let digits = strip_to_digits(&text);
                if (5..=20).contains(&digits.chars().count()) {
                    draft.deed_no = Some(digits);
                    Some(())
                } else {
                    None
                }
            }),
            Location => match input {
                IntakeInput::Location(point) => {
                    self.draft.location = Some(point);
                    self.advance()
                }
                IntakeInput::Text(text) if is_skip(&text) => {
                    self.draft.location = None;
                    self.advance()
                }
                _ => StepOutcome::Stay(self.step, Reject::ExpectedLocationOrSkip),
            },
            Photos => match input {
                IntakeInput::Photo(file_id) => {
                    // Photos past the cap are silently dropped; the sender
                    // still gets an acknowledgement.
                    if self.draft.photos.len() < MAX_PHOTOS {
                        self.draft.photos.push(file_id);
                    }
                    StepOutcome::PhotoAdded(self.draft.photos.len())
                }
                IntakeInput::Text(text) if is_done(&text) => {
                    let draft = std::mem::take(&mut self.draft);
                    match draft.finish(self.owner_id) {
                        Some(listing) => StepOutcome::Completed(listing),
                        // Unreachable for a machine driven through its steps,
                        // but kept total: refuse rather than panic.
                        None => StepOutcome::Stay(self.step, Reject::ExpectedPhotoOrDone),
                    }
                }
                _ => StepOutcome::Stay(self.step, Reject::ExpectedPhotoOrDone),
            },
        }
    }

    fn advance(&mut self) -> StepOutcome {
        match self.step.next() {
            Some(next) => {
                self.step = next;
                StepOutcome::Next(next)
            }
            // Only the photos step is terminal and it completes explicitly.
            None => StepOutcome::Stay(self.step, Reject::ExpectedPhotoOrDone),
        }
    }

    /// A step that accepts text and validates it with `parse`; anything else
    /// re-prompts with `reject`.
    fn text_step(
        &mut self,
        input: IntakeInput,
        reject: Reject,
        parse: impl FnOnce(&mut Draft, String) -> Option<()>,
    ) -> StepOutcome {
        match input {
            IntakeInput::Text(text) => match parse(&mut self.draft, text) {
                Some(()) => self.advance(),
                None => StepOutcome::Stay(self.step, reject),
            },
            _ => StepOutcome::Stay(self.step, reject),
        }
    }

    /// A step that accepts any non-empty text.
    fn free_text_step(
        &mut self,
        input: IntakeInput,
        store: impl FnOnce(&mut Draft, String),
    ) -> StepOutcome {
        self.text_step(input, Reject::ExpectedText, |draft, text| {
            let text = text.trim().to_string();
            if text.is_empty() {
                return None;
            }
            store(draft, text);
            Some(())
        })
    }

    /// A step that parses a non-negative integer out of whatever the user
    /// typed by stripping everything but digits ("3,000 ريال" -> 3000).
    fn numeric_step(
        &mut self,
        input: IntakeInput,
        store: impl FnOnce(&mut Draft, u64),
    ) -> StepOutcome {
        self.text_step(input, Reject::NotANumber, |draft, text| {
            let digits = strip_to_digits(&text);
            let value = digits.parse::<u64>().ok()?;
            store(draft, value);
            Some(())
        })
    }
}

/// Keep only digit characters, normalizing Eastern-Arabic numerals to ASCII
/// on the way.
pub fn strip_to_digits(input: &str) -> String {
    input
        .chars()
        .filter_map(|c| match c {
            '0'..='9' => Some(c),
            '٠'..='٩' => char::from_digit(c as u32 - '٠' as u32, 10),
            _ => None,
        })
        .collect()
}

fn is_skip(text: &str) -> bool {
    matches!(
        text.trim().to_lowercase().as_str(),
        "skip" | "/skip" | "تخطي" | "تجاوز"
    )
}

fn is_done(text: &str) -> bool {
    matches!(
        text.trim().to_lowercase().as_str(),
        "done" | "/done" | "تم" | "انتهيت"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> IntakeInput {
        IntakeInput::Text(s.to_string())
    }

    /// Drive a fresh session up to (but not into) the given step with valid
    /// answers.
    fn session_at(step: Step) -> Session {
        let mut session = Session::new(42);
        let answers: &[(Step, IntakeInput)] = &[
            (Step::SelectLanguage, text("العربية")),
            (Step::SelectDealKind, text("rent")),
            (Step::PropertyType, text("شقة")),
            (Step::District, text("العليا")),
            (Step::Price, text("3,000")),
            (Step::Size, text("140")),
            (Step::Bedrooms, text("3")),
            (Step::Bathrooms, text("2")),
            (Step::Description, text("شقة مجددة")),
            (Step::Contact, text("0501234567")),
            (Step::License, text("ABC 12345678")),
            (Step::Deed, text("skip")),
            (Step::Location, text("تخطي")),
        ];
        for (at, input) in answers {
            if *at == step {
                return session;
            }
            assert_eq!(session.step(), *at, "fixture out of sync");
            match session.apply(input.clone()) {
                StepOutcome::Next(_) => {}
                other => panic!("fixture answer rejected at {:?}: {:?}", at, other),
            }
        }
        session
    }

    #[test]
    fn new_session_starts_at_language_selection() {
        let session = Session::new(1);
        assert_eq!(session.step(), Step::SelectLanguage);
        assert_eq!(session.language(), Language::Arabic);
    }

    #[test]
    fn unknown_language_choice_reprompts() {
        let mut session = Session::new(1);
        let outcome = session.apply(text("klingon"));
        assert_eq!(
            outcome,
            StepOutcome::Stay(Step::SelectLanguage, Reject::NotAChoice)
        );
        assert_eq!(session.step(), Step::SelectLanguage);
    }

    #[test]
    fn invalid_price_stays_put_without_touching_the_draft() {
        let mut session = session_at(Step::Price);
        let outcome = session.apply(text("cheap"));
        assert_eq!(outcome, StepOutcome::Stay(Step::Price, Reject::NotANumber));
        assert_eq!(session.step(), Step::Price);
        assert_eq!(session.draft.price, None);

        // A photo is just as invalid here.
        let outcome = session.apply(IntakeInput::Photo("file-1".to_string()));
        assert_eq!(outcome, StepOutcome::Stay(Step::Price, Reject::NotANumber));
    }

    #[test]
    fn price_with_separators_parses_to_digits() {
        let mut session = session_at(Step::Price);
        assert_eq!(session.apply(text("3,000")), StepOutcome::Next(Step::Size));
        assert_eq!(session.draft.price, Some(3000));
    }

    #[test]
    fn eastern_arabic_numerals_are_accepted() {
        let mut session = session_at(Step::Price);
        assert_eq!(session.apply(text("٣٥٠٠٠")), StepOutcome::Next(Step::Size));
        assert_eq!(session.draft.price, Some(35_000));
    }

    #[test]
    fn license_requires_seven_to_twelve_digits() {
        let mut session = session_at(Step::License);
        assert_eq!(
            session.apply(text("12345")),
            StepOutcome::Stay(Step::License, Reject::BadLicense)
        );
        assert_eq!(
            session.apply(text("1234567890123")),
            StepOutcome::Stay(Step::License, Reject::BadLicense)
        );
        assert_eq!(
            session.apply(text("ABC 12345678")),
            StepOutcome::Next(Step::Deed)
        );
        assert_eq!(session.draft.license_no.as_deref(), Some("12345678"));
    }

    #[test]
    fn deed_is_skippable_or_five_to_twenty_digits() {
        let mut session = session_at(Step::Deed);
        assert_eq!(
            session.apply(text("123")),
            StepOutcome::Stay(Step::Deed, Reject::BadDeed)
        );
        assert_eq!(session.apply(text("54321")), StepOutcome::Next(Step::Location));
        assert_eq!(session.draft.deed_no.as_deref(), Some("54321"));

        let mut session = session_at(Step::Deed);
        assert_eq!(session.apply(text("تخطي")), StepOutcome::Next(Step::Location));
        assert_eq!(session.draft.deed_no, None);
    }

    #[test]
    fn location_takes_coordinate_or_skip() {
        let mut session = session_at(Step::Location);
        assert_eq!(
            session.apply(text("الرياض")),
            StepOutcome::Stay(Step::Location, Reject::ExpectedLocationOrSkip)
        );
        let point = Coordinate {
            lat: 24.7,
            lon: 46.7,
        };
        assert_eq!(
            session.apply(IntakeInput::Location(point)),
            StepOutcome::Next(Step::Photos)
        );
        assert_eq!(session.draft.location, Some(point));
    }

    #[test]
    fn photos_cap_at_ten_and_finish_on_done() {
        let mut session = session_at(Step::Location);
        session.apply(text("skip"));

        for i in 1..=12usize {
            let outcome = session.apply(IntakeInput::Photo(format!("file-{i}")));
            // The 11th and 12th photo are dropped but acknowledged.
            assert_eq!(outcome, StepOutcome::PhotoAdded(i.min(10)));
        }

        match session.apply(text("done")) {
            StepOutcome::Completed(listing) => {
                assert_eq!(listing.photos.len(), 10);
                assert_eq!(listing.photos[0], "file-1");
                assert_eq!(listing.photos[9], "file-10");
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn full_conversation_produces_the_expected_listing() {
        let mut session = session_at(Step::Location);
        session.apply(text("تخطي"));
        session.apply(IntakeInput::Photo("photo-a".to_string()));

        match session.apply(text("تم")) {
            StepOutcome::Completed(listing) => {
                assert_eq!(listing.owner_id, 42);
                assert_eq!(listing.language, Language::Arabic);
                assert_eq!(listing.deal, DealKind::Rent);
                assert_eq!(listing.property_type, "شقة");
                assert_eq!(listing.district, "العليا");
                assert_eq!(listing.price, 3000);
                assert_eq!(listing.area_sqm, 140);
                assert_eq!(listing.bedrooms, 3);
                assert_eq!(listing.bathrooms, 2);
                assert_eq!(listing.license_no, "12345678");
                assert_eq!(listing.deed_no, None);
                assert_eq!(listing.location, None);
                assert_eq!(listing.photos, vec!["photo-a".to_string()]);
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn empty_text_is_rejected_for_free_text_steps() {
        let mut session = session_at(Step::District);
        assert_eq!(
            session.apply(text("   ")),
            StepOutcome::Stay(Step::District, Reject::ExpectedText)
        );
    }
}
