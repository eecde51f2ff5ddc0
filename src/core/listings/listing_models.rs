// Listing domain models - the classified-ad record and its search filter.
// Pure domain types; the Telegram layer renders them for users.

use crate::core::moderation::geo::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hard cap on attached media per listing.
pub const MAX_PHOTOS: usize = 10;

/// Language the submitter chose for the intake conversation. Also controls
/// the language of status notifications sent back to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    Arabic,
    English,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Arabic => "ar",
            Language::English => "en",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "ar" | "arabic" | "العربية" | "عربي" | "عربية" => Some(Language::Arabic),
            "en" | "english" | "الإنجليزية" | "انجليزي" => Some(Language::English),
            _ => None,
        }
    }
}

/// Whether the property is offered for sale or for rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DealKind {
    Sale,
    Rent,
}

impl DealKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealKind::Sale => "sale",
            DealKind::Rent => "rent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "sale" | "بيع" | "للبيع" | "شراء" => Some(DealKind::Sale),
            "rent" | "إيجار" | "ايجار" | "للإيجار" | "للايجار" => Some(DealKind::Rent),
            _ => None,
        }
    }
}

impl std::fmt::Display for DealKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review state of a listing. Only pending listings can be acted on by the
/// admin; approved and rejected records are kept for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingStatus {
    Pending,
    Approved,
    Rejected,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Pending => "pending",
            ListingStatus::Approved => "approved",
            ListingStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ListingStatus::Pending),
            "approved" => Some(ListingStatus::Approved),
            "rejected" => Some(ListingStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored classified-ad record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub owner_id: i64,
    pub language: Language,
    pub deal: DealKind,
    pub property_type: String,
    pub district: String,
    pub price: u64,
    pub area_sqm: u64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub description: String,
    pub contact: String,
    /// Advertising-license number, 7-12 digits, always present.
    pub license_no: String,
    /// Title-deed number, 5-20 digits. Private: never rendered into
    /// published output.
    pub deed_no: Option<String>,
    pub location: Option<Coordinate>,
    /// Telegram file ids of attached photos, at most [`MAX_PHOTOS`].
    pub photos: Vec<String>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// The caption published to the channel. Includes the license number as
    /// required by regulation; the deed number stays private.
    pub fn render_caption(&self) -> String {
        let deal = match self.deal {
            DealKind::Sale => "للبيع",
            DealKind::Rent => "للإيجار",
        };
        let mut caption = format!(
            "🏠 {} {}\n📍 الحي: {}\n💰 السعر: {} ريال\n📐 المساحة: {} م²\n🛏 غرف النوم: {} | 🚿 دورات المياه: {}\n📝 {}\n📞 للتواصل: {}",
            self.property_type,
            deal,
            self.district,
            self.price,
            self.area_sqm,
            self.bedrooms,
            self.bathrooms,
            self.description,
            self.contact,
        );
        caption.push_str(&format!("\n🔖 رقم ترخيص الإعلان: {}", self.license_no));
        caption
    }
}

/// Fields of a listing before the store assigns id, status and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub owner_id: i64,
    pub language: Language,
    pub deal: DealKind,
    pub property_type: String,
    pub district: String,
    pub price: u64,
    pub area_sqm: u64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub description: String,
    pub contact: String,
    pub license_no: String,
    pub deed_no: Option<String>,
    pub location: Option<Coordinate>,
    pub photos: Vec<String>,
}

/// Filter for the public listing search. All parts optional; district match
/// is case-sensitive substring containment on the stored text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    pub deal: Option<DealKind>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub district_contains: Option<String>,
}
