// All user-facing copy in one place. The group runs primarily in Arabic;
// intake prompts and submitter notifications follow the language the user
// picked at the start of the conversation.

use crate::core::intake::{Reject, Step};
use crate::core::listings::{Language, Listing};
use crate::core::moderation::ViolationKind;

pub const START: &str = "\
أهلاً بك في بوت عقارات الرياض 🏠\n\
أرسل /new لتقديم إعلان عقاري جديد، أو /search للبحث في الإعلانات المعتمدة.\n\n\
Welcome! Send /new to submit a listing or /search to browse approved ads.";

pub const POLICY: &str = "\
📌 قوانين المجموعة:\n\
1. الإعلانات العقارية داخل منطقة الرياض فقط.\n\
2. يجب أن يتضمن كل إعلان رقم ترخيص الإعلان العقاري (رخصة فال).\n\
3. تمنع الإعلانات غير العقارية (سيارات، وظائف، أجهزة...).\n\
4. المخالفة تؤدي إلى حذف الرسالة وتقييد متصاعد للمخالفين المتكررين.\n\
لتقديم إعلان موثق انتقل إلى الخاص وأرسل /new";

pub const REMINDER: &str = "\
⏰ تذكير: الإعلانات العقارية المرخصة داخل الرياض فقط.\n\
للتقديم أرسل /new في الخاص، وسيتم نشر الإعلان بعد المراجعة.";

pub const ADMIN_ONLY: &str = "هذا الأمر متاح للمشرف فقط. / This command is admin-only.";

pub const DM_FOR_INTAKE: &str =
    "لتقديم إعلان جديد راسلني في الخاص وأرسل /new\nPlease message me privately and send /new.";

pub const NO_SESSION_HINT: &str =
    "لا توجد محادثة تقديم مفتوحة. أرسل /new للبدء.\nNo open submission. Send /new to start.";

pub const SEARCH_USAGE: &str = "\
طريقة الاستخدام: /search <بيع|إيجار> <أدنى>-<أعلى> <الحي>\n\
Usage: /search <sale|rent> <min>-<max> <district>";

pub const APPROVE_USAGE: &str = "Usage: /approve <listing id>";
pub const REJECT_USAGE: &str = "Usage: /reject <listing id> [reason]";

pub fn prompt(step: Step, language: Language) -> &'static str {
    use Language::*;
    use Step::*;
    match (step, language) {
        // The language prompt is shown before a choice exists, so it is
        // always bilingual.
        (SelectLanguage, _) => "اختر اللغة / Choose a language:\nالعربية / English",
        (SelectDealKind, Arabic) => "هل العقار للبيع أم للإيجار؟ أرسل: بيع أو إيجار",
        (SelectDealKind, English) => "Is the property for sale or for rent? Send: sale or rent",
        (PropertyType, Arabic) => "ما نوع العقار؟ (شقة، فيلا، أرض، دور...)",
        (PropertyType, English) => "What type of property is it? (apartment, villa, land...)",
        (District, Arabic) => "في أي حي يقع العقار؟",
        (District, English) => "Which district is the property in?",
        (Price, Arabic) => "كم السعر المطلوب بالريال؟",
        (Price, English) => "What is the asking price in SAR?",
        (Size, Arabic) => "كم مساحة العقار بالمتر المربع؟",
        (Size, English) => "What is the area in square meters?",
        (Bedrooms, Arabic) => "كم عدد غرف النوم؟",
        (Bedrooms, English) => "How many bedrooms?",
        (Bathrooms, Arabic) => "كم عدد دورات المياه؟",
        (Bathrooms, English) => "How many bathrooms?",
        (Description, Arabic) => "اكتب وصفاً مختصراً للعقار.",
        (Description, English) => "Write a short description of the property.",
        (Contact, Arabic) => "ما رقم التواصل؟",
        (Contact, English) => "What is the contact number?",
        (License, Arabic) => "أدخل رقم ترخيص الإعلان العقاري (7 إلى 12 رقماً).",
        (License, English) => "Enter the advertising license number (7-12 digits).",
        (Deed, Arabic) => "أدخل رقم الصك (اختياري) أو أرسل \"تخطي\".",
        (Deed, English) => "Enter the deed number (5-20 digits) or send \"skip\".",
        (Location, Arabic) => "أرسل موقع العقار من المرفقات أو أرسل \"تخطي\".",
        (Location, English) => "Share the property location, or send \"skip\".",
        (Photos, Arabic) => "أرسل صور العقار (حتى 10 صور)، ثم أرسل \"تم\".",
        (Photos, English) => "Send property photos (up to 10), then send \"done\".",
    }
}

pub fn invalid(reject: Reject, language: Language) -> &'static str {
    use Language::*;
    use Reject::*;
    match (reject, language) {
        (NotAChoice, Arabic) => "اختيار غير صحيح، حاول مرة أخرى.",
        (NotAChoice, English) => "That's not one of the choices, try again.",
        (ExpectedText, Arabic) => "الرجاء إرسال نص.",
        (ExpectedText, English) => "Please send a text answer.",
        (NotANumber, Arabic) => "الرجاء إرسال رقم صحيح.",
        (NotANumber, English) => "Please send a number.",
        (BadLicense, Arabic) => "رقم الترخيص يجب أن يكون من 7 إلى 12 رقماً.",
        (BadLicense, English) => "The license number must be 7 to 12 digits.",
        (BadDeed, Arabic) => "رقم الصك يجب أن يكون من 5 إلى 20 رقماً، أو أرسل \"تخطي\".",
        (BadDeed, English) => "The deed number must be 5 to 20 digits, or send \"skip\".",
        (ExpectedLocationOrSkip, Arabic) => "أرسل الموقع من المرفقات أو \"تخطي\".",
        (ExpectedLocationOrSkip, English) => "Share a location or send \"skip\".",
        (ExpectedPhotoOrDone, Arabic) => "أرسل صورة أو \"تم\" للإنهاء.",
        (ExpectedPhotoOrDone, English) => "Send a photo, or \"done\" to finish.",
    }
}

pub fn photo_ack(count: usize, language: Language) -> String {
    match language {
        Language::Arabic => format!("تم استلام الصورة ({count}/10). أرسل \"تم\" عند الانتهاء."),
        Language::English => format!("Photo received ({count}/10). Send \"done\" when finished."),
    }
}

pub fn submitted(listing_id: i64, language: Language) -> String {
    match language {
        Language::Arabic => format!(
            "شكراً لك! تم استلام إعلانك برقم {listing_id} وسيتم نشره بعد مراجعة المشرف."
        ),
        Language::English => format!(
            "Thank you! Your listing #{listing_id} was received and will be published after review."
        ),
    }
}

pub fn admin_new_listing(listing_id: i64) -> String {
    format!(
        "📥 إعلان جديد بانتظار المراجعة: #{listing_id}\n/approve {listing_id} أو /reject {listing_id}"
    )
}

pub fn approved_note(listing_id: i64, language: Language) -> String {
    match language {
        Language::Arabic => format!("✅ تم اعتماد إعلانك رقم {listing_id} ونشره في القناة."),
        Language::English => {
            format!("✅ Your listing #{listing_id} was approved and published.")
        }
    }
}

pub fn rejected_note(listing_id: i64, reason: &str, language: Language) -> String {
    match language {
        Language::Arabic => format!("❌ نعتذر، تم رفض إعلانك رقم {listing_id}.\nالسبب: {reason}"),
        Language::English => {
            format!("❌ Sorry, your listing #{listing_id} was rejected.\nReason: {reason}")
        }
    }
}

pub fn missing_license_notice() -> &'static str {
    "تم حذف إعلانك لعدم احتوائه على رقم ترخيص الإعلان العقاري.\n\
     أضف رقم الترخيص وأعد النشر، أو أرسل /new لتقديم إعلان موثق.\n\
     Your post was removed because it carries no advertising license number."
}

pub fn violation_notice(kind: ViolationKind, violation_count: u32, restrict_secs: u64) -> String {
    let what = match kind {
        ViolationKind::OffTopic => "محتوى خارج عن موضوع المجموعة (عقارات الرياض)",
        ViolationKind::OutsideRegion => "إعلان عن عقار خارج منطقة الرياض",
    };
    format!(
        "🚫 تم حذف رسالتك: {what}.\n\
         هذه المخالفة رقم {violation_count} لك، وتم تقييدك من الكتابة لمدة {}.",
        humanize_secs(restrict_secs)
    )
}

/// "24 ساعة" for sub-two-day spans, whole days otherwise.
pub fn humanize_secs(secs: u64) -> String {
    const DAY: u64 = 86_400;
    if secs < 2 * DAY {
        format!("{} ساعة", secs / 3_600)
    } else {
        format!("{} يوم", secs / DAY)
    }
}

/// One line per listing for /my_listings and /pending.
pub fn listing_line(listing: &Listing) -> String {
    let status = match listing.status {
        crate::core::listings::ListingStatus::Pending => "⏳",
        crate::core::listings::ListingStatus::Approved => "✅",
        crate::core::listings::ListingStatus::Rejected => "❌",
    };
    format!(
        "{status} #{} | {} | {} | {} ريال",
        listing.id, listing.property_type, listing.district, listing.price
    )
}

pub fn not_found(listing_id: i64) -> String {
    format!("لا يوجد إعلان بالرقم {listing_id}. / No listing with id {listing_id}.")
}

pub fn already_approved(listing_id: i64) -> String {
    format!("الإعلان {listing_id} معتمد مسبقاً، لن يعاد نشره.")
}

pub fn approved_ok(listing_id: i64) -> String {
    format!("تم اعتماد الإعلان {listing_id} ونشره في القناة.")
}

pub fn rejected_ok(listing_id: i64) -> String {
    format!("تم رفض الإعلان {listing_id} وإبلاغ صاحبه.")
}

pub const PENDING_EMPTY: &str = "لا توجد إعلانات بانتظار المراجعة.";
pub const MY_LISTINGS_EMPTY: &str = "لم تقدم أي إعلانات بعد. أرسل /new للبدء.";
pub const SEARCH_EMPTY: &str = "لا توجد نتائج مطابقة. / No matching listings.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restriction_lengths_render_in_hours_then_days() {
        assert_eq!(humanize_secs(86_400), "24 ساعة");
        assert_eq!(humanize_secs(259_200), "3 يوم");
        assert_eq!(humanize_secs(604_800), "7 يوم");
    }

    #[test]
    fn every_step_has_prompts_in_both_languages() {
        use Step::*;
        for step in [
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
        ] {
            assert!(!prompt(step, Language::Arabic).is_empty());
            assert!(!prompt(step, Language::English).is_empty());
        }
    }
}
