//! Alert message rendering.

use giftwatch_core::{Gift, GiftId};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::html;
use url::Url;

const BUY_BUTTON_TEXT: &str = "🎁 Buy gift";

/// Price in TON without trailing zeros.
pub fn format_price(price: f64) -> String {
    format!("{} TON", price)
}

/// HTML alert body for a newly listed gift.
pub fn format_gift_alert(gift: &Gift) -> String {
    format!(
        "🎁 <b>New gift!</b>\n\n\
         📦 <b>Name:</b> {}\n\
         🏷 <b>Model:</b> {}\n\
         🔢 <b>Number:</b> {}\n\
         🎨 <b>Backdrop:</b> {}\n\
         💎 <b>Price:</b> {}",
        html::escape(&gift.name),
        html::escape(&gift.model),
        gift.gift_num,
        html::escape(&gift.backdrop),
        format_price(gift.price),
    )
}

/// Link that opens `id` in the marketplace mini app.
pub fn purchase_link(base: &Url, id: &GiftId) -> Url {
    let mut link = base.clone();
    link.query_pairs_mut().clear().append_pair("startapp", id.as_str());
    link
}

/// Single-button keyboard pointing at the purchase link.
pub fn purchase_keyboard(base: &Url, id: &GiftId) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([[InlineKeyboardButton::url(
        BUY_BUTTON_TEXT,
        purchase_link(base, id),
    )]])
}
