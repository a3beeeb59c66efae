use crate::domain::card::StoredCardRef;
use crate::domain::response::{
    CancelResponse, CardResponse, PaymentResponse, ThreedsInitializeResponse, VendorReply,
};
use crate::domain::result::PaymentResult;

/// Shown in place of the 3-D Secure challenge when initialization fails.
/// Static markup only: it re-reveals the host's card form so the client can
/// try again.
pub const THREEDS_FAILURE_FRAGMENT: &str = concat!(
    "<script type=\"text/javascript\">",
    "document.getElementById(\"frmThreeDAuth\").style.display = \"block\";",
    "document.getElementById(\"frmThreeDAuth\").className = \"\";",
    "</script>",
    "3D Secure işleminizde bir hata oluştu. Lütfen tekrar deneyiniz."
);

/// A charge only counts when Iyzipay approved it *and* it cleared fraud
/// screening; a fraud hold leaves the funds uncaptured.
pub fn interpret_payment(reply: VendorReply<PaymentResponse>) -> PaymentResult {
    let VendorReply { body, raw } = reply;
    if !body.header.is_success() || !body.passed_fraud_screening() {
        return PaymentResult::failed(raw);
    }
    match body.payment_id.clone() {
        Some(payment_id) => PaymentResult::captured(payment_id, body.commission(), raw),
        None => PaymentResult::failed(raw),
    }
}

pub fn interpret_cancel(reply: VendorReply<CancelResponse>) -> PaymentResult {
    let VendorReply { body, raw } = reply;
    match body.payment_id {
        Some(payment_id) if body.header.is_success() => {
            PaymentResult::refunded(payment_id, body.price, raw)
        }
        _ => PaymentResult::failed(raw),
    }
}

/// Successful card storage hands the host the joined `userKey|cardToken`.
pub fn interpret_card(reply: VendorReply<CardResponse>) -> PaymentResult {
    let VendorReply { body, raw } = reply;
    if !body.header.is_success() {
        return PaymentResult::failed(raw);
    }
    match (body.card_user_key, body.card_token) {
        (Some(user_key), Some(card_token)) => match StoredCardRef::new(user_key, card_token) {
            Ok(stored) => PaymentResult::card_stored(stored.to_string(), raw),
            Err(e) => {
                tracing::warn!(error = %e, "vendor returned an unusable card reference");
                PaymentResult::failed(raw)
            }
        },
        _ => PaymentResult::failed(raw),
    }
}

/// Iyzipay's delete reply carries no card keys, so a successful delete hands
/// back the reference that was removed.
pub fn interpret_card_delete(
    reply: VendorReply<CardResponse>,
    removed: &StoredCardRef,
) -> PaymentResult {
    let VendorReply { body, raw } = reply;
    if body.header.is_success() {
        PaymentResult::card_stored(removed.to_string(), raw)
    } else {
        PaymentResult::failed(raw)
    }
}

/// Page fragment for the host's checkout: the vendor's challenge page on
/// success, the local failure fragment otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ThreedsPage {
    Challenge(String),
    Failure(String),
}

impl ThreedsPage {
    pub fn html(&self) -> &str {
        match self {
            ThreedsPage::Challenge(html) | ThreedsPage::Failure(html) => html,
        }
    }

    pub fn into_html(self) -> String {
        match self {
            ThreedsPage::Challenge(html) | ThreedsPage::Failure(html) => html,
        }
    }
}

pub fn interpret_threeds_initialize(
    reply: &VendorReply<ThreedsInitializeResponse>,
) -> ThreedsPage {
    if reply.body.header.is_success() {
        if let Some(html) = reply.body.html_content() {
            return ThreedsPage::Challenge(html);
        }
        tracing::warn!("3-D Secure initialization succeeded without a usable challenge page");
    }
    ThreedsPage::Failure(THREEDS_FAILURE_FRAGMENT.to_string())
}
