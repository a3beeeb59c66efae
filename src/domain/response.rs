//! Vendor replies. Every field is optional because Iyzipay leaves most of
//! them out of a failure reply.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rust_decimal::Decimal;
use serde::Deserialize;

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_FAILURE: &str = "failure";

/// `fraudStatus` value meaning the payment cleared fraud screening.
pub const FRAUD_APPROVED: i32 = 1;

/// A typed reply together with the body exactly as received, which the host
/// keeps for auditing.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorReply<T> {
    pub body: T,
    pub raw: String,
}

impl<T> VendorReply<T> {
    pub fn new(body: T, raw: impl Into<String>) -> Self {
        Self {
            body,
            raw: raw.into(),
        }
    }
}

/// Fields every Iyzipay reply carries.
#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReplyHeader {
    #[serde(default)]
    pub status: String,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub error_group: Option<String>,
    pub conversation_id: Option<String>,
}

impl ReplyHeader {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case(STATUS_SUCCESS)
    }

    pub fn is_failure(&self) -> bool {
        self.status.eq_ignore_ascii_case(STATUS_FAILURE)
    }
}

#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    #[serde(flatten)]
    pub header: ReplyHeader,
    pub payment_id: Option<String>,
    pub basket_id: Option<String>,
    pub price: Option<Decimal>,
    pub paid_price: Option<Decimal>,
    pub currency: Option<String>,
    pub fraud_status: Option<i32>,
    pub iyzi_commission_rate_amount: Option<Decimal>,
    pub iyzi_commission_fee: Option<Decimal>,
}

impl PaymentResponse {
    pub fn passed_fraud_screening(&self) -> bool {
        self.fraud_status == Some(FRAUD_APPROVED)
    }

    /// What Iyzipay keeps from the payment: the percentage-based commission
    /// plus the fixed per-transaction fee.
    pub fn commission(&self) -> Decimal {
        self.iyzi_commission_rate_amount.unwrap_or_default()
            + self.iyzi_commission_fee.unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ThreedsInitializeResponse {
    #[serde(flatten)]
    pub header: ReplyHeader,
    #[serde(rename = "threeDSHtmlContent")]
    pub three_ds_html_content: Option<String>,
}

impl ThreedsInitializeResponse {
    /// The challenge page. Iyzipay ships it base64 encoded.
    pub fn html_content(&self) -> Option<String> {
        let encoded = self.three_ds_html_content.as_deref()?;
        let bytes = STANDARD.decode(encoded.trim()).ok()?;
        String::from_utf8(bytes).ok()
    }
}

#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    #[serde(flatten)]
    pub header: ReplyHeader,
    pub payment_id: Option<String>,
    pub price: Option<Decimal>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CardResponse {
    #[serde(flatten)]
    pub header: ReplyHeader,
    pub card_user_key: Option<String>,
    pub card_token: Option<String>,
    pub card_alias: Option<String>,
    pub bin_number: Option<String>,
    pub email: Option<String>,
}
