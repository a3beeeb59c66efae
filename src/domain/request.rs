//! Request payloads sent to Iyzipay, serialized exactly as the vendor expects.

use super::basket::BasketItem;
use super::card::{CardNumber, PaymentMethod};
use super::money::Price;
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Tr,
    En,
}

#[derive(Debug, Serialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Try,
}

#[derive(Debug, Serialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentChannel {
    Web,
}

#[derive(Debug, Serialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentGroup {
    Product,
    Listing,
    Subscription,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub identity_number: String,
    pub registration_address: String,
    pub ip: String,
    pub city: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub contact_name: String,
    pub city: String,
    pub country: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

/// The `paymentCard` object: either full card data or a stored card's keys.
#[derive(Debug, Serialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCard {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_holder_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<CardNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub register_card: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_user_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_token: Option<String>,
}

impl From<&PaymentMethod> for PaymentCard {
    fn from(method: &PaymentMethod) -> Self {
        match method {
            PaymentMethod::Card(card) => Self {
                card_holder_name: Some(card.holder_name.clone()),
                card_number: Some(card.number.clone()),
                expire_month: Some(card.expiry.month()),
                expire_year: Some(card.expiry.year()),
                cvc: card.cvc.clone(),
                register_card: Some(0),
                ..Self::default()
            },
            PaymentMethod::Stored(stored) => Self {
                card_user_key: Some(stored.user_key.clone()),
                card_token: Some(stored.card_token.clone()),
                ..Self::default()
            },
        }
    }
}

impl PaymentCard {
    pub fn is_stored(&self) -> bool {
        self.card_token.is_some()
    }
}

/// Payload for both a direct payment and a 3-D Secure initialization; the
/// latter only differs by carrying a callback URL.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub locale: Locale,
    pub conversation_id: String,
    pub price: Price,
    pub paid_price: Price,
    pub currency: Currency,
    pub installment: u8,
    pub basket_id: String,
    pub payment_channel: PaymentChannel,
    pub payment_group: PaymentGroup,
    pub payment_card: PaymentCard,
    pub buyer: Buyer,
    pub billing_address: Address,
    pub basket_items: Vec<BasketItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

impl PaymentRequest {
    /// JSON form of the request safe to hand to the host's module log:
    /// the card number is cut down to its last four digits and the CVC removed.
    pub fn log_view(&self) -> serde_json::Value {
        let mut view = serde_json::to_value(self).unwrap_or_default();
        if let Some(card) = view
            .get_mut("paymentCard")
            .and_then(serde_json::Value::as_object_mut)
        {
            if let Some(number) = &self.payment_card.card_number {
                card.insert(
                    "cardNumber".to_string(),
                    format!("****{}", number.last_four()).into(),
                );
            }
            card.remove("cvc");
        }
        view
    }
}

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ThreedsPaymentRequest {
    pub locale: Locale,
    pub conversation_id: String,
    pub payment_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_data: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    pub locale: Locale,
    pub conversation_id: String,
    pub payment_id: String,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CardInformation {
    pub card_alias: String,
    pub card_holder_name: String,
    pub card_number: CardNumber,
    pub expire_month: String,
    pub expire_year: String,
}

/// Stores a card, either for a new card user (identified by e-mail) or
/// under an existing `cardUserKey`.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    pub locale: Locale,
    pub conversation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_user_key: Option<String>,
    pub card: CardInformation,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCardRequest {
    pub locale: Locale,
    pub conversation_id: String,
    pub card_user_key: String,
    pub card_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::{RawCard, StoredCardRef};
    use serde_json::json;

    fn raw_card() -> PaymentMethod {
        PaymentMethod::Card(RawCard {
            holder_name: "John Doe".to_string(),
            number: CardNumber::new("5528790000000008").unwrap(),
            expiry: "1230".parse().unwrap(),
            cvc: Some("123".to_string()),
        })
    }

    #[test]
    fn test_raw_card_wire_shape() {
        let card = PaymentCard::from(&raw_card());
        assert!(!card.is_stored());
        assert_eq!(
            serde_json::to_value(&card).unwrap(),
            json!({
                "cardHolderName": "John Doe",
                "cardNumber": "5528790000000008",
                "expireMonth": "12",
                "expireYear": "2030",
                "cvc": "123",
                "registerCard": 0
            })
        );
    }

    #[test]
    fn test_stored_card_wire_shape() {
        let stored = StoredCardRef::new("user-key", "card-token").unwrap();
        let card = PaymentCard::from(&PaymentMethod::Stored(stored));
        assert!(card.is_stored());
        assert_eq!(
            serde_json::to_value(&card).unwrap(),
            json!({ "cardUserKey": "user-key", "cardToken": "card-token" })
        );
    }

    #[test]
    fn test_enum_wire_values() {
        assert_eq!(serde_json::to_value(Locale::Tr).unwrap(), json!("tr"));
        assert_eq!(serde_json::to_value(Currency::Try).unwrap(), json!("TRY"));
        assert_eq!(serde_json::to_value(PaymentChannel::Web).unwrap(), json!("WEB"));
        assert_eq!(
            serde_json::to_value(PaymentGroup::Subscription).unwrap(),
            json!("SUBSCRIPTION")
        );
    }

    #[test]
    fn test_delete_card_wire_shape() {
        let request = DeleteCardRequest {
            locale: Locale::Tr,
            conversation_id: "c1".to_string(),
            card_user_key: "uk".to_string(),
            card_token: "tk".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "locale": "tr",
                "conversationId": "c1",
                "cardUserKey": "uk",
                "cardToken": "tk"
            })
        );
    }
}
