//! Typed parameter sets the host passes to each gateway operation.

use crate::domain::card::{CardExpiry, CardNumber, PaymentMethod, RawCard, StoredCardRef};
use crate::domain::config::flexible_id;
use crate::domain::customer::ClientDetails;
use crate::error::{GatewayError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;

/// The host sends absent optional values as empty strings.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Input for a direct capture or a 3-D Secure initialization.
#[derive(Debug, Deserialize, Clone)]
pub struct PaymentParams {
    #[serde(rename = "invoiceid", deserialize_with = "flexible_id")]
    pub invoice_id: u64,
    pub amount: Decimal,
    #[serde(rename = "clientdetails")]
    pub client: ClientDetails,
    #[serde(rename = "cardnum", default)]
    pub card_number: Option<String>,
    #[serde(rename = "cardexp", default)]
    pub card_expiry: Option<String>,
    #[serde(rename = "cccvv", default)]
    pub card_cvc: Option<String>,
    #[serde(rename = "gatewayid", default)]
    pub gateway_id: Option<String>,
}

impl PaymentParams {
    /// A stored card reference wins over card data; with neither the call is
    /// rejected before anything is sent.
    pub fn payment_method(&self) -> Result<PaymentMethod> {
        if let Some(gateway_id) = present(&self.gateway_id) {
            return Ok(PaymentMethod::Stored(gateway_id.parse()?));
        }
        let number = present(&self.card_number).ok_or(GatewayError::MissingField("cardnum"))?;
        let expiry = present(&self.card_expiry).ok_or(GatewayError::MissingField("cardexp"))?;
        Ok(PaymentMethod::Card(RawCard {
            holder_name: self.client.full_name(),
            number: CardNumber::new(number)?,
            expiry: expiry.parse()?,
            cvc: present(&self.card_cvc).map(ToString::to_string),
        }))
    }
}

/// Input for a refund, which Iyzipay handles as a cancel of the payment.
#[derive(Debug, Deserialize, Clone)]
pub struct RefundParams {
    #[serde(rename = "transid")]
    pub transaction_id: String,
    #[serde(default)]
    pub amount: Option<Decimal>,
}

/// What the host wants done with a stored card.
#[derive(Debug, Clone, PartialEq)]
pub enum CardAction {
    Delete(StoredCardRef),
    Create {
        number: CardNumber,
        expiry: CardExpiry,
    },
    Update {
        existing: StoredCardRef,
        number: CardNumber,
        expiry: CardExpiry,
    },
}

/// Input for remote card storage.
#[derive(Debug, Deserialize, Clone)]
pub struct StoreCardParams {
    #[serde(rename = "clientdetails")]
    pub client: ClientDetails,
    #[serde(rename = "cardnum", default)]
    pub card_number: Option<String>,
    #[serde(rename = "cardexp", default)]
    pub card_expiry: Option<String>,
    #[serde(rename = "gatewayid", default)]
    pub gateway_id: Option<String>,
}

impl StoreCardParams {
    /// No card number means the client removed the card; a card number with
    /// no stored reference creates a new card user, otherwise the card is
    /// added under the existing user key.
    pub fn action(&self) -> Result<CardAction> {
        let stored = present(&self.gateway_id)
            .map(str::parse::<StoredCardRef>)
            .transpose()?;

        let Some(number) = present(&self.card_number) else {
            return stored
                .map(CardAction::Delete)
                .ok_or(GatewayError::MissingField("gatewayid"));
        };
        let number = CardNumber::new(number)?;
        let expiry = present(&self.card_expiry)
            .ok_or(GatewayError::MissingField("cardexp"))?
            .parse()?;

        Ok(match stored {
            None => CardAction::Create { number, expiry },
            Some(existing) => CardAction::Update {
                existing,
                number,
                expiry,
            },
        })
    }
}
