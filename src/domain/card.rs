use crate::error::{GatewayError, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Separator between user key and card token in the host's `gatewayid`.
pub const STORED_CARD_SEPARATOR: char = '|';

/// A card tokenised on Iyzipay's servers.
///
/// The host keeps a single opaque string per stored card, so the two vendor
/// keys travel joined as `userKey|cardToken`. Iyzipay never emits the
/// separator inside a user key, which makes splitting on the first one safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCardRef {
    pub user_key: String,
    pub card_token: String,
}

impl StoredCardRef {
    pub fn new(user_key: impl Into<String>, card_token: impl Into<String>) -> Result<Self> {
        let user_key = user_key.into();
        let card_token = card_token.into();
        if user_key.is_empty() || card_token.is_empty() {
            return Err(GatewayError::ValidationError(
                "Stored card reference needs both a user key and a card token".to_string(),
            ));
        }
        if user_key.contains(STORED_CARD_SEPARATOR) {
            return Err(GatewayError::ValidationError(format!(
                "Card user key must not contain '{STORED_CARD_SEPARATOR}'"
            )));
        }
        Ok(Self {
            user_key,
            card_token,
        })
    }
}

impl FromStr for StoredCardRef {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        let (user_key, card_token) = s.split_once(STORED_CARD_SEPARATOR).ok_or_else(|| {
            GatewayError::ValidationError("Malformed stored card reference".to_string())
        })?;
        Self::new(user_key, card_token)
    }
}

impl fmt::Display for StoredCardRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{STORED_CARD_SEPARATOR}{}",
            self.user_key, self.card_token
        )
    }
}

/// Card expiry as the host supplies it (`MMYY`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardExpiry {
    month: u8,
    year: u16,
}

impl CardExpiry {
    pub fn month(&self) -> String {
        format!("{:02}", self.month)
    }

    pub fn year(&self) -> String {
        self.year.to_string()
    }
}

impl FromStr for CardExpiry {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || GatewayError::ValidationError(format!("Invalid card expiry '{s}'"));
        if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let month: u8 = s[..2].parse().map_err(|_| invalid())?;
        let short_year: u16 = s[2..].parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        // Same two-digit year window the host applies.
        let year = if short_year < 70 {
            2000 + short_year
        } else {
            1900 + short_year
        };
        Ok(Self { month, year })
    }
}

/// A primary account number. `Debug` only shows the last four digits.
#[derive(Clone, PartialEq, Eq)]
pub struct CardNumber(String);

impl CardNumber {
    pub fn new(raw: &str) -> Result<Self> {
        let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if digits.len() < 12 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GatewayError::ValidationError(
                "Card number must contain 12 or more digits".to_string(),
            ));
        }
        Ok(Self(digits))
    }

    pub fn last_four(&self) -> &str {
        &self.0[self.0.len() - 4..]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CardNumber(****{})", self.last_four())
    }
}

impl Serialize for CardNumber {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawCard {
    pub holder_name: String,
    pub number: CardNumber,
    pub expiry: CardExpiry,
    pub cvc: Option<String>,
}

/// How a payment is funded. Exactly one of the two is ever used per call.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentMethod {
    Card(RawCard),
    Stored(StoredCardRef),
}
