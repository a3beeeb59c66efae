use super::money::Price;
use crate::error::{GatewayError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category sent for invoice lines the host left untyped.
pub const DEFAULT_CATEGORY: &str = "Misc";

/// A single invoice line as stored by the billing host.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct InvoiceLine {
    pub id: u64,
    pub description: String,
    #[serde(rename = "type", default)]
    pub item_type: Option<String>,
    pub amount: Decimal,
}

#[derive(Debug, Serialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BasketItemType {
    Physical,
    Virtual,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BasketItem {
    pub id: String,
    pub name: String,
    pub category1: String,
    pub item_type: BasketItemType,
    pub price: Price,
}

impl BasketItem {
    fn from_line(line: &InvoiceLine) -> Self {
        let category = line
            .item_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);
        Self {
            id: line.id.to_string(),
            name: line.description.clone(),
            category1: category.to_string(),
            item_type: BasketItemType::Virtual,
            price: Price::new(line.amount),
        }
    }
}

/// Turns invoice lines into vendor basket items.
///
/// Iyzipay rejects negative basket items, so a negative line (a promotion) is
/// folded into the price of the item right before it. When that brings the
/// item to exactly zero the item is dropped. Later discounts then apply to
/// whatever item is last at that point.
pub fn merge_promotions(lines: &[InvoiceLine]) -> Result<Vec<BasketItem>> {
    lines.iter().try_fold(Vec::new(), |mut items, line| {
        if line.amount >= Decimal::ZERO {
            items.push(BasketItem::from_line(line));
            return Ok(items);
        }

        let Some(mut previous) = items.pop() else {
            return Err(GatewayError::ValidationError(format!(
                "Discount line {} has no preceding item",
                line.id
            )));
        };
        previous.price += Price::new(line.amount);

        if previous.price.is_negative() {
            return Err(GatewayError::ValidationError(format!(
                "Discount line {} exceeds the price of item {}",
                line.id, previous.id
            )));
        }
        if !previous.price.is_zero() {
            items.push(previous);
        }
        Ok(items)
    })
}

/// Sum of all invoice lines, discounts included.
pub fn invoice_total(lines: &[InvoiceLine]) -> Price {
    lines
        .iter()
        .fold(Price::ZERO, |total, line| total + Price::new(line.amount))
}
