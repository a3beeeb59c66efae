use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Failed,
}

/// The mapping a gateway operation hands back to the host.
///
/// Keys the host does not expect for an outcome are left out entirely rather
/// than sent empty.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct PaymentResult {
    pub status: ResultStatus,
    #[serde(rename = "rawdata")]
    pub raw_data: String,
    #[serde(rename = "transid", skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<Decimal>,
    /// Amount given back by a refund; the host reads it from `fees`.
    #[serde(rename = "fees", skip_serializing_if = "Option::is_none")]
    pub refunded_amount: Option<Decimal>,
    #[serde(rename = "gatewayid", skip_serializing_if = "Option::is_none")]
    pub gateway_id: Option<String>,
}

impl PaymentResult {
    pub fn failed(raw_data: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Failed,
            raw_data: raw_data.into(),
            transaction_id: None,
            fee: None,
            refunded_amount: None,
            gateway_id: None,
        }
    }

    fn success(raw_data: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Success,
            ..Self::failed(raw_data)
        }
    }

    pub fn captured(transaction_id: String, fee: Decimal, raw_data: impl Into<String>) -> Self {
        Self {
            transaction_id: Some(transaction_id),
            fee: Some(fee),
            ..Self::success(raw_data)
        }
    }

    pub fn refunded(
        transaction_id: String,
        refunded_amount: Option<Decimal>,
        raw_data: impl Into<String>,
    ) -> Self {
        Self {
            transaction_id: Some(transaction_id),
            refunded_amount,
            ..Self::success(raw_data)
        }
    }

    pub fn card_stored(gateway_id: String, raw_data: impl Into<String>) -> Self {
        Self {
            gateway_id: Some(gateway_id),
            ..Self::success(raw_data)
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }
}
