use super::basket::InvoiceLine;
use super::request::{
    CancelRequest, CreateCardRequest, DeleteCardRequest, PaymentRequest, ThreedsPaymentRequest,
};
use super::response::{
    CancelResponse, CardResponse, PaymentResponse, ThreedsInitializeResponse, VendorReply,
};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

/// Remote side of the adapter: one method per vendor endpoint, each a single
/// round trip with no retries.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_payment(&self, request: &PaymentRequest)
    -> Result<VendorReply<PaymentResponse>>;

    async fn initialize_threeds(
        &self,
        request: &PaymentRequest,
    ) -> Result<VendorReply<ThreedsInitializeResponse>>;

    async fn create_threeds_payment(
        &self,
        request: &ThreedsPaymentRequest,
    ) -> Result<VendorReply<PaymentResponse>>;

    async fn cancel_payment(&self, request: &CancelRequest) -> Result<VendorReply<CancelResponse>>;

    async fn create_card(&self, request: &CreateCardRequest) -> Result<VendorReply<CardResponse>>;

    async fn delete_card(&self, request: &DeleteCardRequest) -> Result<VendorReply<CardResponse>>;
}

/// A payment to be booked against an invoice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoicePayment {
    pub invoice_id: u64,
    pub transaction_id: String,
    pub amount: Decimal,
    pub fee: Decimal,
    pub gateway: String,
}

/// The billing host's records and logs, as far as the adapter touches them.
#[async_trait]
pub trait HostLedger: Send + Sync {
    async fn invoice_lines(&self, invoice_id: u64) -> Result<Vec<InvoiceLine>>;

    /// Id of the client who owns the invoice.
    async fn invoice_owner(&self, invoice_id: u64) -> Result<Option<u64>>;

    async fn invoice_exists(&self, invoice_id: u64) -> Result<bool>;

    /// Whether a payment with this vendor transaction id was already booked.
    async fn transaction_exists(&self, transaction_id: &str) -> Result<bool>;

    async fn add_invoice_payment(&self, payment: InvoicePayment) -> Result<()>;

    async fn log_transaction(
        &self,
        gateway: &str,
        payload: &serde_json::Value,
        status: &str,
    ) -> Result<()>;

    async fn log_module_call(
        &self,
        module: &str,
        action: &str,
        request: &serde_json::Value,
        response: &str,
    ) -> Result<()>;
}

pub type PaymentProviderBox = Box<dyn PaymentProvider>;
pub type HostLedgerBox = Box<dyn HostLedger>;
