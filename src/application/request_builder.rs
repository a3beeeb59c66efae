use super::params::PaymentParams;
use crate::domain::basket::{InvoiceLine, invoice_total, merge_promotions};
use crate::domain::config::GatewayConfig;
use crate::domain::context::RequestContext;
use crate::domain::money::PaidAmount;
use crate::domain::ports::HostLedger;
use crate::domain::request::{
    Address, Buyer, Currency, Locale, PaymentCard, PaymentChannel, PaymentGroup, PaymentRequest,
};
use crate::error::{GatewayError, Result};

/// Everything the host database contributes to a payment request.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceSnapshot {
    pub invoice_id: u64,
    pub owner_id: u64,
    pub lines: Vec<InvoiceLine>,
}

impl InvoiceSnapshot {
    pub async fn load(ledger: &dyn HostLedger, invoice_id: u64) -> Result<Self> {
        let owner_id = ledger
            .invoice_owner(invoice_id)
            .await?
            .ok_or_else(|| GatewayError::Host(format!("Invoice {invoice_id} not found")))?;
        let lines = ledger.invoice_lines(invoice_id).await?;
        if lines.is_empty() {
            return Err(GatewayError::Host(format!(
                "Invoice {invoice_id} has no items"
            )));
        }
        Ok(Self {
            invoice_id,
            owner_id,
            lines,
        })
    }
}

/// Maps host data onto an Iyzipay payment request.
///
/// Pure: all input validation happens here, so a request that comes back
/// `Ok` is ready to send. Pass a `callback_url` to build a 3-D Secure
/// initialization instead of a direct payment.
pub fn build_payment_request(
    config: &GatewayConfig,
    context: &RequestContext,
    params: &PaymentParams,
    invoice: &InvoiceSnapshot,
    callback_url: Option<String>,
) -> Result<PaymentRequest> {
    params.client.validate()?;
    let paid = PaidAmount::new(params.amount)?;
    let method = params.payment_method()?;
    let basket_items = merge_promotions(&invoice.lines)?;
    if basket_items.is_empty() {
        return Err(GatewayError::ValidationError(format!(
            "Invoice {} has nothing left to charge after discounts",
            invoice.invoice_id
        )));
    }

    let client = &params.client;
    let street = client.street_address();
    let zip_code = client.post_code();

    let buyer = Buyer {
        id: invoice.owner_id.to_string(),
        name: client.first_name.clone(),
        surname: client.last_name.clone(),
        email: client.email.clone(),
        identity_number: client.national_id(config.national_id_field),
        registration_address: street.clone(),
        ip: context.client_ip()?.to_string(),
        city: client.city.clone(),
        country: client.country.clone(),
        zip_code: zip_code.clone(),
    };

    let billing_address = Address {
        contact_name: client.full_name(),
        city: client.city.clone(),
        country: client.country.clone(),
        address: street,
        zip_code,
    };

    Ok(PaymentRequest {
        locale: Locale::Tr,
        conversation_id: config.conversation_id().to_string(),
        price: invoice_total(&invoice.lines),
        paid_price: paid.price(),
        currency: Currency::Try,
        installment: 1,
        basket_id: invoice.invoice_id.to_string(),
        payment_channel: PaymentChannel::Web,
        payment_group: PaymentGroup::Subscription,
        payment_card: PaymentCard::from(&method),
        buyer,
        billing_address,
        basket_items,
        callback_url,
    })
}
