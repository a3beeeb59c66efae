use super::interpreter::{
    THREEDS_FAILURE_FRAGMENT, ThreedsPage, interpret_cancel, interpret_card,
    interpret_card_delete, interpret_payment, interpret_threeds_initialize,
};
use super::params::{CardAction, PaymentParams, RefundParams, StoreCardParams};
use super::request_builder::{InvoiceSnapshot, build_payment_request};
use crate::domain::config::GatewayConfig;
use crate::domain::context::RequestContext;
use crate::domain::ports::{HostLedgerBox, PaymentProviderBox};
use crate::domain::request::{
    CancelRequest, CardInformation, CreateCardRequest, DeleteCardRequest, Locale,
};
use crate::domain::result::PaymentResult;
use crate::error::{GatewayError, Result};

/// Name under which the module logs and books payments in the host.
pub const MODULE_NAME: &str = "iyzipay";
const THREEDS_LOG_MODULE: &str = "iyzipay3ds";

/// The merchant-gateway adapter.
///
/// Constructed once per inbound host call with that call's configuration,
/// the vendor client and the host ledger. Every operation performs at most
/// one vendor round trip. Input problems come back as `Err` before anything
/// is sent; vendor and transport failures come back as a `failed` result.
pub struct GatewayAdapter {
    pub(crate) config: GatewayConfig,
    pub(crate) provider: PaymentProviderBox,
    pub(crate) ledger: HostLedgerBox,
}

impl GatewayAdapter {
    pub fn new(
        config: GatewayConfig,
        provider: PaymentProviderBox,
        ledger: HostLedgerBox,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            provider,
            ledger,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Charges the invoice directly with a card or a stored card.
    #[tracing::instrument(skip_all, fields(invoice_id = params.invoice_id))]
    pub async fn capture(
        &self,
        params: &PaymentParams,
        context: &RequestContext,
    ) -> Result<PaymentResult> {
        let invoice = InvoiceSnapshot::load(self.ledger.as_ref(), params.invoice_id).await?;
        let request = build_payment_request(&self.config, context, params, &invoice, None)?;

        let reply = match self.provider.create_payment(&request).await {
            Ok(reply) => reply,
            Err(e) if e.is_remote() => {
                tracing::error!(error = %e, "payment call failed");
                return Ok(PaymentResult::failed(e.to_string()));
            }
            Err(e) => return Err(e),
        };

        let result = interpret_payment(reply);
        if result.is_success() {
            tracing::info!(transaction_id = ?result.transaction_id, "payment captured");
        } else {
            tracing::warn!("payment declined or held by fraud screening");
            self.log_module_call(MODULE_NAME, "capture", &request.log_view(), &result.raw_data)
                .await;
        }
        Ok(result)
    }

    /// Starts a 3-D Secure payment and returns the markup the host shows the
    /// client: the bank's challenge page, or a retry notice.
    #[tracing::instrument(skip_all, fields(invoice_id = params.invoice_id))]
    pub async fn initialize_threeds(
        &self,
        params: &PaymentParams,
        context: &RequestContext,
    ) -> Result<ThreedsPage> {
        let invoice = InvoiceSnapshot::load(self.ledger.as_ref(), params.invoice_id).await?;
        let callback_url = context.callback_url()?;
        let request =
            build_payment_request(&self.config, context, params, &invoice, Some(callback_url))?;

        let page = match self.provider.initialize_threeds(&request).await {
            Ok(reply) => {
                let page = interpret_threeds_initialize(&reply);
                self.log_module_call(
                    THREEDS_LOG_MODULE,
                    "3dsInit",
                    &request.log_view(),
                    &reply.raw,
                )
                .await;
                page
            }
            Err(e) if e.is_remote() => {
                tracing::error!(error = %e, "3-D Secure initialization call failed");
                self.log_module_call(
                    THREEDS_LOG_MODULE,
                    "3dsInit",
                    &request.log_view(),
                    &e.to_string(),
                )
                .await;
                ThreedsPage::Failure(THREEDS_FAILURE_FRAGMENT.to_string())
            }
            Err(e) => return Err(e),
        };

        if let ThreedsPage::Failure(_) = page {
            tracing::warn!("3-D Secure initialization failed");
        }
        Ok(page)
    }

    /// Refunds a payment in full by cancelling it at Iyzipay.
    #[tracing::instrument(skip_all, fields(transaction_id = %params.transaction_id))]
    pub async fn refund(&self, params: &RefundParams) -> Result<PaymentResult> {
        let payment_id = params.transaction_id.trim();
        if payment_id.is_empty() {
            return Err(GatewayError::MissingField("transid"));
        }
        let request = CancelRequest {
            locale: Locale::Tr,
            conversation_id: self.config.conversation_id().to_string(),
            payment_id: payment_id.to_string(),
        };

        match self.provider.cancel_payment(&request).await {
            Ok(reply) => {
                let result = interpret_cancel(reply);
                tracing::info!(success = result.is_success(), "refund processed");
                Ok(result)
            }
            Err(e) if e.is_remote() => {
                tracing::error!(error = %e, "cancel call failed");
                Ok(PaymentResult::failed(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Creates, replaces or deletes the card Iyzipay stores for the client.
    #[tracing::instrument(skip_all)]
    pub async fn store_remote(&self, params: &StoreCardParams) -> Result<PaymentResult> {
        let action = params.action()?;
        let conversation_id = self.config.conversation_id().to_string();
        let client = &params.client;

        let reply = match action {
            CardAction::Delete(stored) => {
                let request = DeleteCardRequest {
                    locale: Locale::Tr,
                    conversation_id,
                    card_user_key: stored.user_key.clone(),
                    card_token: stored.card_token.clone(),
                };
                return match self.provider.delete_card(&request).await {
                    Ok(reply) => Ok(interpret_card_delete(reply, &stored)),
                    Err(e) if e.is_remote() => {
                        tracing::error!(error = %e, "card delete call failed");
                        Ok(PaymentResult::failed(e.to_string()))
                    }
                    Err(e) => Err(e),
                };
            }
            CardAction::Create { number, expiry } => {
                if client.email.trim().is_empty() {
                    return Err(GatewayError::MissingField("email"));
                }
                let request = CreateCardRequest {
                    locale: Locale::Tr,
                    conversation_id,
                    email: Some(client.email.clone()),
                    card_user_key: None,
                    card: CardInformation {
                        card_alias: client.uuid.clone().unwrap_or_default(),
                        card_holder_name: client.full_name(),
                        card_number: number,
                        expire_month: expiry.month(),
                        expire_year: expiry.year(),
                    },
                };
                self.provider.create_card(&request).await
            }
            CardAction::Update {
                existing,
                number,
                expiry,
            } => {
                let request = CreateCardRequest {
                    locale: Locale::Tr,
                    conversation_id,
                    email: None,
                    card_user_key: Some(existing.user_key),
                    card: CardInformation {
                        card_alias: client.uuid.clone().unwrap_or_default(),
                        card_holder_name: client.full_name(),
                        card_number: number,
                        expire_month: expiry.month(),
                        expire_year: expiry.year(),
                    },
                };
                self.provider.create_card(&request).await
            }
        };

        match reply {
            Ok(reply) => Ok(interpret_card(reply)),
            Err(e) if e.is_remote() => {
                tracing::error!(error = %e, "card storage call failed");
                Ok(PaymentResult::failed(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Module logging is best effort and never changes an outcome.
    pub(crate) async fn log_module_call(
        &self,
        module: &str,
        action: &str,
        request: &serde_json::Value,
        response: &str,
    ) {
        if let Err(e) = self
            .ledger
            .log_module_call(module, action, request, response)
            .await
        {
            tracing::warn!(error = %e, module, action, "could not write module log");
        }
    }

    pub(crate) async fn log_transaction(&self, payload: &serde_json::Value, status: &str) {
        if let Err(e) = self
            .ledger
            .log_transaction(MODULE_NAME, payload, status)
            .await
        {
            tracing::warn!(error = %e, status, "could not write transaction log");
        }
    }
}
