use super::gateway::{GatewayAdapter, MODULE_NAME};
use crate::domain::ports::InvoicePayment;
use crate::domain::request::{Locale, ThreedsPaymentRequest};
use crate::domain::response::{PaymentResponse, VendorReply};
use crate::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

pub const VERIFICATION_FAILED: &str = "Request cannot be verified";
pub const THREEDS_FAILED: &str = "3D Secure payment failed";
pub const FRAUD_HOLD: &str = "Payment held by fraud screening";

/// Fields Iyzipay posts to the callback URL after the 3-D Secure challenge.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CallbackForm {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub conversation_id: String,
    #[serde(default)]
    pub conversation_data: Option<String>,
}

impl CallbackForm {
    /// Parses an `application/x-www-form-urlencoded` POST body.
    pub fn from_urlencoded(body: &str) -> Result<Self> {
        serde_urlencoded::from_str(body.trim())
            .map_err(|e| GatewayError::ValidationError(format!("Invalid callback body: {e}")))
    }
}

/// One inbound callback, bound to the conversation id it must match.
/// Consumed by [`GatewayAdapter::complete_threeds`].
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackState {
    pub expected_conversation_id: String,
    pub form: CallbackForm,
}

impl CallbackState {
    pub fn new(expected_conversation_id: impl Into<String>, form: CallbackForm) -> Self {
        Self {
            expected_conversation_id: expected_conversation_id.into(),
            form,
        }
    }

    fn is_verified(&self) -> bool {
        !self.form.conversation_id.is_empty()
            && self.form.conversation_id == self.expected_conversation_id
    }
}

/// Where the end user is sent once the callback is done.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceRedirect {
    pub invoice_id: Option<u64>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl InvoiceRedirect {
    fn failed(invoice_id: Option<u64>, message: impl Into<String>) -> Self {
        Self {
            invoice_id,
            success: false,
            message: Some(message.into()),
        }
    }

    /// Invoice page carrying the outcome flag, or the client's invoice list
    /// when the invoice is not known.
    pub fn location(&self, system_url: &str) -> Result<String> {
        let mut base = Url::parse(system_url.trim())
            .map_err(|e| GatewayError::ValidationError(format!("Invalid system URL: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let location = match self.invoice_id {
            Some(invoice_id) => {
                let mut url = base.join("viewinvoice.php").map_err(|e| {
                    GatewayError::ValidationError(format!("Invalid system URL: {e}"))
                })?;
                let flag = if self.success {
                    "paymentsuccess"
                } else {
                    "paymentfailed"
                };
                url.query_pairs_mut()
                    .append_pair("id", &invoice_id.to_string())
                    .append_pair(flag, "true");
                url
            }
            None => {
                let mut url = base.join("clientarea.php").map_err(|e| {
                    GatewayError::ValidationError(format!("Invalid system URL: {e}"))
                })?;
                url.query_pairs_mut().append_pair("action", "invoices");
                url
            }
        };
        Ok(location.into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum CallbackOutcome {
    /// The callback could not be tied to our conversation; nothing was done
    /// and the user is not redirected.
    Rejected { message: String },
    Redirect(InvoiceRedirect),
}

impl GatewayAdapter {
    /// Handles the POST Iyzipay sends after the 3-D Secure challenge.
    ///
    /// Single pass, no retries. Every branch after the conversation check
    /// ends in a redirect; nothing in here returns an error to the host.
    #[tracing::instrument(skip_all, fields(payment_id = ?form.payment_id))]
    pub async fn handle_threeds_callback(&self, form: CallbackForm) -> CallbackOutcome {
        let state = CallbackState::new(self.config.conversation_id(), form);
        self.complete_threeds(state).await
    }

    pub async fn complete_threeds(&self, state: CallbackState) -> CallbackOutcome {
        if !state.is_verified() {
            tracing::warn!(
                received = %state.form.conversation_id,
                "callback conversation id mismatch"
            );
            return CallbackOutcome::Rejected {
                message: VERIFICATION_FAILED.to_string(),
            };
        }

        let payload = serde_json::to_value(&state.form).unwrap_or_default();
        let redirect = self.finish_payment(state.form).await;
        let status = if redirect.success {
            "Success"
        } else {
            redirect.message.as_deref().unwrap_or(THREEDS_FAILED)
        };
        self.log_transaction(&payload, status).await;
        CallbackOutcome::Redirect(redirect)
    }

    async fn finish_payment(&self, form: CallbackForm) -> InvoiceRedirect {
        if !form.status.eq_ignore_ascii_case("success") {
            tracing::info!(status = %form.status, "3-D Secure challenge not passed");
            return InvoiceRedirect::failed(None, THREEDS_FAILED);
        }
        let Some(payment_id) = form.payment_id.filter(|id| !id.trim().is_empty()) else {
            return InvoiceRedirect::failed(None, THREEDS_FAILED);
        };

        let request = ThreedsPaymentRequest {
            locale: Locale::Tr,
            conversation_id: self.config.conversation_id().to_string(),
            payment_id,
            conversation_data: form.conversation_data,
        };
        let reply = match self.provider.create_threeds_payment(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(error = %e, "3-D Secure completion call failed");
                return InvoiceRedirect::failed(None, THREEDS_FAILED);
            }
        };

        self.settle(reply).await
    }

    async fn settle(&self, reply: VendorReply<PaymentResponse>) -> InvoiceRedirect {
        let body = &reply.body;
        let invoice_id = body
            .basket_id
            .as_deref()
            .and_then(|id| id.trim().parse::<u64>().ok());

        if body.header.is_success() && body.passed_fraud_screening() {
            return match self.book_payment(body, invoice_id).await {
                Ok(invoice_id) => InvoiceRedirect {
                    invoice_id: Some(invoice_id),
                    success: true,
                    message: None,
                },
                Err(e) => {
                    tracing::error!(error = %e, "3-D Secure payment could not be booked");
                    InvoiceRedirect::failed(invoice_id, e.to_string())
                }
            };
        }

        if body.header.is_success() {
            tracing::warn!(fraud_status = ?body.fraud_status, "3-D Secure payment held");
            return InvoiceRedirect::failed(invoice_id, FRAUD_HOLD);
        }

        let message = body
            .header
            .error_message
            .clone()
            .unwrap_or_else(|| THREEDS_FAILED.to_string());
        tracing::warn!(error_code = ?body.header.error_code, %message, "3-D Secure payment failed");
        InvoiceRedirect::failed(invoice_id, message)
    }

    /// Validates the vendor's ids against the host's records and books the
    /// payment on the invoice.
    async fn book_payment(&self, body: &PaymentResponse, invoice_id: Option<u64>) -> Result<u64> {
        let invoice_id = invoice_id.ok_or(GatewayError::MissingField("basketId"))?;
        let transaction_id = body
            .payment_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or(GatewayError::MissingField("paymentId"))?;
        let amount = body
            .paid_price
            .ok_or(GatewayError::MissingField("paidPrice"))?;

        if !self.ledger.invoice_exists(invoice_id).await? {
            return Err(GatewayError::Host(format!("Unknown invoice {invoice_id}")));
        }
        if self.ledger.transaction_exists(&transaction_id).await? {
            return Err(GatewayError::Host(format!(
                "Transaction {transaction_id} already recorded"
            )));
        }

        self.ledger
            .add_invoice_payment(InvoicePayment {
                invoice_id,
                transaction_id,
                amount,
                fee: body.commission(),
                gateway: MODULE_NAME.to_string(),
            })
            .await?;
        tracing::info!(invoice_id, "3-D Secure payment booked");
        Ok(invoice_id)
    }
}
