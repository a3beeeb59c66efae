#![allow(dead_code)]

use serde_json::{Value, json};
use whmcs_iyzipay::application::gateway::GatewayAdapter;
use whmcs_iyzipay::domain::config::GatewayConfig;
use whmcs_iyzipay::domain::context::RequestContext;
use whmcs_iyzipay::domain::ports::{HostLedgerBox, PaymentProviderBox};
use whmcs_iyzipay::infrastructure::in_memory::{InMemoryHostLedger, Invoice};
use whmcs_iyzipay::infrastructure::iyzipay::IyzipayClient;

pub const CONVERSATION_ID: &str = "conv-778";
pub const SYSTEM_URL: &str = "https://billing.example.com/";

pub fn config() -> GatewayConfig {
    serde_json::from_value(json!({
        "apiKey": "sandbox-key",
        "secretKey": "sandbox-secret",
        "testMode": "on",
        "conversationId": CONVERSATION_ID,
        "tcModule": "4",
    }))
    .unwrap()
}

pub fn context() -> RequestContext {
    RequestContext::new("85.34.78.112", SYSTEM_URL)
}

pub fn client_details() -> Value {
    json!({
        "firstname": "Ayşe",
        "lastname": "Yılmaz",
        "fullname": "Ayşe Yılmaz",
        "email": "ayse@example.com",
        "address1": "Bağdat Cd. 12",
        "address2": "Daire 4",
        "city": "İstanbul",
        "country": "TR",
        "postcode": "34728",
        "uuid": "0b0f4c4e-6b58-4c8c-9e35-bbd0e0b6c1e2",
        "customfields": [{"id": "4", "value": "10000000146"}]
    })
}

/// Hosting package with a promotion line and a domain.
pub fn invoice_json() -> Value {
    json!({
        "id": 1001,
        "userid": 55,
        "items": [
            {"id": 1, "description": "Hosting", "type": "Hosting", "amount": "120.00"},
            {"id": 2, "description": "Promo", "type": "PromoHosting", "amount": "-20.00"},
            {"id": 3, "description": "example.com.tr", "type": "Domain", "amount": "15.50"}
        ]
    })
}

pub fn invoice() -> Invoice {
    serde_json::from_value(invoice_json()).unwrap()
}

pub fn card_params() -> Value {
    json!({
        "invoiceid": "1001",
        "amount": "115.50",
        "clientdetails": client_details(),
        "cardnum": "5528790000000008",
        "cardexp": "1230",
        "cccvv": "123",
        "gatewayid": ""
    })
}

pub fn payment_reply(fraud_status: i32) -> String {
    json!({
        "status": "success",
        "locale": "tr",
        "systemTime": 1_700_000_000_000u64,
        "conversationId": CONVERSATION_ID,
        "price": 115.5,
        "paidPrice": 115.5,
        "installment": 1,
        "paymentId": "11977349",
        "fraudStatus": fraud_status,
        "basketId": "1001",
        "currency": "TRY",
        "iyziCommissionRateAmount": 3.2845,
        "iyziCommissionFee": 0.25
    })
    .to_string()
}

pub fn failure_reply(code: &str, message: &str) -> String {
    json!({
        "status": "failure",
        "errorCode": code,
        "errorMessage": message,
        "locale": "tr",
        "conversationId": CONVERSATION_ID
    })
    .to_string()
}

/// Adapter wired to a mock Iyzipay, plus a handle on the ledger it writes to.
pub fn adapter(base_url: &str, ledger: &InMemoryHostLedger) -> GatewayAdapter {
    let config = config();
    let provider: PaymentProviderBox = Box::new(IyzipayClient::with_base_url(&config, base_url));
    let ledger: HostLedgerBox = Box::new(ledger.clone());
    GatewayAdapter::new(config, provider, ledger).unwrap()
}
