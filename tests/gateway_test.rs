mod common;

use common::*;
use rust_decimal_macros::dec;
use serde_json::json;
use whmcs_iyzipay::application::interpreter::{THREEDS_FAILURE_FRAGMENT, ThreedsPage};
use whmcs_iyzipay::application::params::{PaymentParams, RefundParams, StoreCardParams};
use whmcs_iyzipay::domain::result::ResultStatus;
use whmcs_iyzipay::error::GatewayError;
use whmcs_iyzipay::infrastructure::in_memory::InMemoryHostLedger;
use wiremock::matchers::{body_partial_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn payment_params() -> PaymentParams {
    serde_json::from_value(card_params()).unwrap()
}

#[tokio::test]
async fn test_capture_success_reports_transaction_and_fee() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payment/auth"))
        .and(header_exists("authorization"))
        .and(body_partial_json(json!({
            "conversationId": CONVERSATION_ID,
            "price": "115.5",
            "paidPrice": "115.5",
            "basketId": "1001",
            "buyer": {"id": "55", "identityNumber": "10000000146", "ip": "85.34.78.112"},
            "basketItems": [
                {"id": "1", "price": "100.0"},
                {"id": "3", "price": "15.5"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(payment_reply(1)))
        .expect(1)
        .mount(&server)
        .await;

    let ledger = InMemoryHostLedger::with_invoices([invoice()]);
    let adapter = adapter(&server.uri(), &ledger);

    let result = adapter.capture(&payment_params(), &context()).await.unwrap();

    assert_eq!(result.status, ResultStatus::Success);
    assert_eq!(result.transaction_id.as_deref(), Some("11977349"));
    assert_eq!(result.fee, Some(dec!(3.5345)));
    assert!(result.raw_data.contains("11977349"));
    assert!(ledger.module_log().await.is_empty());
}

#[tokio::test]
async fn test_capture_fraud_hold_is_a_failure_and_logged_without_card_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payment/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_string(payment_reply(0)))
        .mount(&server)
        .await;

    let ledger = InMemoryHostLedger::with_invoices([invoice()]);
    let adapter = adapter(&server.uri(), &ledger);

    let result = adapter.capture(&payment_params(), &context()).await.unwrap();
    assert_eq!(result.status, ResultStatus::Failed);
    assert!(result.transaction_id.is_none());
    assert!(result.fee.is_none());

    let log = ledger.module_log().await;
    assert_eq!(log.len(), 1);
    let card = &log[0].request["paymentCard"];
    assert_eq!(card["cardNumber"], "****0008");
    assert!(card.get("cvc").is_none());
}

#[tokio::test]
async fn test_capture_vendor_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payment/auth"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(failure_reply("10051", "Kart limiti yetersiz")),
        )
        .mount(&server)
        .await;

    let ledger = InMemoryHostLedger::with_invoices([invoice()]);
    let adapter = adapter(&server.uri(), &ledger);

    let result = adapter.capture(&payment_params(), &context()).await.unwrap();
    assert_eq!(result.status, ResultStatus::Failed);
    assert!(result.raw_data.contains("10051"));
}

#[tokio::test]
async fn test_capture_with_unreachable_vendor_is_failed_result() {
    // Nothing listens here once the server is dropped.
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };
    let ledger = InMemoryHostLedger::with_invoices([invoice()]);
    let adapter = adapter(&uri, &ledger);

    let result = adapter.capture(&payment_params(), &context()).await.unwrap();
    assert_eq!(result.status, ResultStatus::Failed);
    assert!(!result.raw_data.is_empty());
}

#[tokio::test]
async fn test_capture_input_errors_never_reach_the_vendor() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(payment_reply(1)))
        .expect(0)
        .mount(&server)
        .await;

    let ledger = InMemoryHostLedger::with_invoices([invoice()]);
    let adapter = adapter(&server.uri(), &ledger);

    let mut no_card = card_params();
    no_card["cardnum"] = json!("");
    let params: PaymentParams = serde_json::from_value(no_card).unwrap();
    let err = adapter.capture(&params, &context()).await.unwrap_err();
    assert!(matches!(err, GatewayError::MissingField("cardnum")));

    let mut zero = card_params();
    zero["amount"] = json!("0.00");
    let params: PaymentParams = serde_json::from_value(zero).unwrap();
    let err = adapter.capture(&params, &context()).await.unwrap_err();
    assert!(matches!(err, GatewayError::ValidationError(_)));

    let mut unknown_invoice = card_params();
    unknown_invoice["invoiceid"] = json!(999);
    let params: PaymentParams = serde_json::from_value(unknown_invoice).unwrap();
    let err = adapter.capture(&params, &context()).await.unwrap_err();
    assert!(matches!(err, GatewayError::Host(_)));
}

#[tokio::test]
async fn test_capture_with_stored_card_sends_only_the_keys() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payment/auth"))
        .and(body_partial_json(json!({
            "paymentCard": {"cardUserKey": "ukey", "cardToken": "ctoken"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(payment_reply(1)))
        .expect(1)
        .mount(&server)
        .await;

    let ledger = InMemoryHostLedger::with_invoices([invoice()]);
    let adapter = adapter(&server.uri(), &ledger);

    let mut stored = card_params();
    stored["gatewayid"] = json!("ukey|ctoken");
    stored["cardnum"] = json!("");
    let params: PaymentParams = serde_json::from_value(stored).unwrap();

    let result = adapter.capture(&params, &context()).await.unwrap();
    assert!(result.is_success());
}

#[tokio::test]
async fn test_threeds_initialize_returns_decoded_challenge() {
    use base64::Engine as _;
    let page = "<form id=\"iyzico-3ds-form\"></form>";
    let encoded = base64::engine::general_purpose::STANDARD.encode(page);

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payment/3dsecure/initialize"))
        .and(body_partial_json(json!({
            "callbackUrl": "https://billing.example.com/modules/gateways/callback/iyzipay.php"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            json!({"status": "success", "threeDSHtmlContent": encoded}).to_string(),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let ledger = InMemoryHostLedger::with_invoices([invoice()]);
    let adapter = adapter(&server.uri(), &ledger);

    let result = adapter
        .initialize_threeds(&payment_params(), &context())
        .await
        .unwrap();
    assert_eq!(result, ThreedsPage::Challenge(page.to_string()));
    assert_eq!(ledger.module_log().await[0].module, "iyzipay3ds");
}

#[tokio::test]
async fn test_threeds_initialize_failure_shows_retry_fragment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payment/3dsecure/initialize"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(failure_reply("12", "Geçersiz kart")),
        )
        .mount(&server)
        .await;

    let ledger = InMemoryHostLedger::with_invoices([invoice()]);
    let adapter = adapter(&server.uri(), &ledger);

    let result = adapter
        .initialize_threeds(&payment_params(), &context())
        .await
        .unwrap();
    assert_eq!(result.html(), THREEDS_FAILURE_FRAGMENT);
    assert!(ledger.module_log().await[0].response.contains("Geçersiz kart"));
}

#[tokio::test]
async fn test_refund_cancels_the_payment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payment/cancel"))
        .and(body_partial_json(json!({"paymentId": "11977349"})))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            json!({"status": "success", "paymentId": "11977349", "price": 115.5, "currency": "TRY"})
                .to_string(),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let ledger = InMemoryHostLedger::new();
    let adapter = adapter(&server.uri(), &ledger);

    let params: RefundParams =
        serde_json::from_value(json!({"transid": "11977349", "amount": "115.50"})).unwrap();
    let result = adapter.refund(&params).await.unwrap();

    let host = serde_json::to_value(&result).unwrap();
    assert_eq!(host["status"], "success");
    assert_eq!(host["transid"], "11977349");
    assert_eq!(result.refunded_amount, Some(dec!(115.5)));
}

#[tokio::test]
async fn test_refund_failure_has_no_transaction_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payment/cancel"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(failure_reply("5093", "İptal süresi geçmiş")),
        )
        .mount(&server)
        .await;

    let adapter = adapter(&server.uri(), &InMemoryHostLedger::new());
    let params: RefundParams = serde_json::from_value(json!({"transid": "11977349"})).unwrap();

    let result = adapter.refund(&params).await.unwrap();
    let host = serde_json::to_value(&result).unwrap();
    assert_eq!(host["status"], "failed");
    assert!(host.get("transid").is_none());
    assert!(host.get("fees").is_none());
}

#[tokio::test]
async fn test_store_card_creates_card_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cardstorage/card"))
        .and(body_partial_json(json!({
            "email": "ayse@example.com",
            "card": {"cardNumber": "5528790000000008", "expireMonth": "12", "expireYear": "2030"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            json!({
                "status": "success",
                "cardUserKey": "ukey",
                "cardToken": "ctoken",
                "binNumber": "552879",
                "email": "ayse@example.com"
            })
            .to_string(),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter(&server.uri(), &InMemoryHostLedger::new());
    let params: StoreCardParams = serde_json::from_value(json!({
        "clientdetails": client_details(),
        "cardnum": "5528 7900 0000 0008",
        "cardexp": "1230"
    }))
    .unwrap();

    let result = adapter.store_remote(&params).await.unwrap();
    assert_eq!(result.gateway_id.as_deref(), Some("ukey|ctoken"));
}

#[tokio::test]
async fn test_store_card_without_number_deletes_stored_card() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/cardstorage/card"))
        .and(body_partial_json(json!({"cardUserKey": "ukey", "cardToken": "ctoken"})))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            json!({
                "status": "success",
                "locale": "tr",
                "systemTime": 1_700_000_000_000u64,
                "conversationId": CONVERSATION_ID
            })
            .to_string(),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter(&server.uri(), &InMemoryHostLedger::new());
    let params: StoreCardParams = serde_json::from_value(json!({
        "clientdetails": client_details(),
        "cardnum": "",
        "gatewayid": "ukey|ctoken"
    }))
    .unwrap();

    let result = adapter.store_remote(&params).await.unwrap();
    assert!(result.is_success());
    assert_eq!(result.gateway_id.as_deref(), Some("ukey|ctoken"));
    assert!(result.raw_data.contains(CONVERSATION_ID));
}

#[tokio::test]
async fn test_store_card_delete_failure() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/cardstorage/card"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(failure_reply("11", "Kart bulunamadı")),
        )
        .mount(&server)
        .await;

    let adapter = adapter(&server.uri(), &InMemoryHostLedger::new());
    let params: StoreCardParams = serde_json::from_value(json!({
        "clientdetails": client_details(),
        "gatewayid": "ukey|ctoken"
    }))
    .unwrap();

    let result = adapter.store_remote(&params).await.unwrap();
    assert_eq!(result.status, ResultStatus::Failed);
    assert!(result.gateway_id.is_none());
}
