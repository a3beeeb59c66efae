use super::signature::{authorization_header, random_key};
use crate::domain::config::GatewayConfig;
use crate::domain::ports::PaymentProvider;
use crate::domain::request::{
    CancelRequest, CreateCardRequest, DeleteCardRequest, PaymentRequest, ThreedsPaymentRequest,
};
use crate::domain::response::{
    CancelResponse, CardResponse, PaymentResponse, ThreedsInitializeResponse, VendorReply,
};
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;

const PAYMENT_PATH: &str = "/payment/auth";
const THREEDS_INITIALIZE_PATH: &str = "/payment/3dsecure/initialize";
const THREEDS_AUTH_PATH: &str = "/payment/3dsecure/auth";
const CANCEL_PATH: &str = "/payment/cancel";
const CARD_STORAGE_PATH: &str = "/cardstorage/card";

const RANDOM_HEADER: &str = "x-iyzi-rnd";
const CLIENT_VERSION_HEADER: &str = "x-iyzi-client-version";

/// HTTP client for the Iyzipay REST API.
pub struct IyzipayClient {
    base_url: String,
    api_key: SecretString,
    secret_key: SecretString,
    client: reqwest::Client,
}

impl IyzipayClient {
    /// Client for the endpoint the configuration selects (sandbox or live).
    pub fn new(config: &GatewayConfig) -> Self {
        Self::with_base_url(config, config.base_url())
    }

    /// Client for an explicit endpoint, e.g. a local mock of the API.
    pub fn with_base_url(config: &GatewayConfig, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: SecretString::from(config.api_key.expose_secret().to_string()),
            secret_key: SecretString::from(config.secret_key.expose_secret().to_string()),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<Req, Resp>(
        &self,
        method: Method,
        path: &str,
        request: &Req,
    ) -> Result<VendorReply<Resp>>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let body = serde_json::to_string(request)?;
        let rnd = random_key();
        let authorization = authorization_header(
            self.api_key.expose_secret(),
            self.secret_key.expose_secret(),
            &rnd,
            path,
            &body,
        )?;

        tracing::debug!(%method, path, "calling iyzipay");
        let response = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header(AUTHORIZATION, authorization)
            .header(RANDOM_HEADER, rnd)
            .header(
                CLIENT_VERSION_HEADER,
                concat!("whmcs-iyzipay-", env!("CARGO_PKG_VERSION")),
            )
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let http_status = response.status();
        let raw = response.text().await?;
        tracing::debug!(status = http_status.as_u16(), path, "iyzipay replied");

        // Business failures arrive as JSON regardless of the HTTP status, so
        // the body decides; only an undecodable body is a transport problem.
        let body: Resp = serde_json::from_str(&raw).map_err(|e| {
            GatewayError::MalformedResponse(format!(
                "HTTP {} from {path}: {e}: {}",
                http_status.as_u16(),
                raw.chars().take(200).collect::<String>()
            ))
        })?;
        Ok(VendorReply::new(body, raw))
    }
}

#[async_trait]
impl PaymentProvider for IyzipayClient {
    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<VendorReply<PaymentResponse>> {
        self.call(Method::POST, PAYMENT_PATH, request).await
    }

    async fn initialize_threeds(
        &self,
        request: &PaymentRequest,
    ) -> Result<VendorReply<ThreedsInitializeResponse>> {
        self.call(Method::POST, THREEDS_INITIALIZE_PATH, request).await
    }

    async fn create_threeds_payment(
        &self,
        request: &ThreedsPaymentRequest,
    ) -> Result<VendorReply<PaymentResponse>> {
        self.call(Method::POST, THREEDS_AUTH_PATH, request).await
    }

    async fn cancel_payment(&self, request: &CancelRequest) -> Result<VendorReply<CancelResponse>> {
        self.call(Method::POST, CANCEL_PATH, request).await
    }

    async fn create_card(&self, request: &CreateCardRequest) -> Result<VendorReply<CardResponse>> {
        self.call(Method::POST, CARD_STORAGE_PATH, request).await
    }

    async fn delete_card(&self, request: &DeleteCardRequest) -> Result<VendorReply<CardResponse>> {
        self.call(Method::DELETE, CARD_STORAGE_PATH, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{PRODUCTION_BASE_URL, SANDBOX_BASE_URL};
    use crate::domain::request::Locale;
    use wiremock::matchers::{body_partial_json, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_endpoint_follows_test_mode() {
        let mut config = GatewayConfig::new("k", "s");
        assert_eq!(IyzipayClient::new(&config).base_url(), PRODUCTION_BASE_URL);
        config.test_mode = true;
        assert_eq!(IyzipayClient::new(&config).base_url(), SANDBOX_BASE_URL);
    }

    #[tokio::test]
    async fn test_signed_cancel_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payment/cancel"))
            .and(header_exists("authorization"))
            .and(header_exists("x-iyzi-rnd"))
            .and(body_partial_json(serde_json::json!({ "paymentId": "11977349" })))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"status":"success","paymentId":"11977349","price":1.1,"currency":"TRY"}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = IyzipayClient::with_base_url(&GatewayConfig::new("k", "s"), &server.uri());
        let reply = client
            .cancel_payment(&CancelRequest {
                locale: Locale::Tr,
                conversation_id: "123456789".to_string(),
                payment_id: "11977349".to_string(),
            })
            .await
            .unwrap();

        assert!(reply.body.header.is_success());
        assert!(reply.raw.contains("\"paymentId\":\"11977349\""));
    }

    #[tokio::test]
    async fn test_failure_reply_with_error_status_is_still_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/cardstorage/card"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"status":"failure","errorCode":"1001","errorMessage":"api bilgileri bulunamadı"}"#,
            ))
            .mount(&server)
            .await;

        let client = IyzipayClient::with_base_url(&GatewayConfig::new("k", "s"), &server.uri());
        let reply = client
            .delete_card(&DeleteCardRequest {
                locale: Locale::Tr,
                conversation_id: "c".to_string(),
                card_user_key: "uk".to_string(),
                card_token: "tok".to_string(),
            })
            .await
            .unwrap();
        assert!(reply.body.header.is_failure());
        assert_eq!(reply.body.header.error_code.as_deref(), Some("1001"));
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let client = IyzipayClient::with_base_url(&GatewayConfig::new("k", "s"), &server.uri());
        let err = client
            .cancel_payment(&CancelRequest {
                locale: Locale::Tr,
                conversation_id: "c".to_string(),
                payment_id: "1".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
        assert!(err.is_remote());
    }
}
