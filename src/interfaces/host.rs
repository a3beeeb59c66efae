use crate::application::gateway::GatewayAdapter;
use crate::domain::config::GatewayConfig;
use crate::domain::context::RequestContext;
use crate::domain::ports::{HostLedgerBox, PaymentProviderBox};
use crate::error::Result;
use crate::infrastructure::in_memory::{InMemoryHostLedger, Invoice};
use crate::infrastructure::iyzipay::IyzipayClient;
use serde::Deserialize;
use serde_json::{Value, json};

pub const DISPLAY_NAME: &str = "Iyzipay Merchant Gateway Module";
pub const API_VERSION: &str = "1.1";

/// What the host needs to know about the module before calling it.
pub fn module_metadata() -> Value {
    json!({
        "DisplayName": DISPLAY_NAME,
        "APIVersion": API_VERSION,
        "DisableLocalCredtCardInput": false,
        "TokenisedStorage": true,
    })
}

/// Settings form the host renders for the administrator. The keys match the
/// fields [`GatewayConfig`] accepts.
pub fn config_fields() -> Value {
    json!({
        "FriendlyName": {
            "Type": "System",
            "Value": "Iyzipay",
        },
        "apiKey": {
            "FriendlyName": "API Key",
            "Type": "password",
            "Size": "50",
            "Description": "Iyzipay merchant API key",
        },
        "secretKey": {
            "FriendlyName": "Secret Key",
            "Type": "password",
            "Size": "50",
            "Description": "Iyzipay merchant secret key",
        },
        "conversationId": {
            "FriendlyName": "Conversation ID",
            "Type": "text",
            "Size": "25",
            "Description": "Echoed by Iyzipay and checked on the 3D Secure callback",
        },
        "testMode": {
            "FriendlyName": "Test Mode",
            "Type": "yesno",
            "Description": "Send every request to the Iyzipay sandbox",
        },
        "tcModule": {
            "FriendlyName": "TC Kimlik Field ID",
            "Type": "text",
            "Size": "10",
            "Description": "Id of the client custom field holding the national ID number",
        },
    })
}

/// Everything the host hands over on one call, apart from the
/// operation's own parameters.
#[derive(Debug, Deserialize)]
pub struct HostSession {
    pub config: GatewayConfig,
    #[serde(default)]
    pub context: RequestContext,
    /// Invoices the operation may read or pay.
    #[serde(default)]
    pub invoices: Vec<Invoice>,
}

impl HostSession {
    /// Builds the adapter against the live Iyzipay endpoint, or against
    /// `base_url` when one is given.
    pub fn into_adapter(self, base_url: Option<&str>) -> Result<(GatewayAdapter, RequestContext)> {
        let HostSession {
            config,
            context,
            invoices,
        } = self;
        let client = match base_url {
            Some(url) => IyzipayClient::with_base_url(&config, url),
            None => IyzipayClient::new(&config),
        };
        let provider: PaymentProviderBox = Box::new(client);
        let ledger: HostLedgerBox = Box::new(InMemoryHostLedger::with_invoices(invoices));
        let adapter = GatewayAdapter::new(config, provider, ledger)?;
        Ok((adapter, context))
    }
}

/// A host call: the session plus the operation's parameters.
#[derive(Debug, Deserialize)]
pub struct HostCall<P> {
    #[serde(flatten)]
    pub session: HostSession,
    pub params: P,
}

impl<P: serde::de::DeserializeOwned> HostCall<P> {
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }
}
