use crate::error::{GatewayError, Result};
use serde::Deserialize;

/// Path of the 3-D Secure callback script below the host's system URL.
pub const CALLBACK_PATH: &str = "modules/gateways/callback/iyzipay.php";

/// Per-request facts the host knows about the end user's HTTP request.
///
/// Built once per inbound call and handed to every operation that needs it.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RequestContext {
    #[serde(default)]
    pub client_ip: String,
    #[serde(rename = "systemurl", default)]
    pub system_url: String,
}

impl RequestContext {
    pub fn new(client_ip: impl Into<String>, system_url: impl Into<String>) -> Self {
        Self {
            client_ip: client_ip.into(),
            system_url: system_url.into(),
        }
    }

    pub fn client_ip(&self) -> Result<&str> {
        match self.client_ip.trim() {
            "" => Err(GatewayError::MissingField("client_ip")),
            ip => Ok(ip),
        }
    }

    /// Where Iyzipay posts the end user back after the 3-D Secure challenge.
    pub fn callback_url(&self) -> Result<String> {
        let base = self.system_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(GatewayError::MissingField("systemurl"));
        }
        Ok(format!("{base}/{CALLBACK_PATH}"))
    }
}
