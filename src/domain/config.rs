use crate::error::{GatewayError, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

pub const SANDBOX_BASE_URL: &str = "https://sandbox-api.iyzipay.com";
pub const PRODUCTION_BASE_URL: &str = "https://api.iyzipay.com";

/// Conversation id used when the administrator leaves the field blank.
/// Iyzipay echoes it back on every reply and the 3-D Secure callback is
/// matched against it, so it can never be empty.
pub const DEFAULT_CONVERSATION_ID: &str = "123456789";

/// Gateway settings as entered in the host's administrator UI.
///
/// Every recognised key is listed here; anything else is rejected so that a
/// misspelled setting fails loudly instead of being ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(deserialize_with = "secret")]
    pub api_key: SecretString,
    #[serde(deserialize_with = "secret")]
    pub secret_key: SecretString,
    /// Routes every call to the sandbox.
    #[serde(default, deserialize_with = "yes_no")]
    pub test_mode: bool,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub conversation_id: Option<String>,
    /// Id of the client custom field holding the Turkish national ID number.
    #[serde(rename = "tcModule", default, deserialize_with = "optional_id")]
    pub national_id_field: Option<u64>,
}

impl GatewayConfig {
    pub fn new(api_key: &str, secret_key: &str) -> Self {
        Self {
            api_key: SecretString::from(api_key.to_string()),
            secret_key: SecretString::from(secret_key.to_string()),
            test_mode: false,
            conversation_id: None,
            national_id_field: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(GatewayError::Config("apiKey must not be empty".to_string()));
        }
        if self.secret_key.expose_secret().trim().is_empty() {
            return Err(GatewayError::Config(
                "secretKey must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn base_url(&self) -> &'static str {
        if self.test_mode {
            SANDBOX_BASE_URL
        } else {
            PRODUCTION_BASE_URL
        }
    }

    pub fn conversation_id(&self) -> &str {
        self.conversation_id
            .as_deref()
            .unwrap_or(DEFAULT_CONVERSATION_ID)
    }
}

/// The loosely typed scalars a PHP host produces for a single setting.
#[derive(Deserialize)]
#[serde(untagged)]
enum HostScalar {
    Bool(bool),
    Int(u64),
    Str(String),
}

fn secret<'de, D>(deserializer: D) -> std::result::Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

/// `"on"`, `"yes"`, `"true"`, `"1"`, `true` or `1` mean enabled.
fn yes_no<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<HostScalar>::deserialize(deserializer)? {
        None => false,
        Some(HostScalar::Bool(b)) => b,
        Some(HostScalar::Int(n)) => n != 0,
        Some(HostScalar::Str(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "on" | "yes" | "true" | "1"
        ),
    })
}

fn blank_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn optional_id<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<HostScalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(HostScalar::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(scalar) => scalar_to_id(scalar).map(Some),
    }
}

/// Host ids arrive either as JSON numbers or as numeric strings.
pub(crate) fn flexible_id<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_to_id(HostScalar::deserialize(deserializer)?)
}

fn scalar_to_id<E: serde::de::Error>(scalar: HostScalar) -> std::result::Result<u64, E> {
    match scalar {
        HostScalar::Int(n) => Ok(n),
        HostScalar::Str(s) => s.trim().parse().map_err(E::custom),
        HostScalar::Bool(_) => Err(E::custom("expected a numeric id")),
    }
}
