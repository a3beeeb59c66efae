use super::config::flexible_id;
use crate::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};

/// Identity number sent when no national-ID custom field is configured.
/// Iyzipay refuses buyers without one, and this is the value it documents
/// for buyers outside Turkey.
pub const PLACEHOLDER_NATIONAL_ID: &str = "11111111111";

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct CustomField {
    #[serde(deserialize_with = "flexible_id")]
    pub id: u64,
    #[serde(default)]
    pub value: String,
}

/// The client profile the host passes along with every gateway call.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct ClientDetails {
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
    #[serde(rename = "fullname", default)]
    pub full_name: Option<String>,
    pub email: String,
    pub address1: String,
    #[serde(default)]
    pub address2: Option<String>,
    pub city: String,
    pub country: String,
    #[serde(rename = "postcode", default)]
    pub post_code: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(rename = "customfields", default)]
    pub custom_fields: Vec<CustomField>,
}

impl ClientDetails {
    /// Checks the fields Iyzipay needs for a buyer before any request is built.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("firstname", &self.first_name),
            ("lastname", &self.last_name),
            ("email", &self.email),
            ("address1", &self.address1),
            ("city", &self.city),
            ("country", &self.country),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(GatewayError::MissingField(name));
            }
        }
        Ok(())
    }

    pub fn full_name(&self) -> String {
        match self.full_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }

    /// `address1`, followed by `address2` when the client filled it in.
    pub fn street_address(&self) -> String {
        match self.address2.as_deref().map(str::trim) {
            Some(second) if !second.is_empty() => format!("{} {}", self.address1, second),
            _ => self.address1.clone(),
        }
    }

    pub fn post_code(&self) -> Option<String> {
        self.post_code
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(ToString::to_string)
    }

    /// The national identity number held in custom field `field`, or the
    /// placeholder when no field is configured or the client left it empty.
    pub fn national_id(&self, field: Option<u64>) -> String {
        let Some(field) = field else {
            return PLACEHOLDER_NATIONAL_ID.to_string();
        };
        match self
            .custom_fields
            .iter()
            .find(|f| f.id == field)
            .map(|f| f.value.trim())
        {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => {
                tracing::warn!(field, "national ID field empty, using placeholder");
                PLACEHOLDER_NATIONAL_ID.to_string()
            }
        }
    }
}
