//! `IYZWSv2` request authentication.

use crate::error::{GatewayError, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

pub const AUTHORIZATION_SCHEME: &str = "IYZWSv2";

/// A fresh per-request nonce: current time in milliseconds followed by
/// random digits.
pub fn random_key() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let suffix: u32 = rand::thread_rng().gen_range(100_000_000..1_000_000_000);
    format!("{millis}{suffix}")
}

/// Hex HMAC-SHA256 over `random_key + uri_path + body`, keyed by the secret.
pub fn signature(secret_key: &str, random_key: &str, uri_path: &str, body: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|e| GatewayError::Signature(e.to_string()))?;
    mac.update(random_key.as_bytes());
    mac.update(uri_path.as_bytes());
    mac.update(body.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Value of the `Authorization` header for one request.
pub fn authorization_header(
    api_key: &str,
    secret_key: &str,
    random_key: &str,
    uri_path: &str,
    body: &str,
) -> Result<String> {
    let signature = signature(secret_key, random_key, uri_path, body)?;
    let params = format!("apiKey:{api_key}&randomKey:{random_key}&signature:{signature}");
    Ok(format!("{AUTHORIZATION_SCHEME} {}", STANDARD.encode(params)))
}
