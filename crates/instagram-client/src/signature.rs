//! Inbound webhook authentication.
//!
//! The platform signs each delivery with HMAC-SHA256 over the exact raw
//! body, keyed by the app secret, and sends `sha256=<hex>` in the
//! `X-Hub-Signature-256` header. Comparison goes through
//! [`Mac::verify_slice`], which is constant-time.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, error, warn};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Algorithm tag prefixed to the hex digest.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Reasons a webhook is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// No signature header was sent.
    #[error("missing signature header")]
    MissingSignature,

    /// The raw body was not captured.
    #[error("raw body unavailable for signature check")]
    MissingBody,

    /// The signature does not match the body.
    #[error("signature mismatch")]
    Mismatch,
}

/// Outcome of a successful check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// The signature matched.
    Verified,
    /// No header was present and unsigned requests are allowed.
    Bypassed,
}

/// Compute the header value for `body`.
pub fn sign(secret: &[u8], body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");
    mac.update(body);
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes()))
}

/// Check a header value against `body`.
pub fn verify_signature(secret: &[u8], body: &[u8], header_value: &str) -> bool {
    let Some(hex_digest) = header_value.trim().strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Verifies inbound webhooks with the app secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Vec<u8>,
    allow_unsigned: bool,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"[redacted]")
            .field("allow_unsigned", &self.allow_unsigned)
            .finish()
    }
}

impl SignatureVerifier {
    /// Create a verifier that rejects every unsigned request.
    pub fn new(app_secret: impl Into<String>) -> Self {
        Self {
            secret: app_secret.into().into_bytes(),
            allow_unsigned: false,
        }
    }

    /// Let requests without any signature header through.
    ///
    /// Only for non-production testing; a present but wrong header is
    /// still rejected.
    pub fn allow_unsigned(mut self, allow: bool) -> Self {
        self.allow_unsigned = allow;
        self
    }

    /// Check a request.
    ///
    /// `body` is `None` (or empty) when the raw body was not captured.
    pub fn check(
        &self,
        body: Option<&[u8]>,
        header_value: Option<&str>,
    ) -> Result<Verification, SignatureError> {
        let Some(signature) = header_value else {
            if self.allow_unsigned {
                warn!("Signature check skipped: unsigned request allowed outside production");
                return Ok(Verification::Bypassed);
            }
            error!("Webhook rejected: no {} header", SIGNATURE_HEADER);
            return Err(SignatureError::MissingSignature);
        };

        let body = match body {
            Some(body) if !body.is_empty() => body,
            _ => {
                error!("Webhook rejected: raw body unavailable");
                return Err(SignatureError::MissingBody);
            }
        };

        if verify_signature(&self.secret, body, signature) {
            debug!("Webhook signature verified");
            Ok(Verification::Verified)
        } else {
            error!(
                "Webhook rejected: invalid signature (received {}...)",
                signature.chars().take(20).collect::<String>()
            );
            Err(SignatureError::Mismatch)
        }
    }
}
