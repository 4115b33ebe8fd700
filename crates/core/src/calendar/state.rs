//! Signed OAuth `state` parameter.
//!
//! Format: `base64url(json{uid, ts, nonce}) "." base64url(HMAC-SHA256(secret, payload))`.
//! The callback trusts the user id only after the signature and age check.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use goalpro_domain::{GoalProError, Result};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Tolerated drift for states stamped slightly in the future.
const MAX_CLOCK_SKEW_SECS: i64 = 60;

#[derive(Debug, Serialize, Deserialize)]
struct StatePayload {
    uid: String,
    ts: i64,
    nonce: String,
}

/// Signs and verifies OAuth state values with a shared secret.
#[derive(Clone)]
pub struct OAuthStateSigner {
    secret: Vec<u8>,
    ttl_secs: i64,
}

impl std::fmt::Debug for OAuthStateSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthStateSigner")
            .field("secret", &"<redacted>")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl OAuthStateSigner {
    pub fn new(secret: impl Into<Vec<u8>>, ttl_secs: i64) -> Self {
        Self { secret: secret.into(), ttl_secs }
    }

    /// Signer with a random per-process secret. States do not survive a restart.
    pub fn ephemeral(ttl_secs: i64) -> Self {
        let mut secret = vec![0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        Self::new(secret, ttl_secs)
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    pub fn sign(&self, user_id: &str, now: DateTime<Utc>) -> Result<String> {
        let mut nonce = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut nonce);

        let payload = StatePayload {
            uid: user_id.to_string(),
            ts: now.timestamp(),
            nonce: URL_SAFE_NO_PAD.encode(nonce),
        };
        let json = serde_json::to_vec(&payload)
            .map_err(|e| GoalProError::Internal(format!("failed to encode oauth state: {e}")))?;
        let encoded = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac()?;
        mac.update(encoded.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!("{encoded}.{}", URL_SAFE_NO_PAD.encode(signature)))
    }

    /// Returns the user id carried by a valid, unexpired state.
    pub fn verify(&self, state: &str, now: DateTime<Utc>) -> Result<String> {
        let (encoded, signature) = state
            .split_once('.')
            .ok_or_else(|| GoalProError::Security("malformed oauth state".into()))?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| GoalProError::Security("malformed oauth state signature".into()))?;

        let mut mac = self.mac()?;
        mac.update(encoded.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| GoalProError::Security("oauth state signature mismatch".into()))?;

        let json = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| GoalProError::Security("malformed oauth state payload".into()))?;
        let payload: StatePayload = serde_json::from_slice(&json)
            .map_err(|_| GoalProError::Security("malformed oauth state payload".into()))?;

        let age = now.timestamp() - payload.ts;
        if age > self.ttl_secs || age < -MAX_CLOCK_SKEW_SECS {
            return Err(GoalProError::Security("oauth state expired".into()));
        }
        if payload.uid.trim().is_empty() {
            return Err(GoalProError::Security("oauth state has no user".into()));
        }

        Ok(payload.uid)
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| GoalProError::Config(format!("invalid oauth state secret: {e}")))
    }
}
