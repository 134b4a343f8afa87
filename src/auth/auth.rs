use hex::encode;
use hmac::{Hmac, Mac};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::env::var;

/// Overrides the configured secret when set.
static SECRET_OVERRIDE: Lazy<Option<String>> =
    Lazy::new(|| var("PLATEGATE_SECRET").ok().filter(|s| !s.is_empty()));

pub const HMAC_HEADER: &str = "X-Api-Key";

/// How requests prove knowledge of the shared secret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    None,
    /// Send the secret itself in a header. Demo deployments only.
    Header,
    /// Send the hex HMAC-SHA256 of the request URL.
    Hmac,
}

#[derive(Debug, Clone)]
pub struct RequestAuth {
    mode: AuthMode,
    header: String,
    secret: Option<String>,
}

impl RequestAuth {
    pub fn new(mode: AuthMode, header: impl Into<String>, secret: Option<String>) -> Self {
        Self {
            mode,
            header: header.into(),
            secret: SECRET_OVERRIDE.clone().or(secret),
        }
    }

    pub fn none() -> Self {
        Self {
            mode: AuthMode::None,
            header: String::new(),
            secret: None,
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Header to attach to a request for `url`, if any.
    pub fn header_for(&self, url: &str) -> Option<(String, String)> {
        let secret = self.secret.as_deref()?;
        match self.mode {
            AuthMode::None => None,
            AuthMode::Header => Some((self.header.clone(), secret.to_owned())),
            AuthMode::Hmac => Some((HMAC_HEADER.to_owned(), compute_hmac(secret, url))),
        }
    }
}

pub fn compute_hmac(secret: &str, uri: &str) -> String {
    type HmacSha256 = Hmac<Sha256>;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(uri.as_bytes());

    let result = mac.finalize();
    let code_bytes = result.into_bytes();

    encode(code_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hmac_matches_known_vector() {
        // RFC 4231 test case 2
        assert_eq!(
            compute_hmac("Jefe", "what do ya want for nothing?"),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn hmac_signs_the_full_url() {
        let key = compute_hmac("change-me", "http://gate.local/events?limit=50");
        assert_eq!(key.len(), 64);
        assert_ne!(key, compute_hmac("change-me", "http://gate.local/events?limit=5"));
        assert_ne!(key, compute_hmac("other", "http://gate.local/events?limit=50"));
    }

    #[test]
    fn header_modes() {
        if SECRET_OVERRIDE.is_some() {
            return;
        }
        let none = RequestAuth::new(AuthMode::None, "X-Secret", Some("s".into()));
        assert_eq!(none.header_for("http://x/check-in"), None);

        let plain = RequestAuth::new(AuthMode::Header, "X-Secret", Some("s".into()));
        assert_eq!(
            plain.header_for("http://x/check-in"),
            Some(("X-Secret".to_string(), "s".to_string()))
        );

        let hmac = RequestAuth::new(AuthMode::Hmac, "X-Secret", Some("s".into()));
        let (name, value) = hmac.header_for("http://x/check-in").unwrap();
        assert_eq!(name, HMAC_HEADER);
        assert_eq!(value, compute_hmac("s", "http://x/check-in"));

        let missing = RequestAuth::new(AuthMode::Header, "X-Secret", None);
        assert_eq!(missing.header_for("http://x/check-in"), None);
    }
}
